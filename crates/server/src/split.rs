//! Split endpoint

use api_types::split::{BillView, SplitView, WarningView};
use axum::{
    Json,
    extract::{Path, State},
};
use engine::SplitWarning;

use crate::{ServerError, room_code, server::ServerState};

fn warning_view(warning: SplitWarning) -> WarningView {
    match warning {
        SplitWarning::TotalBelowSubtotal { total, subtotal } => {
            WarningView::TotalBelowSubtotal { total, subtotal }
        }
        SplitWarning::UnassignedItems { count, cost } => WarningView::UnassignedItems { count, cost },
        SplitWarning::SumMismatch { expected, actual } => {
            WarningView::SumMismatch { expected, actual }
        }
    }
}

/// Compute the current split of a room, bills in member order.
pub async fn get(
    State(state): State<ServerState>,
    Path(code): Path<String>,
) -> Result<Json<SplitView>, ServerError> {
    let code = room_code(&code)?;
    let room = state.engine.room(&code).await?;
    let report = room.report();

    let bills = report
        .bills
        .iter()
        .map(|bill| BillView {
            member_id: bill.member_id,
            name: room
                .member(bill.member_id)
                .map(|member| member.name.clone())
                .unwrap_or_default(),
            bill: bill.bill,
            rounded: bill.rounded().to_string(),
        })
        .collect();

    Ok(Json(SplitView {
        total: report.total,
        subtotal: report.subtotal,
        assigned: report.assigned,
        unassigned: report.unassigned,
        bills,
        warnings: report.warnings.into_iter().map(warning_view).collect(),
    }))
}
