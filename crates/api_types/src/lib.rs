use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod room {
    use super::*;

    /// Short listing entry, as shown on the "live rooms" page.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoomSummary {
        pub code: String,
        pub created_at: DateTime<Utc>,
        pub members: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoomsResponse {
        pub rooms: Vec<RoomSummary>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoomCreated {
        pub code: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoomView {
        pub id: Uuid,
        pub code: String,
        pub created_at: DateTime<Utc>,
        pub total: f64,
        /// Sum of every item cost.
        pub subtotal: f64,
        pub members: Vec<super::member::MemberView>,
        pub items: Vec<super::item::ItemView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TotalUpdate {
        pub total: f64,
    }
}

pub mod member {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub id: Uuid,
        pub name: String,
    }

    /// Request body for adding members to a room.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MembersNew {
        pub names: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MembersCreated {
        pub ids: Vec<Uuid>,
    }
}

pub mod item {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemView {
        pub id: Uuid,
        pub name: String,
        pub cost: f64,
        pub member_ids: Vec<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemCreated {
        pub id: Uuid,
    }

    /// Partial update of an item. Absent fields are left unchanged.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ItemUpdate {
        pub name: Option<String>,
        pub cost: Option<f64>,
    }

    /// Members to tag to (or untag from) an item.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemMembers {
        pub member_ids: Vec<Uuid>,
    }
}

pub mod split {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BillView {
        pub member_id: Uuid,
        /// Member display name; empty if the id is not a room member.
        pub name: String,
        /// Unrounded amount owed.
        pub bill: f64,
        /// Amount owed rounded to two decimals, e.g. `"16.50"`.
        pub rounded: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(tag = "kind", rename_all = "snake_case")]
    pub enum WarningView {
        TotalBelowSubtotal { total: f64, subtotal: f64 },
        UnassignedItems { count: usize, cost: f64 },
        SumMismatch { expected: f64, actual: f64 },
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SplitView {
        pub total: f64,
        pub subtotal: f64,
        pub assigned: f64,
        pub unassigned: f64,
        /// Bills in room member order.
        pub bills: Vec<BillView>,
        pub warnings: Vec<WarningView>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_update_fields_are_optional() {
        let update: item::ItemUpdate = serde_json::from_str(r#"{"cost": 4.5}"#).unwrap();
        assert_eq!(update.cost, Some(4.5));
        assert!(update.name.is_none());
    }

    #[test]
    fn warning_view_is_tagged() {
        let json = serde_json::to_value(split::WarningView::TotalBelowSubtotal {
            total: 10.0,
            subtotal: 15.0,
        })
        .unwrap();
        assert_eq!(json["kind"], "total_below_subtotal");
        assert_eq!(json["subtotal"], 15.0);
    }

    #[test]
    fn room_created_roundtrips() {
        let body = serde_json::to_string(&room::RoomCreated {
            code: "QXAT".to_string(),
        })
        .unwrap();
        let back: room::RoomCreated = serde_json::from_str(&body).unwrap();
        assert_eq!(back.code, "QXAT");
    }
}
