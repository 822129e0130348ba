//! Reconciliation between the itemized subtotal, the entered total and the
//! computed bills.
//!
//! Nothing here is an error: a total below the subtotal or an unclaimed item
//! are legitimate states of a bill being edited. They are surfaced as
//! [`SplitWarning`]s for whoever displays the split.

use serde::{Deserialize, Serialize};

use crate::{Item, Member, MemberBill, bills_total, compute_split, split};

/// Bills may drift from their expected sum by this much before it is flagged.
pub const SUM_TOLERANCE: f64 = 0.01;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SplitWarning {
    /// The entered total is lower than the sum of the items.
    TotalBelowSubtotal { total: f64, subtotal: f64 },
    /// Some items are tagged to nobody; their part of the total is not billed.
    UnassignedItems { count: usize, cost: f64 },
    /// The bills do not add up to what they should.
    SumMismatch { expected: f64, actual: f64 },
}

/// A split ready for display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplitReport {
    pub total: f64,
    pub subtotal: f64,
    /// Cost of the items tagged to at least one member.
    pub assigned: f64,
    /// Cost of the items tagged to nobody.
    pub unassigned: f64,
    /// Bills ordered like the room members. Bills of ids that are not room
    /// members come last, in allocation order.
    pub bills: Vec<MemberBill>,
    pub warnings: Vec<SplitWarning>,
}

impl SplitReport {
    pub fn new(total: f64, members: &[Member], items: &[Item]) -> Self {
        let subtotal = split::subtotal(items);
        let assigned = split::assigned_subtotal(items);
        let unassigned = subtotal - assigned;

        let mut bills = compute_split(total, items);
        bills.sort_by_key(|bill| {
            members
                .iter()
                .position(|member| member.id == bill.member_id)
                .unwrap_or(members.len())
        });

        let mut warnings = Vec::new();
        if total < subtotal {
            warnings.push(SplitWarning::TotalBelowSubtotal { total, subtotal });
        }

        let unclaimed = items.iter().filter(|item| item.member_ids.is_empty());
        let count = unclaimed.clone().count();
        if count > 0 {
            warnings.push(SplitWarning::UnassignedItems {
                count,
                cost: unclaimed.map(|item| item.cost).sum(),
            });
        }

        if subtotal != 0.0 {
            let expected = total * assigned / subtotal;
            let actual = bills_total(&bills);
            if (expected - actual).abs() > SUM_TOLERANCE {
                warnings.push(SplitWarning::SumMismatch { expected, actual });
            }
        }

        Self {
            total,
            subtotal,
            assigned,
            unassigned,
            bills,
            warnings,
        }
    }

    /// Sum of the bills.
    pub fn billed(&self) -> f64 {
        bills_total(&self.bills)
    }

    /// Part of the total no one is billed for.
    pub fn unbilled(&self) -> f64 {
        self.total - self.billed()
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(names: &[&str]) -> Vec<Member> {
        names.iter().map(|name| Member::new(*name)).collect()
    }

    #[test]
    fn bills_follow_member_order() {
        let people = members(&["Ada", "Linus", "Grace"]);
        let items = [
            Item::new("tea", 2.0, [people[2].id]),
            Item::new("cake", 6.0, [people[1].id, people[0].id]),
        ];

        let report = SplitReport::new(8.0, &people, &items);

        let order: Vec<_> = report.bills.iter().map(|b| b.member_id).collect();
        assert_eq!(order, [people[0].id, people[1].id, people[2].id]);
        assert!(report.is_clean());
    }

    #[test]
    fn flags_total_below_subtotal() {
        let people = members(&["Ada", "Linus", "Grace"]);
        let ids: Vec<_> = people.iter().map(|m| m.id).collect();
        let report = SplitReport::new(10.0, &people, &[Item::new("platter", 15.0, ids)]);

        assert_eq!(
            report.warnings,
            [SplitWarning::TotalBelowSubtotal {
                total: 10.0,
                subtotal: 15.0
            }]
        );
        assert!((report.billed() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn flags_unassigned_items_without_sum_mismatch() {
        let people = members(&["Ada", "Linus"]);
        let items = [
            Item::new("fries", 10.0, [people[0].id, people[1].id]),
            Item::new("mystery", 10.0, Vec::<crate::MemberId>::new()),
        ];

        let report = SplitReport::new(20.0, &people, &items);

        assert_eq!(report.subtotal, 20.0);
        assert_eq!(report.assigned, 10.0);
        assert_eq!(report.unassigned, 10.0);
        assert_eq!(
            report.warnings,
            [SplitWarning::UnassignedItems {
                count: 1,
                cost: 10.0
            }]
        );
        assert!((report.unbilled() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn empty_bill_has_no_bills_and_no_warnings() {
        let report = SplitReport::new(0.0, &members(&["Ada"]), &[]);
        assert!(report.bills.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn positive_total_over_empty_bill_is_unbilled() {
        let report = SplitReport::new(50.0, &[], &[]);
        assert!(report.bills.is_empty());
        assert_eq!(report.unbilled(), 50.0);
    }

    #[test]
    fn warnings_serialize_with_kind_tag() {
        let warning = SplitWarning::UnassignedItems { count: 2, cost: 3.5 };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["kind"], "unassigned_items");
        assert_eq!(json["count"], 2);
    }
}
