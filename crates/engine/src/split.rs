//! Bill allocation.
//!
//! Turns a list of priced, member-tagged items plus an independently edited
//! grand total into what each member owes. The total usually differs from the
//! itemized subtotal (tip, tax, discount); the difference is spread in
//! proportion to each member's itemized share.
//!
//! The functions here are pure: they never mutate their inputs, hold no state
//! and never fail. Degenerate inputs produce degenerate but defined outputs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Item, MemberId, MoneyCents};

/// What a single member owes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemberBill {
    pub member_id: MemberId,
    pub bill: f64,
}

impl MemberBill {
    /// The bill rounded to cents.
    #[must_use]
    pub fn rounded(&self) -> MoneyCents {
        MoneyCents::from_major(self.bill)
    }
}

/// Sum of every item cost, tagged or not.
#[must_use]
pub fn subtotal(items: &[Item]) -> f64 {
    items.iter().map(|item| item.cost).sum()
}

/// Sum of the costs of items tagged to at least one member.
#[must_use]
pub fn assigned_subtotal(items: &[Item]) -> f64 {
    items
        .iter()
        .filter(|item| !item.member_ids.is_empty())
        .map(|item| item.cost)
        .sum()
}

/// Sum of a list of bills.
#[must_use]
pub fn bills_total(bills: &[MemberBill]) -> f64 {
    bills.iter().map(|bill| bill.bill).sum()
}

/// Allocates `total` across the members tagged in `items`.
///
/// Each item's cost is shared equally among its tagged members; the per-member
/// shares are then rescaled by `total / subtotal`. Items nobody is tagged to
/// still count towards the subtotal but are never charged to anyone, so their
/// portion of the total is left unallocated.
///
/// Returns an empty list when the subtotal is zero. Members whose accumulated
/// share is zero are omitted. The result follows the order in which members
/// are first met while walking the items; callers wanting a display order
/// must sort.
///
/// ```rust
/// use engine::{Item, compute_split};
/// use uuid::Uuid;
///
/// let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
/// let pizza = Item::new("pizza", 30.0, [alice, bob]);
///
/// let bills = compute_split(33.0, &[pizza]);
/// assert_eq!(bills.len(), 2);
/// assert!(bills.iter().all(|b| (b.bill - 16.5).abs() < 1e-9));
/// ```
#[must_use]
pub fn compute_split(total: f64, items: &[Item]) -> Vec<MemberBill> {
    let subtotal = subtotal(items);
    if subtotal == 0.0 {
        return Vec::new();
    }

    let mut shares: Vec<(MemberId, f64)> = Vec::new();
    let mut index: HashMap<MemberId, usize> = HashMap::new();

    for item in items.iter().filter(|item| !item.member_ids.is_empty()) {
        let per_member = item.cost / item.member_ids.len() as f64;
        for member_id in &item.member_ids {
            let slot = *index.entry(*member_id).or_insert_with(|| {
                shares.push((*member_id, 0.0));
                shares.len() - 1
            });
            shares[slot].1 += per_member;
        }
    }

    shares
        .into_iter()
        .filter(|(_, share)| *share != 0.0)
        .map(|(member_id, share)| MemberBill {
            member_id,
            bill: share / subtotal * total,
        })
        .collect()
}
