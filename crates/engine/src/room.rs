//! The `Room` holds the members sharing a bill, the itemized lines and the
//! grand total to split.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, MemberBill, ResultEngine, RoomCode, SplitReport, compute_split, split,
};

pub type MemberId = Uuid;
pub type ItemId = Uuid;

/// A person sharing the bill.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
}

impl Member {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// A priced line of the bill.
///
/// `cost` is in major units and may be fractional. `member_ids` is the set of
/// members sharing this line; an empty set means nobody has claimed it yet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub cost: f64,
    #[serde(default)]
    pub member_ids: BTreeSet<MemberId>,
}

impl Item {
    pub fn new(
        name: impl Into<String>,
        cost: f64,
        member_ids: impl IntoIterator<Item = MemberId>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            cost,
            member_ids: member_ids.into_iter().collect(),
        }
    }

    /// A nameless, free, unclaimed line, as created by "add item".
    pub fn blank() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            cost: 0.0,
            member_ids: BTreeSet::new(),
        }
    }
}

/// A shared bill.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub code: RoomCode,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Room {
    pub fn new(code: RoomCode) -> Self {
        Self {
            id: Uuid::new_v4(),
            code,
            created_at: Utc::now(),
            total: 0.0,
            members: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn member(&self, member_id: MemberId) -> ResultEngine<&Member> {
        self.members
            .iter()
            .find(|member| member.id == member_id)
            .ok_or_else(|| EngineError::KeyNotFound(member_id.to_string()))
    }

    pub fn item(&self, item_id: ItemId) -> ResultEngine<&Item> {
        self.items
            .iter()
            .find(|item| item.id == item_id)
            .ok_or_else(|| EngineError::KeyNotFound(item_id.to_string()))
    }

    fn item_mut(&mut self, item_id: ItemId) -> ResultEngine<&mut Item> {
        self.items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| EngineError::KeyNotFound(item_id.to_string()))
    }

    fn is_member(&self, member_id: &MemberId) -> bool {
        self.members.iter().any(|member| member.id == *member_id)
    }

    /// Adds one member per name, in order. Names are trimmed and must not be
    /// empty; nothing is added if any name is rejected.
    pub fn add_members<I, S>(&mut self, names: I) -> ResultEngine<Vec<MemberId>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let members = names
            .into_iter()
            .map(|name| {
                let name = name.as_ref().trim();
                if name.is_empty() {
                    return Err(EngineError::InvalidName(
                        "member name must not be empty".to_string(),
                    ));
                }
                Ok(Member::new(name))
            })
            .collect::<ResultEngine<Vec<_>>>()?;

        let ids = members.iter().map(|member| member.id).collect();
        self.members.extend(members);
        Ok(ids)
    }

    /// Removes a member and untags it from every item.
    pub fn remove_member(&mut self, member_id: MemberId) -> ResultEngine<Member> {
        let index = self
            .members
            .iter()
            .position(|member| member.id == member_id)
            .ok_or_else(|| EngineError::KeyNotFound(member_id.to_string()))?;

        for item in &mut self.items {
            item.member_ids.remove(&member_id);
        }
        Ok(self.members.remove(index))
    }

    pub fn add_item(&mut self) -> ItemId {
        let item = Item::blank();
        let id = item.id;
        self.items.push(item);
        id
    }

    pub fn update_item_name(&mut self, item_id: ItemId, name: &str) -> ResultEngine<()> {
        self.item_mut(item_id)?.name = name.to_string();
        Ok(())
    }

    pub fn update_item_cost(&mut self, item_id: ItemId, cost: f64) -> ResultEngine<()> {
        check_cost(cost)?;
        self.item_mut(item_id)?.cost = cost;
        Ok(())
    }

    /// Edits name and cost in one step. Nothing changes if the cost is
    /// rejected.
    pub fn update_item(
        &mut self,
        item_id: ItemId,
        name: Option<&str>,
        cost: Option<f64>,
    ) -> ResultEngine<()> {
        if let Some(cost) = cost {
            check_cost(cost)?;
        }
        let item = self.item_mut(item_id)?;
        if let Some(cost) = cost {
            item.cost = cost;
        }
        if let Some(name) = name {
            item.name = name.to_string();
        }
        Ok(())
    }

    pub fn delete_item(&mut self, item_id: ItemId) -> ResultEngine<Item> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or_else(|| EngineError::KeyNotFound(item_id.to_string()))?;
        Ok(self.items.remove(index))
    }

    /// Tags members to an item. Ids that are not members of this room are
    /// skipped; tagging an already tagged member is a no-op.
    pub fn add_members_to_item(
        &mut self,
        item_id: ItemId,
        member_ids: &[MemberId],
    ) -> ResultEngine<()> {
        let valid: Vec<MemberId> = member_ids
            .iter()
            .filter(|id| self.is_member(id))
            .copied()
            .collect();
        self.item_mut(item_id)?.member_ids.extend(valid);
        Ok(())
    }

    pub fn remove_members_from_item(
        &mut self,
        item_id: ItemId,
        member_ids: &[MemberId],
    ) -> ResultEngine<()> {
        let item = self.item_mut(item_id)?;
        for member_id in member_ids {
            item.member_ids.remove(member_id);
        }
        Ok(())
    }

    pub fn update_total(&mut self, total: f64) -> ResultEngine<()> {
        check_total(total)?;
        self.total = total;
        Ok(())
    }

    /// Brings a room read back from storage in line with what the mutations
    /// guarantee. Invalid costs or totals are rejected; tags naming ids that
    /// are not members are dropped. Returns the number of dropped tags.
    pub fn repair(&mut self) -> ResultEngine<usize> {
        check_total(self.total)?;
        for item in &self.items {
            check_cost(item.cost)?;
        }

        let members: BTreeSet<MemberId> = self.members.iter().map(|member| member.id).collect();
        let mut dropped = 0;
        for item in &mut self.items {
            let before = item.member_ids.len();
            item.member_ids.retain(|id| members.contains(id));
            dropped += before - item.member_ids.len();
        }
        Ok(dropped)
    }

    pub fn subtotal(&self) -> f64 {
        split::subtotal(&self.items)
    }

    /// Bills for this room, in no particular order. See [`compute_split`].
    pub fn split(&self) -> Vec<MemberBill> {
        compute_split(self.total, &self.items)
    }

    /// Bills in member order along with reconciliation warnings.
    pub fn report(&self) -> SplitReport {
        SplitReport::new(self.total, &self.members, &self.items)
    }
}

fn check_cost(cost: f64) -> ResultEngine<()> {
    if !cost.is_finite() || cost < 0.0 {
        return Err(EngineError::InvalidAmount(format!(
            "item cost must be a finite, non-negative number, got {cost}"
        )));
    }
    Ok(())
}

fn check_total(total: f64) -> ResultEngine<()> {
    if !total.is_finite() {
        return Err(EngineError::InvalidAmount(format!(
            "total must be a finite number, got {total}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> Room {
        Room::new("ABCD".parse().unwrap())
    }

    #[test]
    fn new_room_starts_empty_with_zero_total() {
        let room = room();
        assert_eq!(room.total, 0.0);
        assert!(room.members.is_empty());
        assert!(room.items.is_empty());
        assert!(room.split().is_empty());
    }

    #[test]
    fn add_members_keeps_order_and_trims() {
        let mut room = room();
        room.add_members(["  Ada ", "Linus"]).unwrap();
        let names: Vec<_> = room.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Ada", "Linus"]);
    }

    #[test]
    fn add_members_rejects_blank_names_atomically() {
        let mut room = room();
        let err = room.add_members(["Ada", "   "]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidName(_)));
        assert!(room.members.is_empty());
    }

    #[test]
    fn removing_a_member_untags_it_everywhere() {
        let mut room = room();
        let ids = room.add_members(["Ada", "Linus"]).unwrap();
        let first = room.add_item();
        let second = room.add_item();
        room.add_members_to_item(first, &ids).unwrap();
        room.add_members_to_item(second, &ids[..1]).unwrap();

        room.remove_member(ids[0]).unwrap();

        assert!(room.items.iter().all(|i| !i.member_ids.contains(&ids[0])));
        assert_eq!(room.item(first).unwrap().member_ids.len(), 1);
        assert!(room.item(second).unwrap().member_ids.is_empty());
    }

    #[test]
    fn remove_unknown_member_is_not_found() {
        let mut room = room();
        assert!(matches!(
            room.remove_member(Uuid::new_v4()),
            Err(EngineError::KeyNotFound(_))
        ));
    }

    #[test]
    fn add_item_is_blank() {
        let mut room = room();
        let id = room.add_item();
        let item = room.item(id).unwrap();
        assert_eq!(item.name, "");
        assert_eq!(item.cost, 0.0);
        assert!(item.member_ids.is_empty());
    }

    #[test]
    fn tagging_filters_strangers_and_deduplicates() {
        let mut room = room();
        let ids = room.add_members(["Ada"]).unwrap();
        let item = room.add_item();
        let stranger = Uuid::new_v4();

        room.add_members_to_item(item, &[ids[0], stranger, ids[0]])
            .unwrap();
        room.add_members_to_item(item, &ids).unwrap();

        let tagged = &room.item(item).unwrap().member_ids;
        assert_eq!(tagged.len(), 1);
        assert!(tagged.contains(&ids[0]));
    }

    #[test]
    fn untagging_ignores_absent_members() {
        let mut room = room();
        let ids = room.add_members(["Ada", "Linus"]).unwrap();
        let item = room.add_item();
        room.add_members_to_item(item, &ids).unwrap();

        room.remove_members_from_item(item, &[ids[1], Uuid::new_v4()])
            .unwrap();

        let tagged = &room.item(item).unwrap().member_ids;
        assert_eq!(tagged.iter().copied().collect::<Vec<_>>(), [ids[0]]);
    }

    #[test]
    fn item_cost_must_be_finite_and_non_negative() {
        let mut room = room();
        let item = room.add_item();
        assert!(room.update_item_cost(item, -1.0).is_err());
        assert!(room.update_item_cost(item, f64::NAN).is_err());
        assert!(room.update_item_cost(item, f64::INFINITY).is_err());
        room.update_item_cost(item, 12.5).unwrap();
        assert_eq!(room.subtotal(), 12.5);
    }

    #[test]
    fn total_may_be_negative_but_finite() {
        let mut room = room();
        room.update_total(-3.0).unwrap();
        assert_eq!(room.total, -3.0);
        assert!(room.update_total(f64::NEG_INFINITY).is_err());
        assert_eq!(room.total, -3.0);
    }

    #[test]
    fn delete_item_removes_it_from_subtotal() {
        let mut room = room();
        let item = room.add_item();
        room.update_item_cost(item, 4.0).unwrap();
        room.delete_item(item).unwrap();
        assert_eq!(room.subtotal(), 0.0);
        assert!(room.delete_item(item).is_err());
    }

    #[test]
    fn unknown_item_operations_are_not_found() {
        let mut room = room();
        let missing = Uuid::new_v4();
        assert!(room.update_item_name(missing, "x").is_err());
        assert!(room.add_members_to_item(missing, &[]).is_err());
        assert!(room.remove_members_from_item(missing, &[]).is_err());
    }

    #[test]
    fn update_item_is_all_or_nothing() {
        let mut room = room();
        let item = room.add_item();

        assert!(room.update_item(item, Some("soda"), Some(-2.0)).is_err());
        assert_eq!(room.item(item).unwrap().name, "");

        room.update_item(item, Some("soda"), Some(2.5)).unwrap();
        let updated = room.item(item).unwrap();
        assert_eq!((updated.name.as_str(), updated.cost), ("soda", 2.5));

        room.update_item(item, None, Some(3.0)).unwrap();
        assert_eq!(room.item(item).unwrap().name, "soda");
    }

    #[test]
    fn repair_drops_tags_of_non_members() {
        let mut room = room();
        let ids = room.add_members(["Ada"]).unwrap();
        let stranger = Uuid::new_v4();
        room.items.push(Item::new("cake", 10.0, [ids[0], stranger]));
        room.update_total(10.0).unwrap();

        assert_eq!(room.repair().unwrap(), 1);

        assert_eq!(room.items[0].member_ids.len(), 1);
        let bills = room.split();
        assert_eq!(bills.len(), 1);
        assert_eq!(bills[0].member_id, ids[0]);
    }

    #[test]
    fn repair_rejects_invalid_amounts() {
        let mut room = room();
        room.items.push(Item::new("cake", -10.0, Vec::<MemberId>::new()));
        assert!(matches!(room.repair(), Err(EngineError::InvalidAmount(_))));

        let mut room = self::room();
        room.total = f64::NAN;
        assert!(room.repair().is_err());
    }

    #[test]
    fn room_survives_json_snapshot() {
        let mut room = room();
        let ids = room.add_members(["Ada"]).unwrap();
        let item = room.add_item();
        room.update_item_cost(item, 9.99).unwrap();
        room.add_members_to_item(item, &ids).unwrap();
        room.update_total(11.0).unwrap();

        let json = serde_json::to_string(&room).unwrap();
        let back: Room = serde_json::from_str(&json).unwrap();
        assert_eq!(back, room);
    }
}
