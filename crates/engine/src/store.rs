//! In-memory room store.
//!
//! Rooms are addressed by their [`RoomCode`]. Every mutation publishes the new
//! room snapshot on a per-room [`watch`] channel, so viewers can subscribe and
//! recompute the split whenever the room changes. Concurrent edits are applied
//! in lock order: last write wins.

use std::collections::HashMap;

use tokio::sync::{RwLock, watch};

use crate::{
    EngineError, ItemId, MemberId, ResultEngine, Room, RoomCode, SplitReport,
};

/// How many fresh codes to draw before giving up on creating a room.
pub const DEFAULT_CODE_ATTEMPTS: usize = 16;

#[derive(Debug)]
struct Slot {
    room: Room,
    updates: watch::Sender<Room>,
}

impl Slot {
    fn new(room: Room) -> Self {
        let (updates, _) = watch::channel(room.clone());
        Self { room, updates }
    }

    fn publish(&self) {
        self.updates.send_replace(self.room.clone());
    }
}

#[derive(Debug)]
pub struct Engine {
    rooms: RwLock<HashMap<RoomCode, Slot>>,
    code_attempts: usize,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Create an empty room under a freshly generated code.
    pub async fn create_room(&self) -> ResultEngine<Room> {
        let mut rooms = self.rooms.write().await;
        for _ in 0..self.code_attempts {
            let code = RoomCode::generate();
            if rooms.contains_key(&code) {
                tracing::debug!(%code, "room code collision, drawing again");
                continue;
            }
            let room = Room::new(code.clone());
            rooms.insert(code.clone(), Slot::new(room.clone()));
            tracing::info!(%code, "room created");
            return Ok(room);
        }
        Err(EngineError::ExistingKey(format!(
            "no free room code after {} attempts",
            self.code_attempts
        )))
    }

    /// All rooms, oldest first.
    pub async fn rooms(&self) -> Vec<Room> {
        let rooms = self.rooms.read().await;
        let mut list: Vec<Room> = rooms.values().map(|slot| slot.room.clone()).collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.code.cmp(&b.code)));
        list
    }

    pub async fn room(&self, code: &RoomCode) -> ResultEngine<Room> {
        let rooms = self.rooms.read().await;
        rooms
            .get(code)
            .map(|slot| slot.room.clone())
            .ok_or_else(|| EngineError::KeyNotFound(code.to_string()))
    }

    /// Delete a room with its members and items. Subscribers see the channel
    /// close.
    pub async fn delete_room(&self, code: &RoomCode) -> ResultEngine<Room> {
        let slot = self
            .rooms
            .write()
            .await
            .remove(code)
            .ok_or_else(|| EngineError::KeyNotFound(code.to_string()))?;
        tracing::info!(%code, "room deleted");
        Ok(slot.room)
    }

    /// Subscribe to a room. The receiver starts with the current snapshot.
    pub async fn subscribe(&self, code: &RoomCode) -> ResultEngine<watch::Receiver<Room>> {
        let rooms = self.rooms.read().await;
        rooms
            .get(code)
            .map(|slot| slot.updates.subscribe())
            .ok_or_else(|| EngineError::KeyNotFound(code.to_string()))
    }

    pub async fn add_members(
        &self,
        code: &RoomCode,
        names: &[String],
    ) -> ResultEngine<Vec<MemberId>> {
        self.mutate(code, |room| room.add_members(names)).await
    }

    pub async fn remove_member(&self, code: &RoomCode, member_id: MemberId) -> ResultEngine<()> {
        self.mutate(code, |room| room.remove_member(member_id).map(|_| ()))
            .await
    }

    pub async fn add_item(&self, code: &RoomCode) -> ResultEngine<ItemId> {
        self.mutate(code, |room| Ok(room.add_item())).await
    }

    pub async fn update_item_name(
        &self,
        code: &RoomCode,
        item_id: ItemId,
        name: &str,
    ) -> ResultEngine<()> {
        self.mutate(code, |room| room.update_item_name(item_id, name))
            .await
    }

    pub async fn update_item_cost(
        &self,
        code: &RoomCode,
        item_id: ItemId,
        cost: f64,
    ) -> ResultEngine<()> {
        self.mutate(code, |room| room.update_item_cost(item_id, cost))
            .await
    }

    /// Apply a name and a cost edit as one update. A rejected cost leaves the
    /// name untouched too.
    pub async fn update_item(
        &self,
        code: &RoomCode,
        item_id: ItemId,
        name: Option<&str>,
        cost: Option<f64>,
    ) -> ResultEngine<()> {
        self.mutate(code, |room| room.update_item(item_id, name, cost))
            .await
    }

    pub async fn delete_item(&self, code: &RoomCode, item_id: ItemId) -> ResultEngine<()> {
        self.mutate(code, |room| room.delete_item(item_id).map(|_| ()))
            .await
    }

    pub async fn add_members_to_item(
        &self,
        code: &RoomCode,
        item_id: ItemId,
        member_ids: &[MemberId],
    ) -> ResultEngine<()> {
        self.mutate(code, |room| room.add_members_to_item(item_id, member_ids))
            .await
    }

    pub async fn remove_members_from_item(
        &self,
        code: &RoomCode,
        item_id: ItemId,
        member_ids: &[MemberId],
    ) -> ResultEngine<()> {
        self.mutate(code, |room| {
            room.remove_members_from_item(item_id, member_ids)
        })
        .await
    }

    pub async fn update_total(&self, code: &RoomCode, total: f64) -> ResultEngine<()> {
        self.mutate(code, |room| room.update_total(total)).await
    }

    /// Split the room's current total.
    pub async fn split(&self, code: &RoomCode) -> ResultEngine<SplitReport> {
        let rooms = self.rooms.read().await;
        rooms
            .get(code)
            .map(|slot| slot.room.report())
            .ok_or_else(|| EngineError::KeyNotFound(code.to_string()))
    }

    /// Snapshot of every room, for persistence.
    pub async fn export(&self) -> Vec<Room> {
        self.rooms().await
    }

    /// Apply `op` to a copy of the room and commit it only on success, then
    /// notify subscribers.
    async fn mutate<T, F>(&self, code: &RoomCode, op: F) -> ResultEngine<T>
    where
        F: FnOnce(&mut Room) -> ResultEngine<T>,
    {
        let mut rooms = self.rooms.write().await;
        let slot = rooms
            .get_mut(code)
            .ok_or_else(|| EngineError::KeyNotFound(code.to_string()))?;

        let mut draft = slot.room.clone();
        let out = op(&mut draft).inspect_err(|err| {
            tracing::debug!(%code, "room update rejected: {err}");
        })?;
        slot.room = draft;
        slot.publish();
        tracing::debug!(%code, "room updated");
        Ok(out)
    }
}

#[derive(Debug)]
pub struct EngineBuilder {
    rooms: Vec<Room>,
    code_attempts: usize,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            rooms: Vec::new(),
            code_attempts: DEFAULT_CODE_ATTEMPTS,
        }
    }
}

impl EngineBuilder {
    /// Seed the store, e.g. from a saved snapshot. Seeded rooms are checked
    /// when the engine is built.
    pub fn rooms(mut self, rooms: Vec<Room>) -> EngineBuilder {
        self.rooms = rooms;
        self
    }

    /// How many codes to draw before `create_room` gives up.
    pub fn code_attempts(mut self, attempts: usize) -> EngineBuilder {
        self.code_attempts = attempts.max(1);
        self
    }

    /// Construct `Engine`.
    ///
    /// Every seeded room is repaired first: tags naming non-members are
    /// dropped, and a room with an invalid cost or total or a code already
    /// seeded fails the build.
    pub fn build(self) -> ResultEngine<Engine> {
        let mut rooms: HashMap<RoomCode, Slot> = HashMap::with_capacity(self.rooms.len());
        for mut room in self.rooms {
            let code = room.code.clone();
            let dropped = room.repair().inspect_err(|err| {
                tracing::error!(%code, "seeded room rejected: {err}");
            })?;
            if dropped > 0 {
                tracing::warn!(%code, dropped, "dropped item tags of non-members");
            }
            if rooms.contains_key(&code) {
                return Err(EngineError::ExistingKey(format!(
                    "room {code} is seeded twice"
                )));
            }
            rooms.insert(code, Slot::new(room));
        }
        tracing::debug!(rooms = rooms.len(), "engine ready");

        Ok(Engine {
            rooms: RwLock::new(rooms),
            code_attempts: self.code_attempts,
        })
    }
}
