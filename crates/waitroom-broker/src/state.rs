//! In-memory broker state and its transition functions.
//!
//! [`BrokerState`] owns all three data structures of the broker: the room
//! table, the client ledger, and the wait queue. Every transition is a
//! synchronous function taking explicit timestamps, so expiry behavior is
//! testable without a real clock. [`crate::engine::AllocationEngine`]
//! wraps this behind a mutex and supplies `Instant::now()`.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use waitroom_core::error::AppError;
use waitroom_core::result::AppResult;
use waitroom_core::types::id::{ClientToken, RoomId};
use waitroom_core::types::snapshot::RoomSnapshot;

/// A client waiting for a room assignment.
#[derive(Debug, Clone)]
struct WaitingClient {
    /// Time of the client's most recent contact (registration or poll).
    last_contact: Instant,
    /// Room whose slot is held in trust for this client, if a freed slot
    /// was matched to it.
    reserved: Option<RoomId>,
}

/// Outcome of a poll transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// A room was assigned. The client is done; its token is now invalid.
    Assigned(RoomId),
    /// No capacity anywhere. The client stays queued and should poll again.
    Wait,
    /// The token is not in the ledger: never registered, expired, or
    /// already served. The caller is expected to re-register.
    UnknownClient,
}

/// The broker's entire mutable state.
///
/// Invariants:
/// - free-slot counts never go negative (`u32` plus guarded decrements);
/// - a queued token without a ledger entry is stale and is skipped wherever
///   the queue is consumed; the queue is never compacted eagerly.
#[derive(Debug, Default)]
pub struct BrokerState {
    /// Room id to free-slot count. BTreeMap iteration order makes the
    /// best-room scan deterministic: ties go to the smallest id.
    rooms: BTreeMap<RoomId, u32>,
    /// Every client currently waiting or holding a reservation.
    clients: HashMap<ClientToken, WaitingClient>,
    /// FIFO order in which waiting clients are matched to freed slots.
    queue: VecDeque<ClientToken>,
}

impl BrokerState {
    /// Start from an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a previously persisted room table. Client state is never
    /// persisted, so the ledger and queue always start empty.
    pub fn restore(snapshot: RoomSnapshot) -> Self {
        Self {
            rooms: snapshot.0,
            clients: HashMap::new(),
            queue: VecDeque::new(),
        }
    }

    /// Register a new room with an initial free-slot count.
    pub fn register_room(&mut self, id: RoomId, count: u32) -> AppResult<()> {
        if count == 0 {
            return Err(AppError::validation("room count must be positive"));
        }
        if self.rooms.contains_key(&id) {
            return Err(AppError::conflict(format!("room already registered: {id}")));
        }
        self.rooms.insert(id.clone(), count);
        info!(room = %id, count, "room registered");
        Ok(())
    }

    /// Add freed slots to a room, creating the entry if the room was never
    /// registered, then try to match the head of the wait queue to it.
    ///
    /// At most one client is reserved per call, even when `count > 1`; the
    /// remaining capacity is picked up by later polls.
    pub fn free_slots(&mut self, id: RoomId, count: u32) -> AppResult<()> {
        if count == 0 {
            return Err(AppError::validation("freed count must be positive"));
        }
        *self.rooms.entry(id.clone()).or_insert(0) += count;
        info!(room = %id, count, "slots freed");
        self.match_waiting(&id);
        Ok(())
    }

    /// Remove a room. Removing an unknown room is a no-op.
    ///
    /// Outstanding reservations naming this room stay valid: the slot was
    /// already debited when the reservation was made, so the client still
    /// collects it on its next poll. If the client expires instead, the
    /// give-back is dropped because the room is gone.
    pub fn delete_room(&mut self, id: &RoomId) {
        self.rooms.remove(id);
        info!(room = %id, "room deleted");
    }

    /// Read-only image of the room table.
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot(self.rooms.clone())
    }

    /// Admit a new waiting client: fresh token, ledger entry, queue tail.
    /// Admission is unconditional; capacity is only checked on poll.
    pub fn register_client(&mut self, now: Instant) -> ClientToken {
        let token = ClientToken::new();
        self.clients.insert(
            token,
            WaitingClient {
                last_contact: now,
                reserved: None,
            },
        );
        self.queue.push_back(token);
        info!(client = %token, "client registered");
        token
    }

    /// Drop every client silent for longer than `timeout`, returning any
    /// reserved slot to its room. A reserved room that was deleted in the
    /// meantime silently swallows the returned slot.
    ///
    /// Queue entries of expired clients are left in place and filtered out
    /// when the queue is consumed.
    pub fn expire(&mut self, now: Instant, timeout: Duration) {
        let stale: Vec<ClientToken> = self
            .clients
            .iter()
            .filter(|(_, client)| now.duration_since(client.last_contact) > timeout)
            .map(|(token, _)| *token)
            .collect();

        for token in stale {
            let Some(client) = self.clients.remove(&token) else {
                continue;
            };
            if let Some(room) = client.reserved {
                match self.rooms.get_mut(&room) {
                    Some(free) => *free += 1,
                    None => debug!(room = %room, "reserved room gone, slot dropped"),
                }
            }
            info!(client = %token, "client expired");
        }
    }

    /// Resolve a client's current assignment. This is the core state
    /// machine; see the crate docs for the full transition diagram.
    pub fn poll(&mut self, token: &ClientToken, now: Instant, timeout: Duration) -> PollOutcome {
        self.expire(now, timeout);

        let Some(client) = self.clients.get_mut(token) else {
            warn!(client = %token, "poll with unknown token");
            return PollOutcome::UnknownClient;
        };
        client.last_contact = now;

        // A reservation already carries a debited slot; deliver it without
        // touching the count again.
        if let Some(room) = client.reserved.clone() {
            self.clients.remove(token);
            info!(room = %room, client = %token, "reserved room delivered");
            return PollOutcome::Assigned(room);
        }

        let Some(room) = self.best_room() else {
            return PollOutcome::Wait;
        };
        if let Some(free) = self.rooms.get_mut(&room) {
            *free -= 1;
        }
        self.clients.remove(token);
        info!(room = %room, client = %token, "room assigned");
        PollOutcome::Assigned(room)
    }

    /// Room with the strictly greatest nonzero free count. The
    /// strictly-greater comparison keeps the first of equals, so ties go to
    /// the lexicographically smallest id; all-empty tables yield `None`.
    fn best_room(&self) -> Option<RoomId> {
        let mut best: Option<(&RoomId, u32)> = None;
        for (room, &free) in &self.rooms {
            if free == 0 {
                continue;
            }
            match best {
                Some((_, best_free)) if free <= best_free => {}
                _ => best = Some((room, free)),
            }
        }
        best.map(|(room, _)| room.clone())
    }

    /// Match the freed room to the first still-live queued client, setting
    /// its reservation and debiting one slot. Stale queue entries are
    /// discarded along the way.
    fn match_waiting(&mut self, room: &RoomId) {
        while let Some(token) = self.queue.pop_front() {
            let Some(client) = self.clients.get_mut(&token) else {
                // left behind by an expired or already-served client
                continue;
            };
            client.reserved = Some(room.clone());
            if let Some(free) = self.rooms.get_mut(room) {
                *free = free.saturating_sub(1);
            }
            info!(room = %room, client = %token, "slot reserved");
            return;
        }
    }
}
