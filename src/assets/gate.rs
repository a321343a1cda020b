//! Load tickets and the join that decides when a render may run.
//!
//! Each source slot carries a generation. Starting a load bumps it and hands out a ticket; only
//! the ticket of the latest generation may complete the slot, so a slow decode that finishes after
//! a newer request is dropped instead of overwriting it.

use std::sync::Arc;

use crate::{
    assets::source::{RasterSource, SourceId, SourceRole},
    foundation::error::PortraitResult,
};

/// Handle for one in-flight source load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    role: SourceRole,
    generation: u64,
}

impl LoadTicket {
    pub fn role(self) -> SourceRole {
        self.role
    }
}

#[derive(Clone, Debug, Default)]
enum SlotState {
    #[default]
    Empty,
    Pending,
    Ready(Arc<RasterSource>),
    Failed(String),
}

/// Outcome of completing a load against a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotUpdate {
    /// The slot now holds a decoded source; `new_identity` is false when it matches the last
    /// source that was ready in this slot.
    Ready { new_identity: bool },
    /// Decoding failed; the slot is unusable until the next load.
    Failed,
    /// The ticket belonged to a superseded load and was ignored.
    Stale,
}

#[derive(Clone, Debug)]
pub(crate) struct SourceSlot {
    role: SourceRole,
    generation: u64,
    state: SlotState,
    last_ready: Option<SourceId>,
}

impl SourceSlot {
    pub(crate) fn new(role: SourceRole) -> Self {
        Self {
            role,
            generation: 0,
            state: SlotState::Empty,
            last_ready: None,
        }
    }

    pub(crate) fn begin(&mut self) -> LoadTicket {
        self.generation = self.generation.wrapping_add(1);
        self.state = SlotState::Pending;
        LoadTicket {
            role: self.role,
            generation: self.generation,
        }
    }

    pub(crate) fn complete(
        &mut self,
        ticket: LoadTicket,
        result: PortraitResult<RasterSource>,
    ) -> SlotUpdate {
        if ticket.role != self.role || ticket.generation != self.generation {
            tracing::debug!(role = %self.role, "dropping stale load completion");
            return SlotUpdate::Stale;
        }
        match result {
            Ok(src) => {
                let id = src.id();
                let new_identity = self.last_ready != Some(id);
                self.last_ready = Some(id);
                self.state = SlotState::Ready(Arc::new(src));
                SlotUpdate::Ready { new_identity }
            }
            Err(e) => {
                tracing::warn!(role = %self.role, error = %e, "source failed to load");
                self.state = SlotState::Failed(e.to_string());
                SlotUpdate::Failed
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.state = SlotState::Empty;
    }

    pub(crate) fn ready(&self) -> Option<&Arc<RasterSource>> {
        match &self.state {
            SlotState::Ready(src) => Some(src),
            _ => None,
        }
    }

    pub(crate) fn failure(&self) -> Option<&str> {
        match &self.state {
            SlotState::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Whether all required sources are decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateStatus {
    /// Every required source is ready.
    Open,
    /// Rendering must wait; lists the roles that are not ready, in composite order.
    Waiting(Vec<SourceRole>),
}

/// Sources that passed the gate, in composite order.
#[derive(Clone, Debug)]
pub(crate) struct ReadySources {
    pub(crate) background: Arc<RasterSource>,
    pub(crate) photo: Arc<RasterSource>,
    pub(crate) overlay: Option<Arc<RasterSource>>,
}

pub(crate) fn status(
    background: &SourceSlot,
    photo: &SourceSlot,
    overlay: Option<&SourceSlot>,
) -> GateStatus {
    let mut missing = Vec::new();
    if background.ready().is_none() {
        missing.push(SourceRole::Background);
    }
    if photo.ready().is_none() {
        missing.push(SourceRole::Photo);
    }
    if let Some(o) = overlay
        && o.ready().is_none()
    {
        missing.push(SourceRole::Overlay);
    }
    if missing.is_empty() {
        GateStatus::Open
    } else {
        GateStatus::Waiting(missing)
    }
}

/// Join the slots; `None` unless background, photo and the configured overlay are all ready.
pub(crate) fn join(
    background: &SourceSlot,
    photo: &SourceSlot,
    overlay: Option<&SourceSlot>,
) -> Option<ReadySources> {
    let overlay = match overlay {
        Some(slot) => Some(slot.ready()?.clone()),
        None => None,
    };
    Some(ReadySources {
        background: background.ready()?.clone(),
        photo: photo.ready()?.clone(),
        overlay,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/gate.rs"]
mod tests;
