//! The office: one waiting room, one rendezvous channel, shared records.
//!
//! All coordination state is owned here and reached through `Arc<Office>`;
//! nothing is global.
//!
//! # Modules
//!
//! - [`waiting_room`] - capacity gate plus the exact occupancy counter
//! - [`rendezvous`] - presence/accepted/finished handshake signals

pub mod rendezvous;
pub mod waiting_room;

pub use rendezvous::{RendezvousChannel, SignalKind};
pub use waiting_room::{Reservation, SlotToken, WaitingRoom};

use crate::actors::metrics::OfficeMetrics;
use crate::errors::OfficeError;
use crate::observability::Journal;
use std::sync::Arc;
use tracing::info;

/// Shared coordination state for one simulation run.
#[derive(Debug)]
pub struct Office {
    room: WaitingRoom,
    channel: RendezvousChannel,
    metrics: Arc<OfficeMetrics>,
    journal: Journal,
}

impl Office {
    /// Build an office with `capacity` waiting chairs.
    ///
    /// # Errors
    ///
    /// Returns `OfficeError::InvalidCapacity` if the waiting room cannot be
    /// created. This is fatal: no actor may run without an office.
    pub fn new(capacity: usize) -> Result<Arc<Self>, OfficeError> {
        let metrics = OfficeMetrics::new();
        let room = WaitingRoom::new(capacity, Arc::clone(&metrics))?;

        info!(
            target: "ta.office",
            capacity,
            "Office is open"
        );

        Ok(Arc::new(Self {
            room,
            channel: RendezvousChannel::new(),
            metrics,
            journal: Journal::new(),
        }))
    }

    #[must_use]
    pub fn room(&self) -> &WaitingRoom {
        &self.room
    }

    #[must_use]
    pub fn channel(&self) -> &RendezvousChannel {
        &self.channel
    }

    #[must_use]
    pub fn metrics(&self) -> &Arc<OfficeMetrics> {
        &self.metrics
    }

    #[must_use]
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Close the room and the channel so no actor can block forever.
    pub fn close(&self) {
        self.room.close();
        self.channel.close();
    }
}
