//! Capacity-bounded waiting room.
//!
//! Capacity is enforced twice and both must agree:
//!
//! - `occupied`, a counter behind a mutex, decides admission or rejection
//!   without blocking ([`WaitingRoom::try_reserve_slot`]).
//! - a counting semaphore with `capacity` permits bounds how many students
//!   physically hold a chair ([`WaitingRoom::acquire_slot_token`]).
//!
//! A student reserves before it acquires and releases before it leaves, so
//! the number of token holders never exceeds `occupied`.

use crate::actors::metrics::OfficeMetrics;
use crate::errors::OfficeError;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::{debug, error};

/// Result of a non-blocking admission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    /// A chair was reserved; `occupied` includes it.
    Reserved { occupied: usize },
    /// Every chair was taken; `occupied` equals capacity.
    Rejected { occupied: usize },
}

impl Reservation {
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        matches!(self, Reservation::Reserved { .. })
    }
}

/// A physical chair held by one student.
///
/// Dropping the token returns the chair; [`WaitingRoom::release_slot_token`]
/// does the same explicitly.
#[derive(Debug)]
#[must_use = "dropping a SlotToken releases the chair immediately"]
pub struct SlotToken<'a> {
    _permit: SemaphorePermit<'a>,
}

/// The waiting room shared by all students.
#[derive(Debug)]
pub struct WaitingRoom {
    capacity: usize,
    occupied: Mutex<usize>,
    chairs: Semaphore,
    metrics: Arc<OfficeMetrics>,
}

impl WaitingRoom {
    /// Create a waiting room with `capacity` chairs.
    ///
    /// # Errors
    ///
    /// Returns `OfficeError::InvalidCapacity` if `capacity` is zero or larger
    /// than the semaphore can represent.
    pub fn new(capacity: usize, metrics: Arc<OfficeMetrics>) -> Result<Self, OfficeError> {
        if capacity == 0 || capacity > Semaphore::MAX_PERMITS {
            return Err(OfficeError::InvalidCapacity(capacity));
        }

        Ok(Self {
            capacity,
            occupied: Mutex::new(0),
            chairs: Semaphore::new(capacity),
            metrics,
        })
    }

    /// Reserve a chair if one is free. Never blocks.
    ///
    /// The check and the increment happen under one lock, so two students
    /// cannot both take the last chair.
    pub fn try_reserve_slot(&self) -> Reservation {
        let mut occupied = self.occupied.lock().unwrap_or_else(PoisonError::into_inner);

        if *occupied < self.capacity {
            *occupied += 1;
            self.metrics.record_admitted(*occupied);
            Reservation::Reserved {
                occupied: *occupied,
            }
        } else {
            self.metrics.record_rejected();
            Reservation::Rejected {
                occupied: *occupied,
            }
        }
    }

    /// Take a physical chair, waiting until one is available.
    ///
    /// Only called after [`try_reserve_slot`](Self::try_reserve_slot)
    /// returned `Reserved`.
    ///
    /// # Errors
    ///
    /// Returns `OfficeError::OfficeClosed` if the room was closed.
    pub async fn acquire_slot_token(&self) -> Result<SlotToken<'_>, OfficeError> {
        let permit = self
            .chairs
            .acquire()
            .await
            .map_err(|_| OfficeError::OfficeClosed("waiting room"))?;
        Ok(SlotToken { _permit: permit })
    }

    /// Give a chair back. Never blocks.
    pub fn release_slot_token(&self, token: SlotToken<'_>) {
        drop(token);
        debug!(
            target: "ta.office",
            available = self.chairs.available_permits(),
            "Chair released"
        );
    }

    /// Leave the waiting room, decrementing `occupied`.
    ///
    /// Returns the occupancy after leaving. A call with nobody seated is a
    /// protocol violation: it is logged and `occupied` stays at zero.
    pub fn leave_room(&self) -> usize {
        let mut occupied = self.occupied.lock().unwrap_or_else(PoisonError::into_inner);

        if *occupied == 0 {
            error!(
                target: "ta.office",
                capacity = self.capacity,
                "leave_room called with an empty waiting room"
            );
        } else {
            *occupied -= 1;
        }
        self.metrics.record_vacated(*occupied);
        *occupied
    }

    /// Number of chairs.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Chairs currently reserved.
    #[must_use]
    pub fn occupied(&self) -> usize {
        *self.occupied.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Physical chairs not held by anyone.
    #[must_use]
    pub fn available_tokens(&self) -> usize {
        self.chairs.available_permits()
    }

    /// Close the room: pending and future `acquire_slot_token` calls fail.
    pub fn close(&self) {
        self.chairs.close();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn room(capacity: usize) -> WaitingRoom {
        WaitingRoom::new(capacity, OfficeMetrics::new()).unwrap()
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = WaitingRoom::new(0, OfficeMetrics::new());
        assert!(matches!(result, Err(OfficeError::InvalidCapacity(0))));
    }

    #[test]
    fn test_oversized_capacity_rejected() {
        let result = WaitingRoom::new(Semaphore::MAX_PERMITS + 1, OfficeMetrics::new());
        assert!(matches!(result, Err(OfficeError::InvalidCapacity(_))));
    }

    #[test]
    fn test_new_room_is_empty() {
        let room = room(5);
        assert_eq!(room.capacity(), 5);
        assert_eq!(room.occupied(), 0);
        assert_eq!(room.available_tokens(), 5);
    }

    #[test]
    fn test_reserve_until_full_then_reject() {
        let room = room(2);

        assert_eq!(room.try_reserve_slot(), Reservation::Reserved { occupied: 1 });
        assert_eq!(room.try_reserve_slot(), Reservation::Reserved { occupied: 2 });
        assert_eq!(room.try_reserve_slot(), Reservation::Rejected { occupied: 2 });
        assert_eq!(room.occupied(), 2);
    }

    #[test]
    fn test_leave_room_frees_a_reservation() {
        let room = room(1);

        assert!(room.try_reserve_slot().is_reserved());
        assert!(!room.try_reserve_slot().is_reserved());

        assert_eq!(room.leave_room(), 0);
        assert!(room.try_reserve_slot().is_reserved());
    }

    #[test]
    fn test_leave_empty_room_never_goes_negative() {
        let room = room(3);
        assert_eq!(room.leave_room(), 0);
        assert_eq!(room.occupied(), 0);
    }

    #[test]
    fn test_reservations_feed_metrics() {
        let metrics = OfficeMetrics::new();
        let room = WaitingRoom::new(1, Arc::clone(&metrics)).unwrap();

        let _ = room.try_reserve_slot();
        let _ = room.try_reserve_slot();
        room.leave_room();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.admitted, 1);
        assert_eq!(snapshot.rejected, 1);
        assert_eq!(snapshot.peak_seated, 1);
        assert_eq!(snapshot.seated, 0);
    }

    #[tokio::test]
    async fn test_token_acquire_and_release() {
        let room = room(2);

        let first = room.acquire_slot_token().await.unwrap();
        let second = room.acquire_slot_token().await.unwrap();
        assert_eq!(room.available_tokens(), 0);

        room.release_slot_token(first);
        assert_eq!(room.available_tokens(), 1);
        room.release_slot_token(second);
        assert_eq!(room.available_tokens(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_acquire_blocks_when_exhausted() {
        let room = Arc::new(room(1));
        let held = room.acquire_slot_token().await.unwrap();

        let waiter_room = Arc::clone(&room);
        let waiter = tokio::spawn(async move {
            let token = waiter_room.acquire_slot_token().await.unwrap();
            waiter_room.release_slot_token(token);
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        room.release_slot_token(held);
        waiter.await.unwrap();
        assert_eq!(room.available_tokens(), 1);
    }

    #[tokio::test]
    async fn test_closed_room_fails_acquire() {
        let room = room(1);
        let _held = room.acquire_slot_token().await.unwrap();

        room.close();

        let result = room.acquire_slot_token().await;
        assert!(matches!(result, Err(OfficeError::OfficeClosed("waiting room"))));
    }

    #[test]
    fn test_concurrent_reservations_never_exceed_capacity() {
        let room = Arc::new(room(5));

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let room = Arc::clone(&room);
                std::thread::spawn(move || room.try_reserve_slot())
            })
            .collect();

        let reserved = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(Reservation::is_reserved)
            .count();

        assert_eq!(reserved, 5);
        assert_eq!(room.occupied(), 5);
    }
}
