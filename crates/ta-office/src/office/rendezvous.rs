//! Three-phase rendezvous between one student and the helper.
//!
//! ```text
//! student                          helper
//!   │ announce_presence ──presence──▶ await_presence   (helper wakes)
//!   │ await_acceptance ◀──accepted── accept
//!   │                                 ... service ...
//!   │ await_finish     ◀──finished── finish
//! ```
//!
//! Each signal is a counting semaphore that starts at zero. Sending adds one
//! permit; waiting consumes exactly one. Nothing is broadcast, so a single
//! `accepted` wakes a single student.
//!
//! The channel carries no addressing. Pairing is implicit: the helper only
//! sends the next `accepted` after the previous `finished`, so at most one
//! student is ever between `accepted` and `finished`.

use crate::errors::OfficeError;
use tokio::sync::Semaphore;

/// Which of the three rendezvous signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Presence,
    Accepted,
    Finished,
}

impl SignalKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Presence => "presence",
            SignalKind::Accepted => "accepted",
            SignalKind::Finished => "finished",
        }
    }
}

/// A single-unit signal: non-blocking post, blocking wait.
#[derive(Debug)]
struct Signal {
    kind: SignalKind,
    units: Semaphore,
}

impl Signal {
    fn new(kind: SignalKind) -> Self {
        Self {
            kind,
            units: Semaphore::new(0),
        }
    }

    fn post(&self) {
        self.units.add_permits(1);
    }

    async fn wait(&self) -> Result<(), OfficeError> {
        let permit = self
            .units
            .acquire()
            .await
            .map_err(|_| OfficeError::OfficeClosed(self.kind.as_str()))?;
        // The unit is consumed, not returned
        permit.forget();
        Ok(())
    }

    fn pending(&self) -> usize {
        self.units.available_permits()
    }

    fn close(&self) {
        self.units.close();
    }

    fn is_closed(&self) -> bool {
        self.units.is_closed()
    }
}

/// The presence/accepted/finished signal set shared by all actors.
#[derive(Debug)]
pub struct RendezvousChannel {
    presence: Signal,
    accepted: Signal,
    finished: Signal,
}

impl Default for RendezvousChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl RendezvousChannel {
    #[must_use]
    pub fn new() -> Self {
        Self {
            presence: Signal::new(SignalKind::Presence),
            accepted: Signal::new(SignalKind::Accepted),
            finished: Signal::new(SignalKind::Finished),
        }
    }

    // --- student side -----------------------------------------------------

    /// Tell the helper a student is waiting. Never blocks.
    pub fn announce_presence(&self) {
        self.presence.post();
    }

    /// Wait until the helper accepts a student.
    ///
    /// # Errors
    ///
    /// Returns `OfficeError::OfficeClosed` if the channel was closed.
    pub async fn await_acceptance(&self) -> Result<(), OfficeError> {
        self.accepted.wait().await
    }

    /// Wait until the helper finishes the current consultation.
    ///
    /// # Errors
    ///
    /// Returns `OfficeError::OfficeClosed` if the channel was closed.
    pub async fn await_finish(&self) -> Result<(), OfficeError> {
        self.finished.wait().await
    }

    // --- helper side ------------------------------------------------------

    /// Wait until some student announces presence.
    ///
    /// Cancel-safe: dropping the future before it completes consumes nothing.
    ///
    /// # Errors
    ///
    /// Returns `OfficeError::OfficeClosed` if the channel was closed.
    pub async fn await_presence(&self) -> Result<(), OfficeError> {
        self.presence.wait().await
    }

    /// Accept one waiting student. Never blocks.
    pub fn accept(&self) {
        self.accepted.post();
    }

    /// Release the student currently consulting. Never blocks.
    pub fn finish(&self) {
        self.finished.post();
    }

    // --- lifecycle --------------------------------------------------------

    /// Unconsumed units of a signal.
    #[must_use]
    pub fn pending(&self, kind: SignalKind) -> usize {
        match kind {
            SignalKind::Presence => self.presence.pending(),
            SignalKind::Accepted => self.accepted.pending(),
            SignalKind::Finished => self.finished.pending(),
        }
    }

    /// Close `presence` and `accepted`; current and future waits on them fail.
    ///
    /// `finished` stays open. A closed semaphore refuses even a unit that was
    /// already handed to a waiter, and the helper always posts `finished` for
    /// the student it accepted before it can stop.
    pub fn close(&self) {
        self.presence.close();
        self.accepted.close();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.presence.is_closed()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_posted_unit_is_consumed_once() {
        let channel = RendezvousChannel::new();

        channel.announce_presence();
        assert_eq!(channel.pending(SignalKind::Presence), 1);

        channel.await_presence().await.unwrap();
        assert_eq!(channel.pending(SignalKind::Presence), 0);
    }

    #[tokio::test]
    async fn test_signals_accumulate() {
        let channel = RendezvousChannel::new();

        channel.announce_presence();
        channel.announce_presence();
        channel.announce_presence();
        assert_eq!(channel.pending(SignalKind::Presence), 3);

        channel.await_presence().await.unwrap();
        assert_eq!(channel.pending(SignalKind::Presence), 2);
    }

    #[tokio::test]
    async fn test_signals_are_independent() {
        let channel = RendezvousChannel::new();

        channel.accept();
        assert_eq!(channel.pending(SignalKind::Accepted), 1);
        assert_eq!(channel.pending(SignalKind::Presence), 0);
        assert_eq!(channel.pending(SignalKind::Finished), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_accept_wakes_exactly_one_waiter() {
        let channel = Arc::new(RendezvousChannel::new());
        let woken = Arc::new(AtomicUsize::new(0));

        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let channel = Arc::clone(&channel);
                let woken = Arc::clone(&woken);
                tokio::spawn(async move {
                    channel.await_acceptance().await.unwrap();
                    woken.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(woken.load(Ordering::SeqCst), 0);

        channel.accept();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(woken.load(Ordering::SeqCst), 1);

        channel.accept();
        channel.accept();
        for waiter in waiters {
            waiter.await.unwrap();
        }
        assert_eq!(woken.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_close_fails_pending_waits() {
        let channel = Arc::new(RendezvousChannel::new());

        let waiter_channel = Arc::clone(&channel);
        let waiter = tokio::spawn(async move { waiter_channel.await_acceptance().await });

        tokio::task::yield_now().await;
        channel.close();

        let result = waiter.await.unwrap();
        assert!(matches!(result, Err(OfficeError::OfficeClosed("accepted"))));
        assert!(channel.is_closed());
    }

    #[tokio::test]
    async fn test_finish_survives_close() {
        let channel = RendezvousChannel::new();

        channel.finish();
        channel.close();

        channel.await_finish().await.unwrap();
    }

    #[tokio::test]
    async fn test_close_fails_future_waits() {
        let channel = RendezvousChannel::new();
        channel.close();

        assert!(matches!(
            channel.await_presence().await,
            Err(OfficeError::OfficeClosed("presence"))
        ));
        assert!(matches!(
            channel.await_acceptance().await,
            Err(OfficeError::OfficeClosed("accepted"))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_presence_wait_consumes_nothing() {
        let channel = RendezvousChannel::new();

        let timed_out =
            tokio::time::timeout(Duration::from_millis(10), channel.await_presence()).await;
        assert!(timed_out.is_err());

        channel.announce_presence();
        assert_eq!(channel.pending(SignalKind::Presence), 1);
    }

    #[test]
    fn test_signal_names() {
        assert_eq!(SignalKind::Presence.as_str(), "presence");
        assert_eq!(SignalKind::Accepted.as_str(), "accepted");
        assert_eq!(SignalKind::Finished.as_str(), "finished");
    }
}
