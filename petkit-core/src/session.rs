//! Session management for the Petkit BLE protocol
//!
//! A session represents one connection to a device and tracks:
//! - Sequence counter (one value per dispatched frame)
//! - Derived identity (cached once the device id is known)
//! - Bring-up phase

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::identity::DeviceIdentity;
use crate::sequence::SequenceCounter;

/// Bring-up phase of the handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BringUpPhase {
    /// Not connected / handshake not started
    Disconnected,

    /// Polling device details until the device id is known
    IdentityPending,

    /// Sending `INIT_DEVICE`
    Authenticating,

    /// Secret sync and clock set
    TimeSyncing,

    /// Polling device details until the serial is known
    ConfirmingIdentity,

    /// Checking the device reports itself initialized
    VerifyingInitialization,

    /// One-shot post-handshake reads
    SteadyStatePolling,
}

impl fmt::Display for BringUpPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Session manager
///
/// Thread-safe and can be cloned cheaply (Arc internally).
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    /// Held across sequence assignment and enqueue
    sequence: Mutex<SequenceCounter>,

    identity: RwLock<Option<DeviceIdentity>>,

    phase: RwLock<BringUpPhase>,
}

impl Session {
    /// Create a new session with the sequence at 0
    pub fn new() -> Self {
        Self::with_sequence(0)
    }

    /// Create a new session with the sequence at `start`
    pub fn with_sequence(start: u8) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                sequence: Mutex::new(SequenceCounter::starting_at(start)),
                identity: RwLock::new(None),
                phase: RwLock::new(BringUpPhase::Disconnected),
            }),
        }
    }

    /// Sequence value the next frame will carry
    pub fn sequence(&self) -> u8 {
        self.inner.sequence.lock().current()
    }

    /// Run `dispatch` with the current sequence value, then advance it
    ///
    /// The counter stays locked for the duration of `dispatch`, so concurrent
    /// callers observe strictly increasing values in the order their frames
    /// were handed to `dispatch`. The counter only advances when `dispatch`
    /// reports that a frame reached the send step.
    pub fn dispatch<T, E>(&self, dispatch: impl FnOnce(u8) -> Dispatched<T, E>) -> Result<T, E> {
        let mut counter = self.inner.sequence.lock();
        match dispatch(counter.current()) {
            Dispatched::Sent(result) => {
                counter.advance();
                result
            }
            Dispatched::NotSent(err) => Err(err),
        }
    }

    /// Cached identity, if derived
    pub fn identity(&self) -> Option<DeviceIdentity> {
        self.inner.identity.read().clone()
    }

    /// Cache the derived identity
    pub fn set_identity(&self, identity: DeviceIdentity) {
        *self.inner.identity.write() = Some(identity);
    }

    /// Current bring-up phase
    pub fn phase(&self) -> BringUpPhase {
        *self.inner.phase.read()
    }

    /// Move to `phase`, returning the previous one
    pub fn set_phase(&self, phase: BringUpPhase) -> BringUpPhase {
        std::mem::replace(&mut *self.inner.phase.write(), phase)
    }

    /// Check if the handshake has completed
    pub fn is_ready(&self) -> bool {
        matches!(self.phase(), BringUpPhase::SteadyStatePolling)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a dispatch closure passed to [`Session::dispatch`]
#[derive(Debug)]
pub enum Dispatched<T, E> {
    /// Frame reached the transport; the send result is carried through
    Sent(Result<T, E>),

    /// Frame was never built (encoding failed)
    NotSent(E),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_new() {
        let session = Session::new();
        assert_eq!(session.sequence(), 0);
        assert_eq!(session.phase(), BringUpPhase::Disconnected);
        assert!(session.identity().is_none());
        assert!(!session.is_ready());
    }

    #[test]
    fn test_dispatch_advances_after_send() {
        let session = Session::new();
        let seq: Result<u8, ()> = session.dispatch(|seq| Dispatched::Sent(Ok(seq)));
        assert_eq!(seq, Ok(0));
        assert_eq!(session.sequence(), 1);
    }

    #[test]
    fn test_dispatch_advances_on_send_failure() {
        let session = Session::new();
        let result: Result<(), &str> = session.dispatch(|_| Dispatched::Sent(Err("queue closed")));
        assert!(result.is_err());
        assert_eq!(session.sequence(), 1);
    }

    #[test]
    fn test_dispatch_keeps_sequence_when_not_sent() {
        let session = Session::with_sequence(5);
        let result: Result<(), &str> = session.dispatch(|_| Dispatched::NotSent("encode"));
        assert_eq!(result, Err("encode"));
        assert_eq!(session.sequence(), 5);
    }

    #[test]
    fn test_dispatch_wraps() {
        let session = Session::with_sequence(255);
        let a: Result<u8, ()> = session.dispatch(|seq| Dispatched::Sent(Ok(seq)));
        let b: Result<u8, ()> = session.dispatch(|seq| Dispatched::Sent(Ok(seq)));
        assert_eq!((a, b), (Ok(255), Ok(0)));
    }

    #[test]
    fn test_phase_transitions() {
        let session = Session::new();
        let previous = session.set_phase(BringUpPhase::IdentityPending);
        assert_eq!(previous, BringUpPhase::Disconnected);

        session.set_phase(BringUpPhase::SteadyStatePolling);
        assert!(session.is_ready());
    }

    #[test]
    fn test_session_clone() {
        let session1 = Session::new();
        let session2 = session1.clone();

        session1.set_identity(DeviceIdentity::derive(&[1, 2]).unwrap());
        let _: Result<u8, ()> = session1.dispatch(|seq| Dispatched::Sent(Ok(seq)));

        // Both share same state
        assert!(session2.identity().is_some());
        assert_eq!(session2.sequence(), 1);
    }
}
