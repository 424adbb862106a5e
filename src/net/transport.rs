//! Delivery seam between the synchronization engine and the network layer.
//!
//! Real connection handling lives outside this crate; the engine only needs
//! a way to hand a finished message to a session and to tear a session down
//! after a contained failure.

use hashbrown::HashSet;
use parking_lot::Mutex;
use thiserror::Error;
use uuid::Uuid;

use crate::net::queue::OutgoingMessage;

/// Connection identity of a human observer, stable for the whole login.
pub type SessionId = Uuid;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("session {0} is closed")]
    SessionClosed(SessionId),
    #[error("delivery to session {session} failed: {reason}")]
    Delivery { session: SessionId, reason: String },
}

pub trait Transport: Send + Sync {
    /// Delivers one message to a session. A failure here is contained by the
    /// caller: the session is disconnected and the tick continues.
    fn deliver(&self, session: SessionId, message: &OutgoingMessage)
        -> Result<(), TransportError>;

    /// Tears down a session. Called after contained failures and explicit
    /// removals; must tolerate already-closed sessions.
    fn close(&self, session: SessionId, reason: &str);
}

/// Discards every message. Stands in for the network layer in the headless
/// harness and benchmarks.
#[derive(Debug, Default)]
pub struct NullTransport;

impl Transport for NullTransport {
    fn deliver(
        &self,
        _session: SessionId,
        _message: &OutgoingMessage,
    ) -> Result<(), TransportError> {
        Ok(())
    }

    fn close(&self, session: SessionId, reason: &str) {
        tracing::debug!("Session {} closed: {}", session, reason);
    }
}

/// Records deliveries and closures for test assertions. Sessions can be told
/// to fail, which exercises the engine's disconnect-and-continue path.
#[derive(Debug, Default)]
pub struct CollectingTransport {
    delivered: Mutex<Vec<(SessionId, OutgoingMessage)>>,
    closed: Mutex<Vec<(SessionId, String)>>,
    failing: Mutex<HashSet<SessionId>>,
}

impl CollectingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// All deliveries so far, in flush order.
    pub fn delivered(&self) -> Vec<(SessionId, OutgoingMessage)> {
        self.delivered.lock().clone()
    }

    /// Deliveries addressed to one session, in flush order.
    pub fn delivered_to(&self, session: SessionId) -> Vec<OutgoingMessage> {
        self.delivered
            .lock()
            .iter()
            .filter(|(s, _)| *s == session)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn closed(&self) -> Vec<(SessionId, String)> {
        self.closed.lock().clone()
    }

    /// Makes every subsequent delivery to `session` fail.
    pub fn fail_session(&self, session: SessionId) {
        self.failing.lock().insert(session);
    }

    pub fn clear(&self) {
        self.delivered.lock().clear();
        self.closed.lock().clear();
    }
}

impl Transport for CollectingTransport {
    fn deliver(
        &self,
        session: SessionId,
        message: &OutgoingMessage,
    ) -> Result<(), TransportError> {
        if self.failing.lock().contains(&session) {
            return Err(TransportError::Delivery {
                session,
                reason: "socket gone".to_owned(),
            });
        }
        self.delivered.lock().push((session, message.clone()));
        Ok(())
    }

    fn close(&self, session: SessionId, reason: &str) {
        self.closed.lock().push((session, reason.to_owned()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn sync_update(bytes: &[u8]) -> OutgoingMessage {
        OutgoingMessage::SyncUpdate(Arc::from(bytes))
    }

    #[test]
    fn test_collecting_transport_records_in_order() {
        let transport = CollectingTransport::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        transport.deliver(a, &sync_update(&[1])).unwrap();
        transport.deliver(b, &sync_update(&[2])).unwrap();
        transport.deliver(a, &sync_update(&[3])).unwrap();

        assert_eq!(transport.delivered().len(), 3);
        assert_eq!(
            transport.delivered_to(a),
            vec![sync_update(&[1]), sync_update(&[3])]
        );
    }

    #[test]
    fn test_failing_session_errors_on_delivery() {
        let transport = CollectingTransport::new();
        let session = Uuid::new_v4();
        transport.fail_session(session);

        assert!(transport.deliver(session, &sync_update(&[0])).is_err());
        assert!(transport.delivered().is_empty());
    }

    #[test]
    fn test_close_is_recorded() {
        let transport = CollectingTransport::new();
        let session = Uuid::new_v4();
        transport.close(session, "flush failed");
        assert_eq!(
            transport.closed(),
            vec![(session, "flush failed".to_owned())]
        );
    }

    #[test]
    fn test_null_transport_accepts_everything() {
        let transport = NullTransport;
        let session = Uuid::new_v4();
        assert!(transport.deliver(session, &sync_update(&[9])).is_ok());
        transport.close(session, "shutdown");
    }
}
