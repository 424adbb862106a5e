//! Outgoing message plumbing and the transport seam.

pub mod queue;
pub mod transport;

pub use queue::{MessageQueue, OutgoingMessage};
pub use transport::{
    CollectingTransport, NullTransport, SessionId, Transport, TransportError,
};
