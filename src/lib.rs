//! Ravenfell Synchronization Server
//!
//! Per-tick world-state synchronization for a tile-based multiplayer world.
//! Gameplay systems stage values and raise dirty flags on actors; once per
//! fixed tick the engine freezes that state, renders a personalized update
//! run for every connected observer in parallel, and flushes the runs to the
//! transport.
//!
//! Module map:
//!
//! - [`world`] - actor state, generational slot storage, visibility policies
//! - [`sync`] - the three-phase tick engine and the update-block codecs
//! - [`wire`] - obfuscated fixed-width write primitives and buffer pooling
//! - [`net`] - outgoing message queues and the transport seam
//! - [`config`] / [`metrics`] - the operational surface

pub mod config;
pub mod metrics;
pub mod net;
pub mod sync;
pub mod util;
pub mod wire;
pub mod world;
