//! Legacy binary wire primitives: obfuscated fixed-width writes and pooled
//! scratch buffers.

pub mod buffer;
pub mod pool;

pub use buffer::{ByteOrder, Transform, WireBuf};
pub use pool::{BufferPool, PooledBuf};
