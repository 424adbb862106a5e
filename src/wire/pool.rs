//! Scratch-buffer pooling for encode tasks.
//!
//! Length-prefixed sub-blocks are built in a scratch buffer before being
//! copied into the packet. Scratch space is pooled and handed out as an RAII
//! guard, so a buffer is cleared and returned exactly once even when the
//! encoding task unwinds.

use std::ops::{Deref, DerefMut};

use parking_lot::Mutex;

use crate::wire::buffer::WireBuf;

/// Idle buffers kept beyond this count are dropped instead of pooled.
const MAX_IDLE: usize = 64;

pub struct BufferPool {
    free: Mutex<Vec<WireBuf>>,
    buf_capacity: usize,
}

impl BufferPool {
    /// `buf_capacity` is the initial capacity of freshly created buffers;
    /// pooled buffers keep whatever they grew to.
    pub fn new(buf_capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            buf_capacity,
        }
    }

    /// Takes a cleared buffer from the pool, creating one if none are idle.
    pub fn acquire(&self) -> PooledBuf<'_> {
        let buf = self
            .free
            .lock()
            .pop()
            .unwrap_or_else(|| WireBuf::with_capacity(self.buf_capacity));
        PooledBuf {
            buf: Some(buf),
            pool: self,
        }
    }

    /// Number of idle buffers currently pooled.
    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }

    fn release(&self, mut buf: WireBuf) {
        buf.clear();
        let mut free = self.free.lock();
        if free.len() < MAX_IDLE {
            free.push(buf);
        }
    }
}

/// Guard over a pooled [`WireBuf`]; returns the buffer on drop.
pub struct PooledBuf<'a> {
    buf: Option<WireBuf>,
    pool: &'a BufferPool,
}

impl Deref for PooledBuf<'_> {
    type Target = WireBuf;

    fn deref(&self) -> &WireBuf {
        self.buf.as_ref().unwrap()
    }
}

impl DerefMut for PooledBuf<'_> {
    fn deref_mut(&mut self) -> &mut WireBuf {
        self.buf.as_mut().unwrap()
    }
}

impl Drop for PooledBuf<'_> {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            self.pool.release(buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::buffer::Transform;

    #[test]
    fn test_acquire_gives_empty_buffer() {
        let pool = BufferPool::new(16);
        let buf = pool.acquire();
        assert!(buf.is_empty());
    }

    #[test]
    fn test_buffer_returns_on_drop() {
        let pool = BufferPool::new(16);
        assert_eq!(pool.idle(), 0);
        {
            let mut buf = pool.acquire();
            buf.put_u8(Transform::None, 1);
            assert_eq!(pool.idle(), 0);
        }
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_returned_buffer_is_cleared() {
        let pool = BufferPool::new(16);
        {
            let mut buf = pool.acquire();
            buf.put_bytes(&[1, 2, 3]);
        }
        let buf = pool.acquire();
        assert!(buf.is_empty());
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_buffer_returns_on_unwind() {
        let pool = BufferPool::new(16);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut buf = pool.acquire();
            buf.put_u8(Transform::None, 9);
            panic!("encode failure");
        }));
        assert!(result.is_err());
        assert_eq!(pool.idle(), 1);
        assert!(pool.acquire().is_empty());
    }

    #[test]
    fn test_idle_buffers_are_capped() {
        let pool = BufferPool::new(16);
        let guards: Vec<_> = (0..MAX_IDLE + 10).map(|_| pool.acquire()).collect();
        drop(guards);
        assert_eq!(pool.idle(), MAX_IDLE);
    }
}
