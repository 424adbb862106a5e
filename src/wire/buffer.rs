//! Append-only binary buffer with the legacy client's obfuscation arithmetic.
//!
//! Every multi-byte write picks a byte order and an obfuscation transform.
//! The transform is applied to the least-significant byte of the value only,
//! in whichever position the byte order places it; the remaining bytes go out
//! untouched. The two middle orderings exist solely for 4-byte writes and
//! never combine with a transform. Violating either rule is a programming
//! error in an encoder, not a runtime condition, and panics.

/// Per-write obfuscation applied to the value's least-significant byte.
///
/// All arithmetic is wrapping in `u8` space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Byte is written as-is.
    None,
    /// `b + 128`
    Add,
    /// `128 - b`
    Subtract,
    /// `-b`
    Negate,
}

impl Transform {
    #[inline]
    fn apply(self, b: u8) -> u8 {
        match self {
            Transform::None => b,
            Transform::Add => b.wrapping_add(128),
            Transform::Subtract => 128u8.wrapping_sub(b),
            Transform::Negate => b.wrapping_neg(),
        }
    }
}

/// Byte ordering of a multi-byte write.
///
/// `Middle` and `InverseMiddle` are 4-byte-only orderings inherited from the
/// client and are always written plain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Big,
    Little,
    Middle,
    InverseMiddle,
}

/// Growable append-only byte buffer.
///
/// Packet assembly only ever appends; rewinds and patches do not exist in
/// this protocol. Length-prefixed sub-blocks are produced by encoding into a
/// scratch `WireBuf` first and copying it in (see the appearance encoder).
#[derive(Debug, Default)]
pub struct WireBuf {
    bytes: Vec<u8>,
}

impl WireBuf {
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }

    #[inline]
    pub fn put_u8(&mut self, transform: Transform, value: u8) {
        self.bytes.push(transform.apply(value));
    }

    pub fn put_u16(&mut self, order: ByteOrder, transform: Transform, value: u16) {
        let lsb = transform.apply(value as u8);
        let msb = (value >> 8) as u8;
        match order {
            ByteOrder::Big => {
                self.bytes.push(msb);
                self.bytes.push(lsb);
            }
            ByteOrder::Little => {
                self.bytes.push(lsb);
                self.bytes.push(msb);
            }
            ByteOrder::Middle | ByteOrder::InverseMiddle => {
                panic!("middle byte orders are 4-byte only (2-byte write)")
            }
        }
    }

    pub fn put_u32(&mut self, order: ByteOrder, transform: Transform, value: u32) {
        let b = value.to_be_bytes();
        match order {
            ByteOrder::Big => {
                self.bytes.extend_from_slice(&[b[0], b[1], b[2], transform.apply(b[3])]);
            }
            ByteOrder::Little => {
                self.bytes.extend_from_slice(&[transform.apply(b[3]), b[2], b[1], b[0]]);
            }
            ByteOrder::Middle => {
                self.check_plain_middle(transform);
                self.bytes.extend_from_slice(&[b[2], b[3], b[0], b[1]]);
            }
            ByteOrder::InverseMiddle => {
                self.check_plain_middle(transform);
                self.bytes.extend_from_slice(&[b[1], b[0], b[3], b[2]]);
            }
        }
    }

    pub fn put_u64(&mut self, order: ByteOrder, transform: Transform, value: u64) {
        let b = value.to_be_bytes();
        match order {
            ByteOrder::Big => {
                self.bytes.extend_from_slice(&b[..7]);
                self.bytes.push(transform.apply(b[7]));
            }
            ByteOrder::Little => {
                self.bytes.push(transform.apply(b[7]));
                for byte in b[..7].iter().rev() {
                    self.bytes.push(*byte);
                }
            }
            ByteOrder::Middle | ByteOrder::InverseMiddle => {
                panic!("middle byte orders are 4-byte only (8-byte write)")
            }
        }
    }

    /// Raw copy, no ordering or transform.
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Copies `bytes` last-to-first. Used for sub-blocks the client reads
    /// backwards.
    pub fn put_bytes_reversed(&mut self, bytes: &[u8]) {
        self.bytes.extend(bytes.iter().rev());
    }

    /// String payload: raw bytes followed by the `0x0A` terminator.
    pub fn put_terminated(&mut self, text: &str) {
        self.bytes.extend_from_slice(text.as_bytes());
        self.bytes.push(0x0A);
    }

    #[inline]
    fn check_plain_middle(&self, transform: Transform) {
        if transform != Transform::None {
            panic!("middle byte orders take no transform (got {transform:?})");
        }
    }
}

impl AsRef<[u8]> for WireBuf {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}
