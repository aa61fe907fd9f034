//! Durable wear records.
//!
//! # Layout
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ value: u32 (little endian)   │  Offset: 0
//! ├──────────────────────────────┤
//! │ tag: u8 (0xAA when valid)    │  Offset: 4
//! ├──────────────────────────────┤
//! │ reserved: [u8; 3] = 0        │  Offset: 5
//! └──────────────────────────────┘
//! ```

/// Size of one encoded record.
pub const RECORD_SIZE: usize = 8;

/// Tag byte marking a record as written by us.
pub const VALID_TAG: u8 = 0xAA;

/// A counter value plus its validity tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WearRecord {
    pub value: u32,
    pub tag: u8,
}

/// How a starting count was derived from a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOrigin {
    /// The tag was valid; the value is trusted.
    Valid,
    /// The tag was invalid but the value was plausible.
    Recovered,
    /// Nothing usable was stored; counting restarts at zero.
    Reset,
}

impl WearRecord {
    /// A record carrying the valid tag.
    pub fn valid(value: u32) -> Self {
        Self {
            value,
            tag: VALID_TAG,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.tag == VALID_TAG
    }

    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        buf[0..4].copy_from_slice(&self.value.to_le_bytes());
        buf[4] = self.tag;
        buf
    }

    /// Decode the first [`RECORD_SIZE`] bytes of `bytes`.
    ///
    /// Returns `None` if fewer bytes are available.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < RECORD_SIZE {
            return None;
        }
        Some(Self {
            value: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            tag: bytes[4],
        })
    }

    /// The count to start from given an upper sanity bound.
    ///
    /// A valid record is trusted as-is. An invalid record whose value lies
    /// strictly between zero and `bound` is kept as a best-effort recovery.
    /// Anything else restarts at zero.
    pub fn resolve(&self, bound: u32) -> (u32, RecordOrigin) {
        if self.is_valid() {
            (self.value, RecordOrigin::Valid)
        } else if self.value > 0 && self.value < bound {
            (self.value, RecordOrigin::Recovered)
        } else {
            (0, RecordOrigin::Reset)
        }
    }
}
