//! Low-level flashcfg capabilities
//!
//! This is the narrow waist of the flashcfg stack. Everything at this level is
//! pure bytes - no JSON, no counters, no format interpretation.
//!
//! Two capabilities live here:
//! - [`StorageProvider`]: a mountable filesystem with byte-granular files
//! - [`DurableCounterStore`]: a small EEPROM-style region addressed by offset
//!
//! Board support crates implement these for LittleFS/SPIFFS and EEPROM
//! emulation. The [`memory`] module provides in-memory versions for hosts
//! and tests.
//!
//! # Example
//!
//! ```rust
//! use flashcfg_ll_store::{DurableCounterStore, MemoryCounterStore};
//!
//! let mut eeprom = MemoryCounterStore::new(64);
//! eeprom.write_bytes(8, &[1, 0, 0, 0]).unwrap();
//! assert_eq!(&eeprom.read_bytes(8, 4).unwrap()[..], &[1, 0, 0, 0]);
//! ```

pub use bytes::Bytes;

mod error;
pub mod memory;
mod traits;

pub use error::LLError;
pub use memory::{MemoryCounterStore, MemoryStorage, StorageFaults, StorageStats};
pub use traits::{check_bounds, DurableCounterStore, FileHandle, OpenMode, StorageProvider};
