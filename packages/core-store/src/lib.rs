//! Core flashcfg: the semantic layer
//!
//! This layer gives meaning to the raw bytes of `flashcfg-ll-store`:
//! - [`ConfigMap`]: the two-level section → key → value string map
//! - [`ConfigProvider`]: the narrow interface firmware reads settings through
//! - [`WearRecord`]: the fixed layout of a durable counter
//! - [`WearTracker`]: write and boot counting with a retirement policy
//! - [`DeviceAddress`]: the static table of named device settings
//!
//! Nothing here parses JSON. That is the job of `flashcfg-json-store`.
//!
//! # Example
//!
//! ```rust
//! use flashcfg_core_store::{ConfigProvider, NOT_FOUND};
//!
//! fn ssid(config: &dyn ConfigProvider) -> Option<String> {
//!     let value = config.get_value("wifiSTA", "ssid");
//!     (value != NOT_FOUND).then_some(value)
//! }
//! ```

pub mod address;
pub mod clock;
mod error;
pub mod hex;
pub mod map;
pub mod record;
pub mod settings;
mod traits;
pub mod wear;

pub use address::{AddressEntry, DeviceAddress, ADDRESS_TABLE};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::Error;
pub use hex::parse_hex_to_bytes;
pub use map::{ConfigMap, SectionMap, AUTH_SECTION, EMPTY_SECTION, NOT_FOUND, RESERVED_PREFIX};
pub use record::{RecordOrigin, WearRecord, RECORD_SIZE, VALID_TAG};
pub use settings::{Thresholds, WearSettings};
pub use traits::ConfigProvider;
pub use wear::{inspect as inspect_wear, WarningLevel, WearSnapshot, WearTracker, WriteObserver};

// Re-export LL types for convenience
pub use flashcfg_ll_store::{DurableCounterStore, LLError, OpenMode, StorageProvider};
