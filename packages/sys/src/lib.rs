//! # flashcfg-sys
//!
//! Host OS primitives behind the flashcfg storage capabilities.
//!
//! On a device, the config file lives on a LittleFS/SPIFFS partition and the
//! wear counters in EEPROM emulation. On a host, this crate provides:
//!
//! ```text
//! LocalDiskStorage    StorageProvider over a directory
//! FileCounterStore    DurableCounterStore over a fixed-size image file
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use flashcfg_json_store::ConfigStore;
//! use flashcfg_sys::LocalDiskStorage;
//!
//! let mut store = ConfigStore::with_path(LocalDiskStorage::new("/var/lib/device"), "/config.json");
//! store.load("/config.json", true);
//! println!("{}", store.render());
//! ```

pub mod counter;
pub mod fs;

pub use counter::FileCounterStore;
pub use fs::LocalDiskStorage;
