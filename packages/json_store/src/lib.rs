//! JSON-backed configuration for flashcfg
//!
//! [`ConfigStore`] keeps a section → key → value map in memory and persists
//! it as one JSON file on any [`StorageProvider`](flashcfg_ll_store::StorageProvider).
//! [`DeviceState`] layers address-based access on top, and [`DeviceContext`]
//! wires a device's stores to a shared wear tracker at boot.

pub mod config_store;
pub mod context;
pub mod defaults;
pub mod device_state;
pub mod json_utils;

pub use config_store::{
    ConfigStore, LoadSource, PersistenceTarget, DEFAULT_CONFIG_PATH, DEFAULT_MAX_SIZE,
};
pub use context::{DeviceContext, NETWORK_CONFIG_PATH};
pub use defaults::{default_config, DEFAULT_DOCUMENT};
pub use device_state::{DeviceState, DEVICE_STATE_PATH};
