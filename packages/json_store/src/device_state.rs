//! Device state addressed by [`DeviceAddress`].
//!
//! Firmware written against numbered EEPROM slots reads and writes the same
//! settings here by address; each address names a section and key in a
//! dedicated config file.

use flashcfg_core_store::{DeviceAddress, NOT_FOUND};
use flashcfg_ll_store::StorageProvider;

use crate::ConfigStore;

/// Default device state file path.
pub const DEVICE_STATE_PATH: &str = "/savedState.json";

pub struct DeviceState<S> {
    store: ConfigStore<S>,
}

impl<S: StorageProvider> DeviceState<S> {
    pub fn new(store: ConfigStore<S>) -> Self {
        Self { store }
    }

    /// Load the store's target file.
    pub fn load(&mut self) -> bool {
        self.store.load_config()
    }

    /// The stored value, or an empty string if there is none.
    pub fn get(&self, address: DeviceAddress) -> String {
        let value = self.store.get_value(address.section(), address.key());
        if value == NOT_FOUND {
            log::debug!("No value stored for {}", address);
            String::new()
        } else {
            value
        }
    }

    /// The stored value as an integer, if there is one and it parses.
    pub fn get_int(&self, address: DeviceAddress) -> Option<i32> {
        let value = self.get(address);
        if value.is_empty() {
            return None;
        }
        match value.trim().parse() {
            Ok(parsed) => Some(parsed),
            Err(error) => {
                log::warn!("Value '{}' of {} is not an integer: {}", value, address, error);
                None
            }
        }
    }

    /// Store a value and save immediately.
    pub fn put(&mut self, address: DeviceAddress, value: &str) -> bool {
        self.store
            .set_value(address.section(), address.key(), value);
        let saved = self.store.save();
        if saved {
            log::debug!("Stored '{}' at {}", value, address);
        }
        saved
    }

    pub fn put_int(&mut self, address: DeviceAddress, value: i32) -> bool {
        self.put(address, &value.to_string())
    }

    /// Fill in every listed address that has no value yet.
    ///
    /// Saves once if anything was added. Returns `false` only if that save
    /// failed.
    pub fn seed_defaults(&mut self, defaults: &[(DeviceAddress, i32)]) -> bool {
        let mut added = 0;
        for (address, value) in defaults {
            let section = self.store.get_section_mut(address.section());
            if !section.contains_key(address.key()) {
                section.insert(address.key().to_string(), value.to_string());
                added += 1;
            }
        }
        if added == 0 {
            return true;
        }
        log::info!("Seeded {} device state defaults", added);
        self.store.save()
    }

    pub fn store(&self) -> &ConfigStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ConfigStore<S> {
        &mut self.store
    }

    pub fn into_store(self) -> ConfigStore<S> {
        self.store
    }
}

impl<S> std::fmt::Debug for DeviceState<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceState")
            .field("store", &self.store)
            .finish()
    }
}
