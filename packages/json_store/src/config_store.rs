//! A section → key → value store persisted as one JSON file.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use flashcfg_core_store::map::{self, display_name, is_hidden};
use flashcfg_core_store::{
    parse_hex_to_bytes, ConfigMap, ConfigProvider, Error, SectionMap, WriteObserver,
    AUTH_SECTION, EMPTY_SECTION, NOT_FOUND,
};
use flashcfg_ll_store::{Bytes, LLError, OpenMode, StorageProvider};

use crate::{defaults, json_utils};

/// Default config file path.
pub const DEFAULT_CONFIG_PATH: &str = "/config.json";

/// Default document size hint in bytes.
pub const DEFAULT_MAX_SIZE: usize = 8192;

/// Where a store keeps its document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceTarget {
    pub path: String,
    /// Expected upper bound of the serialized document. Larger documents
    /// are still read and written, with a warning.
    pub max_size: usize,
}

impl Default for PersistenceTarget {
    fn default() -> Self {
        Self {
            path: DEFAULT_CONFIG_PATH.to_string(),
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}

impl PersistenceTarget {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }
}

/// Where the current map came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// The target file parsed cleanly.
    File,
    /// The embedded default document was used instead.
    Defaults,
}

/// A mounted filesystem, unmounted again when dropped.
struct Session<'a, S: StorageProvider + ?Sized> {
    storage: &'a mut S,
}

impl<'a, S: StorageProvider + ?Sized> Session<'a, S> {
    fn mount(storage: &'a mut S) -> Result<Self, LLError> {
        storage.mount()?;
        Ok(Self { storage })
    }

    fn read_file(&mut self, path: &str) -> Result<Bytes, LLError> {
        let handle = self.storage.open(path, OpenMode::Read)?;
        let result = self.storage.read_all(handle);
        self.storage.close(handle);
        result
    }

    fn write_file(&mut self, path: &str, data: &[u8]) -> Result<usize, LLError> {
        let handle = self.storage.open(path, OpenMode::Write)?;
        let result = self.storage.write(handle, data);
        self.storage.close(handle);
        result
    }

    fn remove(&mut self, path: &str) -> Result<(), LLError> {
        self.storage.remove(path)
    }
}

impl<S: StorageProvider + ?Sized> Drop for Session<'_, S> {
    fn drop(&mut self) {
        self.storage.unmount();
    }
}

/// Configuration held in memory and persisted to a single JSON file.
///
/// Every value is a string. Reads never fail: a missing value reads as
/// [`NOT_FOUND`]. Loading never leaves the store empty: anything that
/// prevents the file from being read or parsed falls back to the embedded
/// default document.
///
/// The filesystem is mounted only for the duration of each load, save or
/// clear.
///
/// # Example
///
/// ```rust
/// use flashcfg_json_store::ConfigStore;
/// use flashcfg_ll_store::MemoryStorage;
///
/// let mut store = ConfigStore::with_path(MemoryStorage::new(), "/config.json");
/// assert!(store.load("/config.json", false));
/// assert_eq!(store.get_value("_auth", "user"), "admin");
///
/// store.set_value("wifiSTA", "ssid", "home");
/// assert!(store.save());
///
/// let mut reloaded = ConfigStore::with_path(store.into_storage(), "/config.json");
/// assert!(reloaded.load_config());
/// assert_eq!(reloaded.get_value("wifiSTA", "ssid"), "home");
/// ```
pub struct ConfigStore<S> {
    storage: S,
    target: PersistenceTarget,
    map: ConfigMap,
    source: Option<LoadSource>,
    observer: Option<Rc<RefCell<dyn WriteObserver>>>,
}

impl<S: StorageProvider> ConfigStore<S> {
    /// Create an empty, unloaded store.
    pub fn new(storage: S, target: PersistenceTarget) -> Self {
        Self {
            storage,
            target,
            map: ConfigMap::new(),
            source: None,
            observer: None,
        }
    }

    pub fn with_path(storage: S, path: impl Into<String>) -> Self {
        Self::new(storage, PersistenceTarget::new(path))
    }

    /// Count each successful save against `observer`.
    ///
    /// Several stores may share one observer.
    pub fn attach_wear_tracker(&mut self, observer: Rc<RefCell<dyn WriteObserver>>) {
        self.observer = Some(observer);
    }

    /// Load the document at `path`, making it this store's target.
    ///
    /// Returns whether the store holds any sections afterwards, which is
    /// always the case unless `path` is empty (refused, nothing changes).
    /// `verbose` raises load diagnostics from debug to info level.
    pub fn load(&mut self, path: &str, verbose: bool) -> bool {
        match self.try_load(path, verbose) {
            Ok(_) => !self.map.is_empty(),
            Err(error) => {
                log::error!("Config not loaded: {}", error);
                false
            }
        }
    }

    /// Like [`load`](Self::load), but reports where the map came from.
    ///
    /// Storage and parse failures are not errors here; they select
    /// [`LoadSource::Defaults`]. Only an empty path is refused.
    pub fn try_load(&mut self, path: &str, verbose: bool) -> Result<LoadSource, Error> {
        if path.is_empty() {
            return Err(Error::EmptyPath);
        }
        let level = if verbose {
            log::Level::Info
        } else {
            log::Level::Debug
        };

        self.target.path = path.to_string();
        self.map.clear();
        self.source = None;

        let parsed = self
            .read_document(path)
            .and_then(|text| json_utils::parse_config(&text));

        let source = match parsed {
            Ok(map) => {
                log::log!(level, "Loaded {} sections from {}", map.len(), path);
                self.map = map;
                LoadSource::File
            }
            Err(error) => {
                log::log!(level, "Using default config for {}: {}", path, error);
                self.map = defaults::default_config();
                LoadSource::Defaults
            }
        };

        if log::log_enabled!(level) {
            log::log!(level, "Config:\n{}", self.render());
        }
        self.source = Some(source);
        Ok(source)
    }

    /// Reload from the current target path.
    pub fn load_config(&mut self) -> bool {
        let path = self.target.path.clone();
        self.load(&path, false)
    }

    /// Write the map to the target path.
    ///
    /// Returns `false` if the filesystem cannot be mounted, the file cannot
    /// be opened, or nothing was written. A successful save is counted by the
    /// attached wear tracker, if any.
    pub fn save(&mut self) -> bool {
        match self.try_save() {
            Ok(_) => true,
            Err(error) => {
                log::error!("Config not saved to {}: {}", self.target.path, error);
                false
            }
        }
    }

    pub fn save_config(&mut self) -> bool {
        self.save()
    }

    /// Like [`save`](Self::save), returning the number of bytes written.
    pub fn try_save(&mut self) -> Result<usize, Error> {
        if self.target.path.is_empty() {
            return Err(Error::EmptyPath);
        }
        let text = json_utils::to_json_string(&self.map)?;
        if text.len() > self.target.max_size {
            log::warn!(
                "Config document is {} bytes, over the {} byte hint for {}",
                text.len(),
                self.target.max_size,
                self.target.path
            );
        }

        let written = {
            let mut session = Session::mount(&mut self.storage)?;
            session.write_file(&self.target.path, text.as_bytes())?
        };
        if written == 0 {
            return Err(Error::NothingWritten {
                path: self.target.path.clone(),
            });
        }
        if written < text.len() {
            log::warn!(
                "Short write to {}: {} of {} bytes",
                self.target.path,
                written,
                text.len()
            );
        }
        log::debug!("Saved {} bytes to {}", written, self.target.path);

        self.notify_write();
        Ok(written)
    }

    pub fn get_value(&self, section: &str, key: &str) -> String {
        map::lookup(&self.map, section, key)
            .unwrap_or(NOT_FOUND)
            .to_string()
    }

    pub fn set_value(&mut self, section: &str, key: &str, value: &str) {
        self.get_section_mut(section)
            .insert(key.to_string(), value.to_string());
    }

    /// Every section name, hidden ones included.
    pub fn get_sections(&self) -> Vec<String> {
        self.map.keys().cloned().collect()
    }

    /// Every section name, with a leading `_` stripped.
    pub fn get_format_sections(&self) -> Vec<String> {
        self.map
            .keys()
            .map(|section| display_name(section).to_string())
            .collect()
    }

    /// Section names without the hidden ones.
    pub fn get_visible_sections(&self) -> Vec<String> {
        self.map
            .keys()
            .filter(|section| !is_hidden(section))
            .cloned()
            .collect()
    }

    pub fn get_keys(&self, section: &str) -> Vec<String> {
        self.get_section(section).keys().cloned().collect()
    }

    /// A section, or the shared empty section if it does not exist.
    pub fn get_section(&self, name: &str) -> &SectionMap {
        self.map.get(name).unwrap_or(&EMPTY_SECTION)
    }

    /// A section, created empty if it does not exist.
    pub fn get_section_mut(&mut self, name: &str) -> &mut SectionMap {
        self.map.entry(name.to_string()).or_default()
    }

    /// Remove the target file and empty the map.
    ///
    /// The map is emptied even if the file could not be removed. Returns
    /// whether the removal succeeded.
    pub fn clear_config(&mut self) -> bool {
        match self.try_clear_config() {
            Ok(()) => true,
            Err(error) => {
                log::warn!("Config file {} not removed: {}", self.target.path, error);
                false
            }
        }
    }

    pub fn try_clear_config(&mut self) -> Result<(), Error> {
        self.map.clear();
        self.source = None;
        let mut session = Session::mount(&mut self.storage)?;
        session.remove(&self.target.path)?;
        log::info!("Removed config file {}", self.target.path);
        Ok(())
    }

    pub fn get_user(&self) -> String {
        self.get_value(AUTH_SECTION, "user")
    }

    pub fn get_password(&self) -> String {
        self.get_value(AUTH_SECTION, "password")
    }

    /// Decode `hex` into `out`; see [`parse_hex_to_bytes`].
    pub fn parse_hex_string_to_bytes(&self, hex: &str, out: &mut [u8]) -> bool {
        parse_hex_to_bytes(hex, out)
    }

    /// Total bytes of every section name, key and value held.
    pub fn get_config_memory_usage(&self) -> usize {
        map::memory_usage(&self.map)
    }

    pub fn render(&self) -> String {
        map::render(&self.map)
    }

    /// Whether the last load produced a non-empty map.
    pub fn is_loaded(&self) -> bool {
        self.source.is_some() && !self.map.is_empty()
    }

    pub fn loaded_from(&self) -> Option<LoadSource> {
        self.source
    }

    pub fn config(&self) -> &ConfigMap {
        &self.map
    }

    pub fn target(&self) -> &PersistenceTarget {
        &self.target
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    fn read_document(&mut self, path: &str) -> Result<String, Error> {
        let bytes = {
            let mut session = Session::mount(&mut self.storage)?;
            session.read_file(path)?
        };
        if bytes.is_empty() {
            return Err(Error::Malformed {
                message: format!("{} is empty", path),
            });
        }
        if bytes.len() > self.target.max_size {
            log::warn!(
                "{} is {} bytes, over the {} byte hint",
                path,
                bytes.len(),
                self.target.max_size
            );
        }
        String::from_utf8(bytes.to_vec()).map_err(|error| Error::Malformed {
            message: format!("{} is not UTF-8: {}", path, error),
        })
    }

    fn notify_write(&self) {
        let Some(observer) = &self.observer else {
            return;
        };
        match observer.try_borrow_mut() {
            Ok(mut observer) => {
                if !observer.on_durable_write() {
                    log::warn!("Save of {} was not counted by the wear tracker", self.target.path);
                }
            }
            Err(_) => log::warn!(
                "Wear tracker busy; save of {} not counted",
                self.target.path
            ),
        }
    }
}

impl<S: StorageProvider> ConfigProvider for ConfigStore<S> {
    fn get_value(&self, section: &str, key: &str) -> String {
        ConfigStore::get_value(self, section, key)
    }

    fn set_value(&mut self, section: &str, key: &str, value: &str) {
        ConfigStore::set_value(self, section, key, value)
    }

    fn get_sections(&self) -> Vec<String> {
        ConfigStore::get_sections(self)
    }

    fn get_format_sections(&self) -> Vec<String> {
        ConfigStore::get_format_sections(self)
    }

    fn get_keys(&self, section: &str) -> Vec<String> {
        ConfigStore::get_keys(self, section)
    }

    fn get_section(&self, name: &str) -> &SectionMap {
        ConfigStore::get_section(self, name)
    }

    fn save(&mut self) -> bool {
        ConfigStore::save(self)
    }

    fn load_config(&mut self) -> bool {
        ConfigStore::load_config(self)
    }
}

impl<S> std::fmt::Debug for ConfigStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("target", &self.target)
            .field("sections", &self.map.len())
            .field("source", &self.source)
            .field("tracked", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}
