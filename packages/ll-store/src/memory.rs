//! In-memory providers.
//!
//! `MemoryStorage` and `MemoryCounterStore` stand in for a flash filesystem
//! and an EEPROM region on hosts without either. Both can be told to fail
//! specific operations so the recovery paths above them can be exercised.

use std::collections::HashMap;

use bytes::Bytes;

use crate::traits::check_bounds;
use crate::{DurableCounterStore, FileHandle, LLError, OpenMode, StorageProvider};

/// Operations a [`MemoryStorage`] should fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageFaults {
    /// `mount` returns an error.
    pub mount: bool,
    /// `open` returns an error for every path and mode.
    pub open: bool,
    /// `read_all` returns an error.
    pub read: bool,
    /// `write` reports zero bytes written and stores nothing.
    pub short_write: bool,
}

/// Counts of resource acquisitions and releases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageStats {
    pub mounts: usize,
    pub unmounts: usize,
    pub opens: usize,
    pub closes: usize,
}

#[derive(Debug)]
struct OpenFile {
    path: String,
    mode: OpenMode,
}

/// A filesystem held entirely in memory.
///
/// # Example
///
/// ```rust
/// use flashcfg_ll_store::{MemoryStorage, OpenMode, StorageProvider};
///
/// let mut storage = MemoryStorage::new().with_file("/config.json", "{}");
/// storage.mount().unwrap();
/// let handle = storage.open("/config.json", OpenMode::Read).unwrap();
/// assert_eq!(&storage.read_all(handle).unwrap()[..], b"{}");
/// storage.close(handle);
/// storage.unmount();
/// ```
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: HashMap<String, Vec<u8>>,
    handles: HashMap<FileHandle, OpenFile>,
    next_handle: u32,
    mounted: bool,
    faults: StorageFaults,
    stats: StorageStats,
}

impl MemoryStorage {
    /// Create an empty, unmounted filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file.
    pub fn with_file(mut self, path: &str, contents: impl AsRef<[u8]>) -> Self {
        self.files
            .insert(path.to_string(), contents.as_ref().to_vec());
        self
    }

    /// Replace the fault set.
    pub fn with_faults(mut self, faults: StorageFaults) -> Self {
        self.faults = faults;
        self
    }

    pub fn set_faults(&mut self, faults: StorageFaults) {
        self.faults = faults;
    }

    pub fn faults(&self) -> StorageFaults {
        self.faults
    }

    /// Current contents of a file, bypassing mount state.
    pub fn contents(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    /// Overwrite a file, bypassing mount state.
    pub fn put_file(&mut self, path: &str, contents: impl AsRef<[u8]>) {
        self.files
            .insert(path.to_string(), contents.as_ref().to_vec());
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Number of handles not yet closed.
    pub fn open_handles(&self) -> usize {
        self.handles.len()
    }

    pub fn stats(&self) -> StorageStats {
        self.stats
    }

    fn require_mounted(&self) -> Result<(), LLError> {
        if self.mounted {
            Ok(())
        } else {
            Err(LLError::NotMounted)
        }
    }
}

impl StorageProvider for MemoryStorage {
    fn mount(&mut self) -> Result<(), LLError> {
        if self.faults.mount {
            return Err(LLError::Transport("injected mount failure".into()));
        }
        self.mounted = true;
        self.stats.mounts += 1;
        Ok(())
    }

    fn unmount(&mut self) {
        self.handles.clear();
        if self.mounted {
            self.stats.unmounts += 1;
        }
        self.mounted = false;
    }

    fn open(&mut self, path: &str, mode: OpenMode) -> Result<FileHandle, LLError> {
        self.require_mounted()?;
        if self.faults.open {
            return Err(LLError::Transport("injected open failure".into()));
        }
        match mode {
            OpenMode::Read if !self.files.contains_key(path) => {
                return Err(LLError::NotFound {
                    path: path.to_string(),
                });
            }
            OpenMode::Read => {}
            OpenMode::Write => {
                self.files.insert(path.to_string(), Vec::new());
            }
        }

        self.next_handle = self.next_handle.wrapping_add(1);
        let handle = FileHandle(self.next_handle);
        self.handles.insert(
            handle,
            OpenFile {
                path: path.to_string(),
                mode,
            },
        );
        self.stats.opens += 1;
        Ok(handle)
    }

    fn read_all(&mut self, handle: FileHandle) -> Result<Bytes, LLError> {
        self.require_mounted()?;
        let file = self
            .handles
            .get(&handle)
            .ok_or(LLError::InvalidHandle(handle))?;
        if self.faults.read {
            return Err(LLError::Transport("injected read failure".into()));
        }
        Ok(self
            .files
            .get(&file.path)
            .map(|data| Bytes::copy_from_slice(data))
            .unwrap_or_default())
    }

    fn write(&mut self, handle: FileHandle, data: &[u8]) -> Result<usize, LLError> {
        self.require_mounted()?;
        let file = self
            .handles
            .get(&handle)
            .ok_or(LLError::InvalidHandle(handle))?;
        if file.mode != OpenMode::Write {
            return Err(LLError::NotSupported);
        }
        if self.faults.short_write {
            return Ok(0);
        }
        self.files
            .entry(file.path.clone())
            .or_default()
            .extend_from_slice(data);
        Ok(data.len())
    }

    fn close(&mut self, handle: FileHandle) {
        if self.handles.remove(&handle).is_some() {
            self.stats.closes += 1;
        }
    }

    fn remove(&mut self, path: &str) -> Result<(), LLError> {
        self.require_mounted()?;
        self.files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| LLError::NotFound {
                path: path.to_string(),
            })
    }

    fn exists(&mut self, path: &str) -> bool {
        self.files.contains_key(path)
    }
}

/// An EEPROM-like byte region held in memory.
///
/// Fresh regions read as `0xFF`, like erased flash.
#[derive(Debug, Clone)]
pub struct MemoryCounterStore {
    bytes: Vec<u8>,
    fail_writes: bool,
    writes: usize,
}

impl MemoryCounterStore {
    /// A region of `capacity` erased (`0xFF`) bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            bytes: vec![0xFF; capacity],
            fail_writes: false,
            writes: 0,
        }
    }

    /// A region of `capacity` zero bytes.
    pub fn zeroed(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity],
            fail_writes: false,
            writes: 0,
        }
    }

    /// Make every subsequent `write_bytes` fail (or succeed again).
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Number of committed writes.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn raw(&self) -> &[u8] {
        &self.bytes
    }

    /// Overwrite bytes directly, bypassing failure injection and counting.
    pub fn poke(&mut self, offset: usize, data: &[u8]) {
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
    }
}

impl DurableCounterStore for MemoryCounterStore {
    fn capacity(&self) -> usize {
        self.bytes.len()
    }

    fn read_bytes(&mut self, offset: usize, len: usize) -> Result<Bytes, LLError> {
        check_bounds(offset, len, self.bytes.len())?;
        Ok(Bytes::copy_from_slice(&self.bytes[offset..offset + len]))
    }

    fn write_bytes(&mut self, offset: usize, data: &[u8]) -> Result<(), LLError> {
        check_bounds(offset, data.len(), self.bytes.len())?;
        if self.fail_writes {
            return Err(LLError::Transport("injected commit failure".into()));
        }
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_mount() {
        let mut storage = MemoryStorage::new();
        assert!(matches!(
            storage.open("/x", OpenMode::Write),
            Err(LLError::NotMounted)
        ));
    }

    #[test]
    fn write_then_read_back() {
        let mut storage = MemoryStorage::new();
        storage.mount().unwrap();

        let handle = storage.open("/x", OpenMode::Write).unwrap();
        assert_eq!(storage.write(handle, b"hello ").unwrap(), 6);
        assert_eq!(storage.write(handle, b"world").unwrap(), 5);
        storage.close(handle);

        let handle = storage.open("/x", OpenMode::Read).unwrap();
        assert_eq!(&storage.read_all(handle).unwrap()[..], b"hello world");
        assert!(matches!(
            storage.write(handle, b"nope"),
            Err(LLError::NotSupported)
        ));
        storage.close(handle);
        storage.unmount();

        assert_eq!(
            storage.stats(),
            StorageStats {
                mounts: 1,
                unmounts: 1,
                opens: 2,
                closes: 2,
            }
        );
    }

    #[test]
    fn open_for_write_truncates() {
        let mut storage = MemoryStorage::new().with_file("/x", "old contents");
        storage.mount().unwrap();
        let handle = storage.open("/x", OpenMode::Write).unwrap();
        storage.close(handle);
        assert_eq!(storage.contents("/x"), Some(&b""[..]));
    }

    #[test]
    fn unmount_invalidates_handles() {
        let mut storage = MemoryStorage::new().with_file("/x", "data");
        storage.mount().unwrap();
        let handle = storage.open("/x", OpenMode::Read).unwrap();
        storage.unmount();
        assert_eq!(storage.open_handles(), 0);
        storage.mount().unwrap();
        assert!(matches!(
            storage.read_all(handle),
            Err(LLError::InvalidHandle(_))
        ));
    }

    #[test]
    fn injected_faults() {
        let mut storage = MemoryStorage::new().with_faults(StorageFaults {
            mount: true,
            ..Default::default()
        });
        assert!(storage.mount().is_err());
        assert!(!storage.is_mounted());

        storage.set_faults(StorageFaults {
            short_write: true,
            ..Default::default()
        });
        storage.mount().unwrap();
        let handle = storage.open("/x", OpenMode::Write).unwrap();
        assert_eq!(storage.write(handle, b"lost").unwrap(), 0);
        storage.close(handle);
        assert_eq!(storage.contents("/x"), Some(&b""[..]));
    }

    #[test]
    fn counter_store_starts_erased() {
        let mut store = MemoryCounterStore::new(32);
        assert_eq!(&store.read_bytes(0, 4).unwrap()[..], &[0xFF; 4]);

        store.write_bytes(4, &[1, 2]).unwrap();
        assert_eq!(store.writes(), 1);
        assert_eq!(&store.raw()[4..6], &[1, 2]);

        store.set_fail_writes(true);
        assert!(store.write_bytes(4, &[9, 9]).is_err());
        assert_eq!(&store.raw()[4..6], &[1, 2]);
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn counter_store_bounds() {
        let mut store = MemoryCounterStore::zeroed(8);
        assert!(store.read_bytes(4, 8).is_err());
        assert!(store.write_bytes(8, &[0]).is_err());
    }
}
