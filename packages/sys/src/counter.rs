//! Durable counter region backed by an image file.

use std::fs::{File, OpenOptions};
use std::io::{Read as IoRead, Seek, SeekFrom, Write as IoWrite};
use std::path::{Path, PathBuf};

use bytes::Bytes;

use flashcfg_ll_store::{check_bounds, DurableCounterStore, LLError};

/// Byte value of erased flash.
const ERASED: u8 = 0xFF;

/// A [`DurableCounterStore`] over a fixed-size file, like an EEPROM image.
///
/// A new image is filled with `0xFF`. Every write is synced to disk before
/// it returns.
pub struct FileCounterStore {
    file: File,
    path: PathBuf,
    capacity: usize,
}

impl FileCounterStore {
    /// Open the image at `path`, creating or growing it to `capacity` bytes.
    ///
    /// An image larger than `capacity` is left as is; only the first
    /// `capacity` bytes are addressable.
    pub fn open(path: impl AsRef<Path>, capacity: usize) -> Result<Self, LLError> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let existing = file.metadata()?.len() as usize;
        if existing < capacity {
            file.seek(SeekFrom::Start(existing as u64))?;
            file.write_all(&vec![ERASED; capacity - existing])?;
            file.sync_all()?;
            log::debug!(
                "Erased {} bytes of counter image {} ({} bytes total)",
                capacity - existing,
                path.display(),
                capacity
            );
        } else if existing > capacity {
            log::warn!(
                "Counter image {} is {} bytes; using the first {}",
                path.display(),
                existing,
                capacity
            );
        }

        Ok(Self {
            file,
            path,
            capacity,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DurableCounterStore for FileCounterStore {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn read_bytes(&mut self, offset: usize, len: usize) -> Result<Bytes, LLError> {
        check_bounds(offset, len, self.capacity)?;
        let mut buffer = vec![0u8; len];
        self.file.seek(SeekFrom::Start(offset as u64))?;
        self.file.read_exact(&mut buffer)?;
        Ok(Bytes::from(buffer))
    }

    fn write_bytes(&mut self, offset: usize, data: &[u8]) -> Result<(), LLError> {
        check_bounds(offset, data.len(), self.capacity)?;
        self.file.seek(SeekFrom::Start(offset as u64))?;
        self.file.write_all(data)?;
        self.file.sync_all()?;
        Ok(())
    }
}

impl std::fmt::Debug for FileCounterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileCounterStore")
            .field("path", &self.path)
            .field("capacity", &self.capacity)
            .finish()
    }
}
