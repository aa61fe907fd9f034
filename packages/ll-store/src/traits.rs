//! Core traits for the LL layer.

use bytes::Bytes;

use crate::LLError;

/// An opaque handle to a file opened through a [`StorageProvider`].
///
/// Handles are only meaningful to the provider that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileHandle(pub u32);

impl std::fmt::Display for FileHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Open an existing file for reading.
    Read,
    /// Create or truncate a file for writing.
    Write,
}

/// Byte-granular file access on a mountable filesystem.
///
/// This is the lowest-level file interface. Paths are plain strings and the
/// returned data is just bytes. No parsing, no validation.
///
/// Callers bracket every access with `mount`/`unmount` so the filesystem is
/// only held while it is in use. Providers must tolerate `unmount` and
/// `close` being called on the failure path.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn StorageProvider>`.
pub trait StorageProvider {
    /// Mount the filesystem.
    fn mount(&mut self) -> Result<(), LLError>;

    /// Release the filesystem. Open handles are invalidated.
    fn unmount(&mut self);

    /// Open a file at `path`.
    ///
    /// # Returns
    ///
    /// * `Ok(handle)` - The file is open.
    /// * `Err(LLError::NotFound)` - Reading a file that does not exist.
    /// * `Err(LLError)` - Any other failure.
    fn open(&mut self, path: &str, mode: OpenMode) -> Result<FileHandle, LLError>;

    /// Read the full contents of an open file.
    fn read_all(&mut self, handle: FileHandle) -> Result<Bytes, LLError>;

    /// Write `data` to an open file, returning the number of bytes written.
    fn write(&mut self, handle: FileHandle, data: &[u8]) -> Result<usize, LLError>;

    /// Close an open file. Closing an unknown handle is a no-op.
    fn close(&mut self, handle: FileHandle);

    /// Remove the file at `path`.
    fn remove(&mut self, path: &str) -> Result<(), LLError>;

    /// Whether a file exists at `path`.
    fn exists(&mut self, path: &str) -> bool;
}

/// Fixed-offset access to small durable records outside the filesystem.
///
/// Models an EEPROM-style region: reads and writes address raw byte
/// offsets, and a successful `write_bytes` is committed immediately.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn DurableCounterStore>`.
pub trait DurableCounterStore {
    /// Addressable length of the durable region in bytes.
    fn capacity(&self) -> usize;

    /// Read `len` bytes starting at `offset`.
    fn read_bytes(&mut self, offset: usize, len: usize) -> Result<Bytes, LLError>;

    /// Write `data` at `offset` and commit it.
    fn write_bytes(&mut self, offset: usize, data: &[u8]) -> Result<(), LLError>;
}

/// Bounds check shared by durable-store implementations.
pub fn check_bounds(offset: usize, len: usize, capacity: usize) -> Result<(), LLError> {
    match offset.checked_add(len) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(LLError::OutOfBounds {
            offset,
            len,
            capacity,
        }),
    }
}

// Blanket implementations for references and boxes

impl<T: StorageProvider + ?Sized> StorageProvider for &mut T {
    fn mount(&mut self) -> Result<(), LLError> {
        (**self).mount()
    }

    fn unmount(&mut self) {
        (**self).unmount()
    }

    fn open(&mut self, path: &str, mode: OpenMode) -> Result<FileHandle, LLError> {
        (**self).open(path, mode)
    }

    fn read_all(&mut self, handle: FileHandle) -> Result<Bytes, LLError> {
        (**self).read_all(handle)
    }

    fn write(&mut self, handle: FileHandle, data: &[u8]) -> Result<usize, LLError> {
        (**self).write(handle, data)
    }

    fn close(&mut self, handle: FileHandle) {
        (**self).close(handle)
    }

    fn remove(&mut self, path: &str) -> Result<(), LLError> {
        (**self).remove(path)
    }

    fn exists(&mut self, path: &str) -> bool {
        (**self).exists(path)
    }
}

impl<T: StorageProvider + ?Sized> StorageProvider for Box<T> {
    fn mount(&mut self) -> Result<(), LLError> {
        self.as_mut().mount()
    }

    fn unmount(&mut self) {
        self.as_mut().unmount()
    }

    fn open(&mut self, path: &str, mode: OpenMode) -> Result<FileHandle, LLError> {
        self.as_mut().open(path, mode)
    }

    fn read_all(&mut self, handle: FileHandle) -> Result<Bytes, LLError> {
        self.as_mut().read_all(handle)
    }

    fn write(&mut self, handle: FileHandle, data: &[u8]) -> Result<usize, LLError> {
        self.as_mut().write(handle, data)
    }

    fn close(&mut self, handle: FileHandle) {
        self.as_mut().close(handle)
    }

    fn remove(&mut self, path: &str) -> Result<(), LLError> {
        self.as_mut().remove(path)
    }

    fn exists(&mut self, path: &str) -> bool {
        self.as_mut().exists(path)
    }
}

impl<T: DurableCounterStore + ?Sized> DurableCounterStore for &mut T {
    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn read_bytes(&mut self, offset: usize, len: usize) -> Result<Bytes, LLError> {
        (**self).read_bytes(offset, len)
    }

    fn write_bytes(&mut self, offset: usize, data: &[u8]) -> Result<(), LLError> {
        (**self).write_bytes(offset, data)
    }
}

impl<T: DurableCounterStore + ?Sized> DurableCounterStore for Box<T> {
    fn capacity(&self) -> usize {
        self.as_ref().capacity()
    }

    fn read_bytes(&mut self, offset: usize, len: usize) -> Result<Bytes, LLError> {
        self.as_mut().read_bytes(offset, len)
    }

    fn write_bytes(&mut self, offset: usize, data: &[u8]) -> Result<(), LLError> {
        self.as_mut().write_bytes(offset, data)
    }
}
