//! Filesystem storage rooted at a host directory.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Read as IoRead, Write as IoWrite};
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;

use flashcfg_ll_store::{FileHandle, LLError, OpenMode, StorageProvider};

/// An open file and the mode it was opened with.
struct OpenFile {
    file: File,
    path: PathBuf,
    mode: OpenMode,
}

/// A [`StorageProvider`] over a directory on the host.
///
/// Device paths such as `/config.json` are resolved relative to the root;
/// the leading `/` is optional. Paths may not climb out of the root.
///
/// Mounting checks that the root is an existing, writable directory, the
/// way a flash filesystem mount checks its partition.
pub struct LocalDiskStorage {
    root: PathBuf,
    handles: HashMap<FileHandle, OpenFile>,
    next_handle: u32,
    mounted: bool,
}

impl LocalDiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            handles: HashMap::new(),
            next_handle: 0,
            mounted: false,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Host path for a device path.
    pub fn host_path(&self, path: &str) -> Result<PathBuf, LLError> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative.as_os_str().is_empty() {
            return Err(invalid_path(path, "path names no file"));
        }
        if !relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
        {
            return Err(invalid_path(path, "path must stay inside the storage root"));
        }
        Ok(self.root.join(relative))
    }

    fn require_mounted(&self) -> Result<(), LLError> {
        if self.mounted {
            Ok(())
        } else {
            Err(LLError::NotMounted)
        }
    }

    fn check_root(&self) -> Result<(), LLError> {
        let attr = fs::metadata(&self.root).map_err(|error| {
            LLError::Transport(
                format!("root {} is not accessible: {}", self.root.display(), error).into(),
            )
        })?;

        if !attr.is_dir() {
            return Err(LLError::Transport(
                format!("root {} must be a directory", self.root.display()).into(),
            ));
        }

        if attr.permissions().readonly() {
            return Err(LLError::Transport(
                format!("root {} must be writable", self.root.display()).into(),
            ));
        }

        Ok(())
    }
}

impl StorageProvider for LocalDiskStorage {
    fn mount(&mut self) -> Result<(), LLError> {
        self.check_root()?;
        self.mounted = true;
        log::debug!("Mounted {}", self.root.display());
        Ok(())
    }

    fn unmount(&mut self) {
        if !self.handles.is_empty() {
            log::debug!("Unmount closing {} open files", self.handles.len());
        }
        self.handles.clear();
        self.mounted = false;
    }

    fn open(&mut self, path: &str, mode: OpenMode) -> Result<FileHandle, LLError> {
        self.require_mounted()?;
        let host_path = self.host_path(path)?;

        let file = match mode {
            OpenMode::Read => File::open(&host_path),
            OpenMode::Write => {
                if let Some(parent) = host_path.parent() {
                    fs::create_dir_all(parent)?;
                }
                File::create(&host_path)
            }
        }
        .map_err(|error| match error.kind() {
            io::ErrorKind::NotFound => LLError::NotFound {
                path: path.to_string(),
            },
            _ => LLError::from(error),
        })?;

        self.next_handle = self.next_handle.wrapping_add(1);
        let handle = FileHandle(self.next_handle);
        self.handles.insert(
            handle,
            OpenFile {
                file,
                path: host_path,
                mode,
            },
        );
        Ok(handle)
    }

    fn read_all(&mut self, handle: FileHandle) -> Result<Bytes, LLError> {
        self.require_mounted()?;
        let open = self
            .handles
            .get_mut(&handle)
            .ok_or(LLError::InvalidHandle(handle))?;
        let mut buffer = Vec::new();
        open.file.read_to_end(&mut buffer)?;
        Ok(Bytes::from(buffer))
    }

    fn write(&mut self, handle: FileHandle, data: &[u8]) -> Result<usize, LLError> {
        self.require_mounted()?;
        let open = self
            .handles
            .get_mut(&handle)
            .ok_or(LLError::InvalidHandle(handle))?;
        if open.mode != OpenMode::Write {
            return Err(LLError::NotSupported);
        }
        open.file.write_all(data)?;
        Ok(data.len())
    }

    fn close(&mut self, handle: FileHandle) {
        let Some(open) = self.handles.remove(&handle) else {
            return;
        };
        if open.mode == OpenMode::Write {
            if let Err(error) = open.file.sync_all() {
                log::warn!("Could not sync {}: {}", open.path.display(), error);
            }
        }
    }

    fn remove(&mut self, path: &str) -> Result<(), LLError> {
        self.require_mounted()?;
        let host_path = self.host_path(path)?;
        fs::remove_file(&host_path).map_err(|error| match error.kind() {
            io::ErrorKind::NotFound => LLError::NotFound {
                path: path.to_string(),
            },
            _ => LLError::from(error),
        })
    }

    fn exists(&mut self, path: &str) -> bool {
        self.host_path(path)
            .map(|host_path| host_path.is_file())
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for LocalDiskStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalDiskStorage")
            .field("root", &self.root)
            .field("mounted", &self.mounted)
            .field("open_handles", &self.handles.len())
            .finish()
    }
}

fn invalid_path(path: &str, reason: &str) -> LLError {
    LLError::Transport(format!("invalid path {:?}: {}", path, reason).into())
}
