//! Directory-backed file storage
//!
//! Device paths such as `/config.txt` map onto files below a data
//! directory. Writes go through a temporary file and a rename so a crash
//! never leaves a half-written record behind.

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Component, Path, PathBuf};

use log::debug;
use pinlink_hal::{FileStorage, StorageError};

/// File storage rooted at a host directory
#[derive(Debug, Clone)]
pub struct DirStorage {
    root: PathBuf,
}

impl DirStorage {
    /// Create a store rooted at `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Map a device path to a host path
    ///
    /// Only plain components are accepted; `..` and the like never escape
    /// the root.
    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative.as_os_str().is_empty()
            || !relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)))
        {
            return Err(StorageError::NotFound);
        }
        Ok(self.root.join(relative))
    }
}

fn storage_error(error: io::Error) -> StorageError {
    match error.kind() {
        io::ErrorKind::NotFound => StorageError::NotFound,
        _ => StorageError::Io,
    }
}

impl FileStorage for DirStorage {
    fn exists(&mut self, path: &str) -> bool {
        self.resolve(path).map(|path| path.is_file()).unwrap_or(false)
    }

    fn size(&mut self, path: &str) -> Result<usize, StorageError> {
        let metadata = fs::metadata(self.resolve(path)?).map_err(storage_error)?;
        if !metadata.is_file() {
            return Err(StorageError::NotFound);
        }
        usize::try_from(metadata.len()).map_err(|_| StorageError::Io)
    }

    fn read_at(
        &mut self,
        path: &str,
        offset: usize,
        buffer: &mut [u8],
    ) -> Result<usize, StorageError> {
        let mut file = File::open(self.resolve(path)?).map_err(storage_error)?;
        file.seek(SeekFrom::Start(offset as u64)).map_err(storage_error)?;
        file.read(buffer).map_err(storage_error)
    }

    fn write(&mut self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(storage_error)?;
        }
        let staging = target.with_extension("tmp");
        fs::write(&staging, data).map_err(storage_error)?;
        fs::rename(&staging, &target).map_err(storage_error)?;
        debug!("wrote {} bytes to {}", data.len(), target.display());
        Ok(())
    }

    fn remove(&mut self, path: &str) -> Result<(), StorageError> {
        fs::remove_file(self.resolve(path)?).map_err(storage_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = DirStorage::open(dir.path()).unwrap();

        assert!(!storage.exists("/config.txt"));
        storage.write("/config.txt", b"0\n16\n32\n").unwrap();
        assert!(storage.exists("/config.txt"));
        assert_eq!(storage.size("/config.txt"), Ok(8));
        assert!(dir.path().join("config.txt").is_file());

        let mut buffer = [0u8; 16];
        let n = storage.read("/config.txt", &mut buffer).unwrap();
        assert_eq!(&buffer[..n], b"0\n16\n32\n");
    }

    #[test]
    fn test_read_at_offset() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = DirStorage::open(dir.path()).unwrap();
        storage.write("/web/index.html", b"<html>pins</html>").unwrap();

        let mut chunk = [0u8; 4];
        assert_eq!(storage.read_at("/web/index.html", 6, &mut chunk), Ok(4));
        assert_eq!(&chunk, b"pins");
        assert_eq!(storage.read_at("/web/index.html", 100, &mut chunk), Ok(0));
    }

    #[test]
    fn test_overwrite_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = DirStorage::open(dir.path()).unwrap();
        storage.write("/config.txt", b"a much longer first record").unwrap();
        storage.write("/config.txt", b"short").unwrap();
        assert_eq!(storage.size("/config.txt"), Ok(5));
    }

    #[test]
    fn test_missing_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = DirStorage::open(dir.path()).unwrap();
        assert_eq!(storage.size("/nothing"), Err(StorageError::NotFound));
        assert_eq!(storage.remove("/nothing"), Err(StorageError::NotFound));

        storage.write("/gone.txt", b"x").unwrap();
        assert_eq!(storage.remove("/gone.txt"), Ok(()));
        assert!(!storage.exists("/gone.txt"));
    }

    #[test]
    fn test_paths_stay_inside_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = DirStorage::open(dir.path().join("data")).unwrap();
        fs::write(dir.path().join("secret"), b"x").unwrap();

        assert!(!storage.exists("/../secret"));
        assert_eq!(storage.write("/../escape", b"x"), Err(StorageError::NotFound));
        assert_eq!(storage.size("/"), Err(StorageError::NotFound));
    }
}
