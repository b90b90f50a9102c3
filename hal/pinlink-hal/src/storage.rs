//! File storage abstractions
//!
//! Provides a path-addressed file store, as offered by LittleFS on the
//! module. The configuration record and the static web files both live
//! here.

/// Errors from storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Underlying filesystem operation failed
    Io,
    /// File not found
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
    /// Data corrupted or invalid
    Corrupted,
    /// Storage is full
    Full,
}

/// Persistent file storage
///
/// Writes replace the whole file. Implementations should make the
/// replacement atomic where the filesystem allows it.
pub trait FileStorage {
    /// Check if a file exists
    fn exists(&mut self, path: &str) -> bool;

    /// Size of a file in bytes
    fn size(&mut self, path: &str) -> Result<usize, StorageError>;

    /// Read part of a file
    ///
    /// # Arguments
    /// * `path` - Absolute path, e.g. `/config.txt`
    /// * `offset` - Byte offset to start reading from
    /// * `buffer` - Buffer to read data into
    ///
    /// # Returns
    /// The number of bytes read; `0` once `offset` reaches the end.
    fn read_at(&mut self, path: &str, offset: usize, buffer: &mut [u8])
        -> Result<usize, StorageError>;

    /// Replace the contents of a file, creating it if needed
    fn write(&mut self, path: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a file
    fn remove(&mut self, path: &str) -> Result<(), StorageError>;

    /// Read a whole file into `buffer`
    ///
    /// Fails with [`StorageError::BufferTooSmall`] instead of truncating.
    fn read(&mut self, path: &str, buffer: &mut [u8]) -> Result<usize, StorageError> {
        let size = self.size(path)?;
        if size > buffer.len() {
            return Err(StorageError::BufferTooSmall);
        }
        let mut filled = 0;
        while filled < size {
            let n = self.read_at(path, filled, &mut buffer[filled..size])?;
            if n == 0 {
                return Err(StorageError::Corrupted);
            }
            filled += n;
        }
        Ok(filled)
    }
}
