use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use core_error::{PlotError, Result};

/// Exclusive process-external file lock guarding the physical device. The
/// file's contents identify the holder for diagnostics; removing the file
/// releases the lock. Dropping the guard always removes the file, even on
/// an early return or panic unwind.
pub struct DeviceLock {
    path: PathBuf,
    released: bool,
}

impl DeviceLock {
    /// Create the lock file exclusively, writing the current process id.
    /// If another process already holds it, read its contents and report
    /// `DeviceBusy` rather than blocking.
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                write!(file, "{}", std::process::id())
                    .map_err(|e| PlotError::io(format!("writing lock file: {e}")))?;
                Ok(Self {
                    path,
                    released: false,
                })
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let holder = read_holder(&path);
                Err(PlotError::device_busy(format!(
                    "device lock held by {holder} ({})",
                    path.display()
                )))
            }
            Err(e) => Err(PlotError::io(format!("creating lock file: {e}"))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release explicitly, surfacing any I/O error instead of swallowing
    /// it as `Drop` must.
    pub fn release(mut self) -> Result<()> {
        self.remove()
    }

    fn remove(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PlotError::io(format!("removing lock file: {e}"))),
        }
    }
}

impl Drop for DeviceLock {
    fn drop(&mut self) {
        let _ = self.remove();
    }
}

fn read_holder(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_then_drop_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device.lock");
        {
            let lock = DeviceLock::acquire(&path).unwrap();
            assert!(lock.path().exists());
        }
        assert!(!path.exists());
    }

    #[test]
    fn second_acquire_reports_device_busy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device.lock");
        let _held = DeviceLock::acquire(&path).unwrap();
        let err = DeviceLock::acquire(&path).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn release_removes_the_file_without_waiting_for_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device.lock");
        let lock = DeviceLock::acquire(&path).unwrap();
        lock.release().unwrap();
        assert!(!path.exists());
    }
}
