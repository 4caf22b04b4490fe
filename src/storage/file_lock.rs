use crate::core::error::{Error, ErrorKind, Result};
use crate::storage::layout::StorageLayout;
use std::fs::{File, OpenOptions};

/// Exclusive writer lock over the index directory. Held for the
/// lifetime of the owning writer; released on drop.
#[derive(Debug)]
pub struct WriterLock {
    file: File,
}

impl WriterLock {
    pub fn acquire(layout: &StorageLayout) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(layout.lock_path())?;

        #[cfg(unix)]
        {
            use libc::{flock, LOCK_EX, LOCK_NB};
            use std::os::unix::io::AsRawFd;

            let fd = file.as_raw_fd();
            // Non-blocking: a second writer fails fast instead of queueing
            let rc = unsafe { flock(fd, LOCK_EX | LOCK_NB) };
            if rc != 0 {
                return Err(Error::new(
                    ErrorKind::InvalidState,
                    format!(
                        "Index at {} is locked by another writer",
                        layout.base_dir.display()
                    ),
                ));
            }
        }

        Ok(WriterLock { file })
    }
}

impl Drop for WriterLock {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            use libc::{flock, LOCK_UN};
            use std::os::unix::io::AsRawFd;

            unsafe {
                flock(self.file.as_raw_fd(), LOCK_UN);
            }
        }
    }
}
