use std::{
    fs::{File, OpenOptions},
    io::{ErrorKind, Read, Write},
    path::{Path, PathBuf},
};

use fs2::FileExt;
use tempfile::NamedTempFile;

/// A file replaced wholesale on every write.
///
/// Writes stage the new contents in a sibling temp file and rename it over
/// the target, under an exclusive advisory lock so two processes sharing a
/// config file cannot interleave. Readers take the shared lock.
pub(crate) struct AtomicFile {
    path: PathBuf,
}

impl AtomicFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole file, or `None` if it does not exist yet.
    pub fn read(&self) -> std::io::Result<Option<String>> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        file.lock_shared()?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Ok(Some(contents))
    }

    pub fn write(&self, contents: &str) -> std::io::Result<()> {
        // The lock lives on the pre-rename inode and is released when
        // `target` drops; single-process callers never contend on it.
        let target = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&self.path)?;
        target.lock_exclusive()?;

        let dir = self.path.parent().unwrap_or(Path::new("."));
        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(contents.as_bytes())?;
        staged.as_file().sync_all()?;
        staged.persist(&self.path)?;

        Ok(())
    }
}
