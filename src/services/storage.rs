use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use crate::error::CoreResult;

/// Named-document persistence. Writes replace a document as a whole.
pub trait Storage: Send + Sync {
    /// `None` when the document does not exist.
    fn read(&self, name: &str) -> CoreResult<Option<String>>;

    /// Either the whole document is replaced or nothing changes.
    fn write(&self, name: &str, contents: &str) -> CoreResult<()>;

    /// Deleting a missing document is not an error.
    fn delete(&self, name: &str) -> CoreResult<()>;

    fn list(&self) -> CoreResult<Vec<String>>;
}

const TMP_SUFFIX: &str = ".tmp";

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Documents stored as files under one directory.
#[derive(Debug)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    pub fn new(root: impl Into<PathBuf>) -> CoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(FsStorage { root })
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl Storage for FsStorage {
    fn read(&self, name: &str) -> CoreResult<Option<String>> {
        match fs::read_to_string(self.path(name)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, name: &str, contents: &str) -> CoreResult<()> {
        write_atomic(&self.path(name), contents.as_bytes())
    }

    fn delete(&self, name: &str) -> CoreResult<()> {
        match fs::remove_file(self.path(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> CoreResult<Vec<String>> {
        let mut names = Vec::new();

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.ends_with(TMP_SUFFIX) {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> CoreResult<()> {
    let tmp = tmp_path(path);

    if let Some(parent) = tmp.parent() {
        fs::create_dir_all(parent)?;
    }

    if let Err(e) = fs::write(&tmp, bytes) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    Ok(())
}

/// Unique per write so concurrent writers never share a temp file.
fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "document".to_string(),
    };
    let n = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    p.set_file_name(format!("{file_name}.{}.{n}{TMP_SUFFIX}", std::process::id()));
    p
}

#[cfg(test)]
pub use memory::MemoryStorage;


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn fs_round_trip() {
        let tmp = TempDir::new().unwrap();
        let storage = FsStorage::new(tmp.path().join("data")).unwrap();

        assert_eq!(storage.read("a.po").unwrap(), None);
        storage.write("a.po", "one").unwrap();
        storage.write("a.po", "two").unwrap();
        assert_eq!(storage.read("a.po").unwrap().as_deref(), Some("two"));
        assert_eq!(storage.list().unwrap(), vec!["a.po".to_string()]);

        storage.delete("a.po").unwrap();
        storage.delete("a.po").unwrap();
        assert_eq!(storage.read("a.po").unwrap(), None);
    }

    #[test]
    fn fs_write_leaves_no_temp_files() {
        let tmp = TempDir::new().unwrap();
        let storage = FsStorage::new(tmp.path()).unwrap();
        storage.write("doc.json", "[]").unwrap();

        let leftovers: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(TMP_SUFFIX))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn memory_read_only_rejects_writes() {
        let storage = MemoryStorage::new();
        storage.write("a", "1").unwrap();
        storage.set_read_only(true);
        assert!(storage.write("a", "2").is_err());
        assert!(storage.delete("a").is_err());
        assert_eq!(storage.read("a").unwrap().as_deref(), Some("1"));
    }
}
