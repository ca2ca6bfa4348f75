use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Local persistent key/value store with synchronous reads and writes: one
/// file per key under the data directory, holding a raw string value.
/// Callers own the shape of what they put in; the store is a bag of strings.
///
/// There is no cross-process coordination. Two processes pointed at the same
/// directory race on writes and the last `set` wins.
#[derive(Clone)]
pub struct Store {
    dir: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

#[derive(Debug)]
pub enum StoreError {
    BadKey,
    Io(std::io::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::BadKey => f.write_str("invalid store key"),
            StoreError::Io(err) => write!(f, "store i/o error: {err}"),
        }
    }
}

impl Store {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(StoreError::Io)?;
        Ok(Self {
            dir,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Absent keys are `None`, never an error.
    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.key_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::Io(err)),
        }
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.key_path(key)?;
        atomic_write(&path, value).map_err(StoreError::Io)
    }

    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.key_path(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::Io(err)),
        }
    }

    /// Serializes read-modify-write cycles within this process. All clones
    /// of a `Store` share the same lock.
    pub fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().expect("store lock")
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        if !is_valid_key(key) {
            return Err(StoreError::BadKey);
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-')
}

fn atomic_write(path: &Path, contents: &str) -> std::io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| std::io::Error::other("missing parent directory"))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("collection.json");
    let pid = std::process::id();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();

    for attempt in 0..10u32 {
        let temp_name = format!(".{}.tmp-{}-{}-{}", file_name, pid, nanos, attempt);
        let temp_path = parent.join(temp_name);
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
        {
            Ok(mut file) => {
                file.write_all(contents.as_bytes())?;
                file.flush()?;
                std::fs::rename(&temp_path, path)?;
                return Ok(());
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        ErrorKind::AlreadyExists,
        "failed to create temp file",
    ))
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;

    #[test]
    fn get__should_return_none_for_absent_key() {
        // Given
        let root = create_temp_root("get-absent");
        let store = Store::open(&root).expect("open store");

        // When
        let value = store.get("complaints").expect("get");

        // Then
        assert!(value.is_none());

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn get__should_return_last_written_value() {
        // Given
        let root = create_temp_root("last-write");
        let store = Store::open(&root).expect("open store");

        // When
        store.set("users", "[1]").expect("first set");
        store.set("users", "[1,2]").expect("second set");

        // Then
        assert_eq!(store.get("users").expect("get").as_deref(), Some("[1,2]"));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn remove__should_leave_key_absent_and_tolerate_missing() {
        // Given
        let root = create_temp_root("remove");
        let store = Store::open(&root).expect("open store");
        store.set("messages", "[]").expect("set");

        // When
        store.remove("messages").expect("remove");
        store.remove("messages").expect("remove again");

        // Then
        assert!(store.get("messages").expect("get").is_none());

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn set__should_reject_traversal_keys() {
        // Given
        let root = create_temp_root("bad-key");
        let store = Store::open(&root).expect("open store");

        // When
        let err = store.set("../escape", "[]").expect_err("should fail");

        // Then
        assert!(matches!(err, StoreError::BadKey));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn clones__should_share_the_write_lock() {
        // Given
        let root = create_temp_root("shared-lock");
        let store = Store::open(&root).expect("open store");
        let clone = store.clone();

        // When
        let guard = store.lock();
        let contended = clone.write_lock.try_lock();

        // Then
        assert!(contended.is_err());
        drop(guard);

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    fn create_temp_root(test_name: &str) -> PathBuf {
        let mut root = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        root.push(format!("complaintdesk-{}-{}", test_name, nanos));
        std::fs::create_dir_all(&root).expect("create temp dir");
        root
    }
}
