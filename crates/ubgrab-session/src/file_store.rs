//! A [`SessionStore`] that keeps the token in a file under the app data dir.
//!
//! The token is written as a small JSON record next to a timestamp:
//!
//! ```json
//! { "token": "eyJhbGciOi...", "saved_at": "2025-03-14T09:26:53Z" }
//! ```
//!
//! Writes go to a uniquely named temp file in the same directory and are
//! then renamed over the real one. A crash mid-write leaves either the old
//! token or the new one, and two processes saving at once never share a
//! temp file. On unix the file is only readable by the owner.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ubgrab_protocol::{Codec, JsonCodec};

use crate::{SessionStore, StorageError, TOKEN_KEY};

/// Name of the data directory created under the platform's local data dir.
const APP_DIR: &str = "ubgrab";

/// On-disk shape of the stored session.
#[derive(Serialize, Deserialize)]
struct StoredToken {
    token: String,
    saved_at: DateTime<Utc>,
}

/// File-backed session store.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    codec: JsonCodec,
}

impl FileStore {
    /// Creates a store that keeps its file in `dir`. The directory is
    /// created lazily on the first `set`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            codec: JsonCodec,
        }
    }

    /// Creates a store in the platform's local data directory
    /// (e.g. `~/.local/share/ubgrab` on Linux).
    ///
    /// # Errors
    /// [`StorageError::Unavailable`] if the platform has no such directory.
    pub fn default_location() -> Result<Self, StorageError> {
        let base = dirs::data_local_dir().ok_or_else(|| {
            StorageError::Unavailable(
                "no local data directory on this platform".into(),
            )
        })?;
        Ok(Self::new(base.join(APP_DIR)))
    }

    /// The directory the token file lives in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of the token file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{TOKEN_KEY}.json"))
    }

    /// Blocking: writes `data` to a fresh temp file in `dir` and renames
    /// it onto `path`. `tempfile` creates the file with mode `0o600`.
    fn write_atomic(dir: &Path, path: &Path, data: &[u8]) -> io::Result<()> {
        let mut tmp = tempfile::Builder::new()
            .prefix(&format!(".{TOKEN_KEY}."))
            .suffix(".tmp")
            .tempfile_in(dir)?;
        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl SessionStore for FileStore {
    async fn get(&self) -> Result<Option<String>, StorageError> {
        let path = self.path();
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let record: StoredToken = self.codec.decode(&bytes)?;
                tracing::debug!(path = %path.display(), saved_at = %record.saved_at, "loaded stored session");
                Ok(Some(record.token))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, token: &str) -> Result<(), StorageError> {
        let record = StoredToken {
            token: token.to_string(),
            saved_at: Utc::now(),
        };
        let bytes = self.codec.encode(&record)?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let (dir, path) = (self.dir.clone(), self.path());
        tokio::task::spawn_blocking(move || {
            Self::write_atomic(&dir, &path, &bytes)
        })
        .await
        .map_err(io::Error::other)??;

        tracing::debug!(path = %self.path().display(), "stored session");
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.path()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> FileStore {
        FileStore::new(dir.path().join("data"))
    }

    #[tokio::test]
    async fn test_get_missing_file_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert_eq!(store.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_creates_dir_and_get_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.set("abc").await.unwrap();

        assert!(store.path().exists());
        let leftovers: Vec<_> = std::fs::read_dir(store.dir())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("auth_token.json")]);
        assert_eq!(store.get().await.unwrap().as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_new_instance_sees_previous_token() {
        // A second store over the same directory is a process restart.
        let dir = tempfile::tempdir().unwrap();
        store_in(&dir).set("abc").await.unwrap();

        let reopened = store_in(&dir);
        assert_eq!(reopened.get().await.unwrap().as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_clear_removes_file_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.set("abc").await.unwrap();

        store.clear().await.unwrap();
        store.clear().await.unwrap();

        assert!(!store.path().exists());
        assert_eq!(store.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_garbage_file_returns_codec_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        tokio::fs::create_dir_all(store.dir()).await.unwrap();
        tokio::fs::write(store.path(), b"not json").await.unwrap();

        let result = store.get().await;

        assert!(matches!(result, Err(StorageError::Codec(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_never_corrupt_the_file() {
        // Two stores over one directory stand in for two processes.
        let dir = tempfile::tempdir().unwrap();
        let long = "A".repeat(4000);

        for _ in 0..50 {
            let (a, b) = (store_in(&dir), store_in(&dir));
            let long_token = long.clone();
            let first = tokio::spawn(async move { a.set(&long_token).await });
            let second = tokio::spawn(async move { b.set("B").await });

            first.await.unwrap().unwrap();
            second.await.unwrap().unwrap();

            let stored = store_in(&dir).get().await.unwrap();
            assert!(
                stored.as_deref() == Some(long.as_str())
                    || stored.as_deref() == Some("B"),
                "file holds neither write"
            );
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_token_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.set("abc").await.unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
