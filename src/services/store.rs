//! Disk-backed blob store keyed by opaque identifier.
//!
//! Payloads live beneath `base_path/{shard}/{shard}/{id}`, where the shards
//! are the first two bytes of md5(id) in hex. Writes stream into a temp file
//! and rename atomically into place; the full payload is never buffered.
//! Blobs are immutable once written — there is no delete or overwrite path.

use bytes::Bytes;
use futures::{Stream, StreamExt, pin_mut};
use std::{
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object `{0}` not found")]
    NotFound(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Blob store over a local directory tree.
#[derive(Clone, Debug)]
pub struct ObjectStore {
    /// Base directory on disk where blob payloads are stored.
    pub base_path: PathBuf,
}

impl ObjectStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Reject identifiers that could escape the storage tree.
    ///
    /// Identifiers are generated server-side, but retrieval accepts them
    /// from the URL path, so the same check guards both directions.
    fn ensure_id_safe(&self, id: &str) -> StoreResult<()> {
        if id.is_empty()
            || id.contains('/')
            || id.contains("..")
            || id
                .bytes()
                .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0')
        {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Generate two-level shard identifiers for a blob id.
    ///
    /// Uses md5(id) and returns the first two bytes as lowercase hex
    /// (00–ff). Reduces file count per directory.
    fn shards(id: &str) -> (String, String) {
        let digest = md5::compute(id);
        (format!("{:02x}", digest[0]), format!("{:02x}", digest[1]))
    }

    /// Construct the fully-qualified payload path for an id.
    fn blob_path(&self, id: &str) -> PathBuf {
        let (shard_a, shard_b) = Self::shards(id);
        let mut path = self.base_path.clone();
        path.push(shard_a);
        path.push(shard_b);
        path.push(id);
        path
    }

    /// Stream a payload to disk under `id`.
    ///
    /// - Writes bytes incrementally to a temporary file.
    /// - Counts size while streaming.
    /// - Atomically renames into the final location.
    ///
    /// Ensures durable writes (fsync) and cleans up temp files on errors.
    /// Returns the number of bytes written.
    pub async fn put_stream<S>(&self, id: &str, stream: S) -> StoreResult<u64>
    where
        S: Stream<Item = io::Result<Bytes>> + Send,
    {
        self.ensure_id_safe(id)?;

        let file_path = self.blob_path(id);
        let parent = file_path.parent().map(Path::to_path_buf).ok_or_else(|| {
            StoreError::Io(io::Error::other("blob path missing parent directory"))
        })?;
        fs::create_dir_all(&parent).await?;
        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));
        let mut file = File::create(&tmp_path).await?;

        let mut size_bytes: u64 = 0;
        pin_mut!(stream);
        while let Some(chunk_res) = stream.next().await {
            let chunk = match chunk_res {
                Ok(chunk) => chunk,
                Err(err) => {
                    let _ = fs::remove_file(&tmp_path).await;
                    return Err(StoreError::Io(err));
                }
            };
            size_bytes += chunk.len() as u64;
            if let Err(err) = file.write_all(&chunk).await {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(StoreError::Io(err));
            }
        }
        if let Err(err) = file.flush().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(err));
        }
        if let Err(err) = file.sync_all().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(err));
        }

        if let Err(err) = fs::rename(&tmp_path, &file_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(err));
        }

        Ok(size_bytes)
    }

    /// Store an already-buffered payload under `id`.
    pub async fn put(&self, id: &str, payload: Bytes) -> StoreResult<u64> {
        self.put_stream(id, futures::stream::once(async move { Ok(payload) }))
            .await
    }

    /// Open the blob for reading.
    ///
    /// Returns an opened `File` handle ready for streaming out, or
    /// `NotFound` when no blob exists under `id`.
    pub async fn reader(&self, id: &str) -> StoreResult<File> {
        self.ensure_id_safe(id)?;
        let file_path = self.blob_path(id);
        File::open(&file_path).await.map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound(id.to_string())
            } else {
                StoreError::Io(err)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ids;
    use tokio::io::AsyncReadExt;

    fn test_store() -> (tempfile::TempDir, ObjectStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::new(dir.path());
        (dir, store)
    }

    async fn read_all(mut file: File) -> Vec<u8> {
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).await.unwrap();
        buf
    }

    #[tokio::test]
    async fn put_then_read_round_trips_bytes() {
        let (_dir, store) = test_store();
        let id = ids::generate();

        let written = store.put(&id, Bytes::from_static(b"PNGDATA123")).await.unwrap();
        assert_eq!(written, 10);

        let file = store.reader(&id).await.unwrap();
        assert_eq!(read_all(file).await, b"PNGDATA123");
    }

    #[tokio::test]
    async fn put_stream_writes_chunks_in_order() {
        let (_dir, store) = test_store();
        let id = ids::generate();

        let chunks = futures::stream::iter(vec![
            Ok(Bytes::from_static(b"hello ")),
            Ok(Bytes::from_static(b"world")),
        ]);
        store.put_stream(&id, chunks).await.unwrap();

        let file = store.reader(&id).await.unwrap();
        assert_eq!(read_all(file).await, b"hello world");
    }

    #[tokio::test]
    async fn failed_stream_leaves_no_blob_behind() {
        let (_dir, store) = test_store();
        let id = ids::generate();

        let chunks = futures::stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(io::Error::other("client went away")),
        ]);
        let err = store.put_stream(&id, chunks).await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));

        assert!(matches!(
            store.reader(&id).await.unwrap_err(),
            StoreError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn rename_failure_propagates_and_cleans_up() {
        let (dir, store) = test_store();
        let id = ids::generate();

        // Occupy the final blob path with a directory so the rename fails.
        let digest = md5::compute(id.as_bytes());
        let blob_path = dir
            .path()
            .join(format!("{:02x}", digest[0]))
            .join(format!("{:02x}", digest[1]))
            .join(&id);
        std::fs::create_dir_all(&blob_path).unwrap();

        let err = store
            .put(&id, Bytes::from_static(b"data"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));

        // No temp file left behind next to the blob path.
        let leftovers: Vec<_> = std::fs::read_dir(blob_path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".tmp-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let (_dir, store) = test_store();
        assert!(matches!(
            store.reader("never-issued").await.unwrap_err(),
            StoreError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn traversal_ids_are_rejected() {
        let (_dir, store) = test_store();
        for id in ["", "../escape", "a/b", "a\\b"] {
            assert!(matches!(
                store.reader(id).await.unwrap_err(),
                StoreError::NotFound(_)
            ));
        }
    }
}
