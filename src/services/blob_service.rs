//! BlobStore - append-only binary storage backed by SQLite for metadata and
//! local disk for payloads, sharded beneath
//! `base_path/{namespace}/{shard}/{shard}/{id}`. Callers outside this module
//! treat a `BlobRef` purely as a string token to persist and later hand back
//! to `download`.

use crate::services::{ServiceError, ServiceResult};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use std::{
    fmt,
    io::{self, ErrorKind},
    path::PathBuf,
    sync::Arc,
};
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::debug;
use uuid::Uuid;

/// Blob namespace for user profile images.
pub const USER_IMAGE_NAMESPACE: &str = "photos";
/// Blob namespace for product images.
pub const PRODUCT_IMAGE_NAMESPACE: &str = "products-images";

/// Opaque reference to one stored blob, encoded as 32 lowercase hex chars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobRef(Uuid);

impl BlobRef {
    /// Parse an encoded reference. Rejects anything that is not exactly the
    /// 32-char hex form produced by `encode`.
    pub fn parse(raw: &str) -> ServiceResult<Self> {
        if raw.len() != 32 || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ServiceError::InvalidId("image"));
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| ServiceError::InvalidId("image"))
    }

    pub fn encode(&self) -> String {
        self.0.simple().to_string()
    }
}

impl fmt::Display for BlobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Metadata recorded for each stored blob.
#[derive(Serialize, Clone, FromRow, Debug)]
pub struct BlobMeta {
    pub id: Uuid,
    pub namespace: String,
    /// Upload-timestamp-prefixed original filename.
    pub filename: String,
    pub size_bytes: i64,
    /// MD5 checksum of the payload, lowercase hex.
    pub etag: String,
    pub uploaded_at: chrono::DateTime<Utc>,
}

/// A file upload extracted from a multipart request.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: bytes::Bytes,
}

/// Disk-backed blob store bound to one namespace.
///
/// Payload bytes live on disk, metadata in SQLite. Writes go through a temp
/// file, fsync, and rename; a metadata insert failure removes the payload so
/// no reference is ever handed out for a blob that did not fully land.
#[derive(Clone)]
pub struct BlobStore {
    db: Arc<SqlitePool>,
    base_path: PathBuf,
    namespace: &'static str,
}

impl BlobStore {
    pub fn new(db: Arc<SqlitePool>, base_path: impl Into<PathBuf>, namespace: &'static str) -> Self {
        Self {
            db,
            base_path: base_path.into(),
            namespace,
        }
    }

    /// Generate two-level shard identifiers for a blob id.
    ///
    /// Uses MD5(namespace/id) and returns the first two bytes as lowercase
    /// hexadecimal strings (00–ff). Reduces file count per directory.
    fn shards(&self, id: &Uuid) -> (String, String) {
        let digest = md5::compute(format!("{}/{}", self.namespace, id.simple()));
        (format!("{:02x}", digest[0]), format!("{:02x}", digest[1]))
    }

    /// Construct the fully-qualified payload path for a blob id.
    fn blob_path(&self, id: &Uuid) -> PathBuf {
        let (shard_a, shard_b) = self.shards(id);
        let mut path = self.base_path.clone();
        path.push(self.namespace);
        path.push(shard_a);
        path.push(shard_b);
        path.push(id.simple().to_string());
        path
    }

    /// Store `bytes` under a fresh reference and record its metadata.
    ///
    /// The stored name embeds the upload instant plus the original filename.
    /// Writes the payload durably before the metadata row; if the row insert
    /// fails the payload is removed again and the error propagated.
    pub async fn upload(&self, filename: &str, bytes: &[u8]) -> ServiceResult<BlobRef> {
        let id = Uuid::new_v4();
        let stored_name = format!(
            "{}_{}",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            filename
        );

        let file_path = self.blob_path(&id);
        let parent = file_path
            .parent()
            .map(PathBuf::from)
            .ok_or_else(|| io::Error::new(ErrorKind::Other, "blob path missing parent directory"))
            .map_err(ServiceError::Storage)?;
        fs::create_dir_all(&parent).await?;

        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));
        let mut file = File::create(&tmp_path).await?;
        if let Err(err) = file.write_all(bytes).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(ServiceError::Storage(err));
        }
        if let Err(err) = file.flush().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(ServiceError::Storage(err));
        }
        if let Err(err) = file.sync_all().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(ServiceError::Storage(err));
        }
        if let Err(err) = fs::rename(&tmp_path, &file_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(ServiceError::Storage(err));
        }

        let etag = format!("{:x}", md5::compute(bytes));
        let insert_result = sqlx::query(
            "INSERT INTO blobs (id, namespace, filename, size_bytes, etag, uploaded_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(self.namespace)
        .bind(&stored_name)
        .bind(bytes.len() as i64)
        .bind(&etag)
        .bind(Utc::now())
        .execute(&*self.db)
        .await;

        match insert_result {
            Ok(_) => Ok(BlobRef(id)),
            Err(err) => {
                let _ = fs::remove_file(&file_path).await;
                Err(ServiceError::Persistence(err))
            }
        }
    }

    /// Fetch a blob's metadata and payload bytes.
    ///
    /// Fails with `NotFound` if the reference does not resolve in this
    /// store's namespace, or if the metadata row exists but the payload file
    /// is missing.
    pub async fn download(&self, blob_ref: &BlobRef) -> ServiceResult<(BlobMeta, Vec<u8>)> {
        let meta = sqlx::query_as::<_, BlobMeta>(
            "SELECT id, namespace, filename, size_bytes, etag, uploaded_at
             FROM blobs WHERE id = ? AND namespace = ?",
        )
        .bind(blob_ref.0)
        .bind(self.namespace)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => ServiceError::NotFound("image"),
            other => ServiceError::Persistence(other),
        })?;

        let bytes = fs::read(self.blob_path(&blob_ref.0)).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                ServiceError::NotFound("image")
            } else {
                ServiceError::Storage(err)
            }
        })?;

        Ok((meta, bytes))
    }

    /// Remove a blob's metadata row and payload.
    ///
    /// Used only to compensate an upload whose record write failed; resource
    /// deletes and image replacements intentionally leave old blobs behind.
    pub async fn remove(&self, blob_ref: &BlobRef) -> ServiceResult<()> {
        sqlx::query("DELETE FROM blobs WHERE id = ? AND namespace = ?")
            .bind(blob_ref.0)
            .bind(self.namespace)
            .execute(&*self.db)
            .await?;

        let file_path = self.blob_path(&blob_ref.0);
        match fs::remove_file(&file_path).await {
            Ok(_) => debug!("removed blob payload {}", file_path.display()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("blob payload {} already missing", file_path.display());
            }
            Err(err) => return Err(ServiceError::Storage(err)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testutil::memory_pool;

    async fn store() -> (BlobStore, tempfile::TempDir) {
        let pool = memory_pool().await;
        let dir = tempfile::tempdir().expect("tempdir");
        (BlobStore::new(pool, dir.path(), USER_IMAGE_NAMESPACE), dir)
    }

    #[tokio::test]
    async fn upload_then_download_returns_same_bytes() {
        let (store, _dir) = store().await;
        let payload = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];

        let blob_ref = store.upload("photo.jpg", &payload).await.unwrap();
        let (meta, bytes) = store.download(&blob_ref).await.unwrap();

        assert_eq!(bytes, payload);
        assert_eq!(meta.size_bytes, payload.len() as i64);
        assert_eq!(meta.etag, format!("{:x}", md5::compute(payload)));
        assert!(meta.filename.ends_with("_photo.jpg"));
    }

    #[tokio::test]
    async fn download_unknown_ref_is_not_found() {
        let (store, _dir) = store().await;
        let blob_ref = BlobRef::parse(&Uuid::new_v4().simple().to_string()).unwrap();

        let err = store.download(&blob_ref).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("image")));
    }

    #[tokio::test]
    async fn references_are_scoped_to_their_namespace() {
        let pool = memory_pool().await;
        let dir = tempfile::tempdir().expect("tempdir");
        let photos = BlobStore::new(pool.clone(), dir.path(), USER_IMAGE_NAMESPACE);
        let products = BlobStore::new(pool, dir.path(), PRODUCT_IMAGE_NAMESPACE);

        let blob_ref = photos.upload("a.png", b"payload").await.unwrap();
        let err = products.download(&blob_ref).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("image")));
    }

    #[tokio::test]
    async fn parse_rejects_malformed_references() {
        for raw in ["", "abc", "not-a-valid-reference-string!!!!", "zz0e8400e29b41d4a716446655440000"] {
            assert!(matches!(
                BlobRef::parse(raw),
                Err(ServiceError::InvalidId("image"))
            ));
        }
    }

    #[tokio::test]
    async fn parse_round_trips_encoded_refs() {
        let encoded = Uuid::new_v4().simple().to_string();
        let blob_ref = BlobRef::parse(&encoded).unwrap();
        assert_eq!(blob_ref.encode(), encoded);
    }

    #[tokio::test]
    async fn remove_makes_download_fail() {
        let (store, _dir) = store().await;
        let blob_ref = store.upload("gone.png", b"bytes").await.unwrap();

        store.remove(&blob_ref).await.unwrap();
        let err = store.download(&blob_ref).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("image")));
    }
}
