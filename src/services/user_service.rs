//! UserService - orchestrates blob upload + user record persistence.
//!
//! The one rule enforced here: a user's image reference is replaced if and
//! only if new image bytes were supplied; absent new bytes, the stored
//! reference is preserved untouched.

use crate::{
    models::user::{User, UserSummary},
    repo::user_repo::UserRepo,
    services::{
        ServiceError, ServiceResult,
        blob_service::{BlobMeta, BlobRef, BlobStore, ImageUpload},
        present, required,
    },
};
use tracing::warn;
use uuid::Uuid;

/// bcrypt work factor for stored password hashes.
const BCRYPT_COST: u32 = 10;

/// Parsed form fields for user create/update. Empty strings count as absent.
#[derive(Debug, Default)]
pub struct UserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub image: Option<ImageUpload>,
}

#[derive(Clone)]
pub struct UserService {
    repo: UserRepo,
    images: BlobStore,
    require_image_on_update: bool,
}

impl UserService {
    pub fn new(repo: UserRepo, images: BlobStore, require_image_on_update: bool) -> Self {
        Self {
            repo,
            images,
            require_image_on_update,
        }
    }

    /// Create a user from form input plus a mandatory image payload.
    ///
    /// Validation happens before any storage I/O. The image is uploaded
    /// first; if the record insert then fails, the fresh blob is removed
    /// again so no orphan reference survives the failed create.
    pub async fn create(&self, input: UserInput) -> ServiceResult<User> {
        let name = required(input.name, "name")?;
        let email = required(input.email, "email")?;
        let password = required(input.password, "password")?;
        let image = input
            .image
            .ok_or(ServiceError::Validation { field: "image" })?;

        let hashed = bcrypt::hash(&password, BCRYPT_COST)?;
        let image_ref = self.images.upload(&image.filename, &image.bytes).await?;

        let user = User {
            id: Uuid::new_v4(),
            name,
            email,
            password: hashed,
            image_id: image_ref.encode(),
        };

        if let Err(err) = self.repo.insert(&user).await {
            self.discard(&image_ref).await;
            return Err(err);
        }
        Ok(user)
    }

    /// Sparse update: only supplied, non-empty fields change. A new image
    /// replaces the stored reference; no image leaves it untouched (unless
    /// the legacy mandatory-image policy is enabled).
    pub async fn update(&self, id: &str, input: UserInput) -> ServiceResult<User> {
        let id = parse_user_id(id)?;
        let mut user = self.repo.find_by_id(id).await?;

        if let Some(name) = present(input.name) {
            user.name = name;
        }
        if let Some(email) = present(input.email) {
            user.email = email;
        }
        if let Some(password) = present(input.password) {
            user.password = bcrypt::hash(&password, BCRYPT_COST)?;
        }

        let fresh_image = match input.image {
            Some(image) => {
                let image_ref = self.images.upload(&image.filename, &image.bytes).await?;
                user.image_id = image_ref.encode();
                Some(image_ref)
            }
            None if self.require_image_on_update => {
                return Err(ServiceError::Validation { field: "image" });
            }
            None => None,
        };

        if let Err(err) = self.repo.update(&user).await {
            if let Some(image_ref) = fresh_image {
                self.discard(&image_ref).await;
            }
            return Err(err);
        }
        Ok(user)
    }

    /// Delete the record. The associated blob is intentionally left behind.
    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        let id = parse_user_id(id)?;
        self.repo.delete(id).await
    }

    pub async fn find(&self, id: &str) -> ServiceResult<User> {
        let id = parse_user_id(id)?;
        self.repo.find_by_id(id).await
    }

    pub async fn list(&self) -> ServiceResult<Vec<UserSummary>> {
        let users = self.repo.list().await?;
        Ok(users.into_iter().map(UserSummary::from).collect())
    }

    /// Resolve a stored image reference to its metadata and bytes.
    pub async fn image(&self, id: &str) -> ServiceResult<(BlobMeta, Vec<u8>)> {
        let image_ref = BlobRef::parse(id)?;
        self.images.download(&image_ref).await
    }

    /// Check login credentials. An unknown email and a wrong password are
    /// indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> ServiceResult<User> {
        let user = self.repo.find_by_email(email).await.map_err(|err| match err {
            ServiceError::NotFound(_) => ServiceError::InvalidCredentials,
            other => other,
        })?;

        if bcrypt::verify(password, &user.password).unwrap_or(false) {
            Ok(user)
        } else {
            Err(ServiceError::InvalidCredentials)
        }
    }

    async fn discard(&self, image_ref: &BlobRef) {
        if let Err(err) = self.images.remove(image_ref).await {
            warn!("failed to remove orphaned blob {image_ref}: {err}");
        }
    }
}

fn parse_user_id(raw: &str) -> ServiceResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ServiceError::InvalidId("user"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{blob_service::USER_IMAGE_NAMESPACE, testutil::memory_pool};
    use bytes::Bytes;

    async fn service_with_policy(require_image_on_update: bool) -> (UserService, tempfile::TempDir) {
        let pool = memory_pool().await;
        let dir = tempfile::tempdir().expect("tempdir");
        let images = BlobStore::new(pool.clone(), dir.path(), USER_IMAGE_NAMESPACE);
        let service = UserService::new(UserRepo::new(pool), images, require_image_on_update);
        (service, dir)
    }

    async fn service() -> (UserService, tempfile::TempDir) {
        service_with_policy(false).await
    }

    fn upload(bytes: &'static [u8]) -> ImageUpload {
        ImageUpload {
            filename: "avatar.jpg".into(),
            bytes: Bytes::from_static(bytes),
        }
    }

    fn alice(image: Option<ImageUpload>) -> UserInput {
        UserInput {
            name: Some("Alice".into()),
            email: Some("alice@example.com".into()),
            password: Some("hunter2".into()),
            image,
        }
    }

    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[tokio::test]
    async fn create_links_image_and_hashes_password() {
        let (service, _dir) = service().await;

        let user = service.create(alice(Some(upload(JPEG)))).await.unwrap();

        let (_, bytes) = service.image(&user.image_id).await.unwrap();
        assert_eq!(bytes, JPEG);
        assert_ne!(user.password, "hunter2");
        assert!(bcrypt::verify("hunter2", &user.password).unwrap());
    }

    #[tokio::test]
    async fn create_without_image_fails_before_any_write() {
        let (service, _dir) = service().await;

        let err = service.create(alice(None)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { field: "image" }));
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_missing_fields() {
        let (service, _dir) = service().await;

        let mut input = alice(Some(upload(JPEG)));
        input.email = Some("   ".into());
        let err = service.create(input).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { field: "email" }));
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email() {
        let (service, _dir) = service().await;

        service.create(alice(Some(upload(JPEG)))).await.unwrap();
        let err = service.create(alice(Some(upload(PNG)))).await.unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateEmail));
    }

    #[tokio::test]
    async fn sparse_update_changes_only_supplied_fields() {
        let (service, _dir) = service().await;
        let created = service.create(alice(Some(upload(JPEG)))).await.unwrap();

        let updated = service
            .update(
                &created.id.to_string(),
                UserInput {
                    name: Some("Alicia".into()),
                    ..UserInput::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Alicia");
        assert_eq!(updated.email, created.email);
        assert_eq!(updated.password, created.password);
        assert_eq!(updated.image_id, created.image_id);

        let stored = service.find(&created.id.to_string()).await.unwrap();
        assert_eq!(stored.name, "Alicia");
        assert_eq!(stored.image_id, created.image_id);
    }

    #[tokio::test]
    async fn update_without_image_preserves_stored_reference() {
        let (service, _dir) = service().await;
        let created = service.create(alice(Some(upload(JPEG)))).await.unwrap();

        let updated = service
            .update(
                &created.id.to_string(),
                UserInput {
                    email: Some("alicia@example.com".into()),
                    ..UserInput::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.image_id, created.image_id);
        let (_, bytes) = service.image(&updated.image_id).await.unwrap();
        assert_eq!(bytes, JPEG);
    }

    #[tokio::test]
    async fn update_with_image_replaces_reference() {
        let (service, _dir) = service().await;
        let created = service.create(alice(Some(upload(JPEG)))).await.unwrap();

        let updated = service
            .update(
                &created.id.to_string(),
                UserInput {
                    image: Some(upload(PNG)),
                    ..UserInput::default()
                },
            )
            .await
            .unwrap();

        assert_ne!(updated.image_id, created.image_id);
        let (_, bytes) = service.image(&updated.image_id).await.unwrap();
        assert_eq!(bytes, PNG);
        // the old blob is not garbage-collected
        let (_, old) = service.image(&created.image_id).await.unwrap();
        assert_eq!(old, JPEG);
    }

    #[tokio::test]
    async fn legacy_policy_requires_image_on_every_update() {
        let (service, _dir) = service_with_policy(true).await;
        let created = service.create(alice(Some(upload(JPEG)))).await.unwrap();

        let err = service
            .update(
                &created.id.to_string(),
                UserInput {
                    name: Some("Alicia".into()),
                    ..UserInput::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { field: "image" }));

        // the record is untouched
        let stored = service.find(&created.id.to_string()).await.unwrap();
        assert_eq!(stored.name, "Alice");
    }

    #[tokio::test]
    async fn missing_ids_fail_with_not_found_everywhere() {
        let (service, _dir) = service().await;
        let id = Uuid::new_v4().to_string();

        assert!(matches!(
            service.find(&id).await.unwrap_err(),
            ServiceError::NotFound("user")
        ));
        assert!(matches!(
            service.update(&id, UserInput::default()).await.unwrap_err(),
            ServiceError::NotFound("user")
        ));
        assert!(matches!(
            service.delete(&id).await.unwrap_err(),
            ServiceError::NotFound("user")
        ));
    }

    #[tokio::test]
    async fn malformed_ids_fail_before_any_lookup() {
        let (service, _dir) = service().await;

        let err = service.find("definitely-not-a-uuid").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidId("user")));
    }

    #[tokio::test]
    async fn delete_then_find_is_not_found() {
        let (service, _dir) = service().await;
        let created = service.create(alice(Some(upload(JPEG)))).await.unwrap();

        service.delete(&created.id.to_string()).await.unwrap();
        let err = service.find(&created.id.to_string()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("user")));

        // deleting never removes the blob
        let (_, bytes) = service.image(&created.image_id).await.unwrap();
        assert_eq!(bytes, JPEG);
    }

    #[tokio::test]
    async fn list_excludes_password_material() {
        let (service, _dir) = service().await;
        service.create(alice(Some(upload(JPEG)))).await.unwrap();

        let summaries = service.list().await.unwrap();
        assert_eq!(summaries.len(), 1);
        let json = serde_json::to_value(&summaries[0]).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["email"], "alice@example.com");
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let (service, _dir) = service().await;
        service.create(alice(Some(upload(JPEG)))).await.unwrap();

        let err = service
            .authenticate("alice@example.com", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCredentials));

        let err = service
            .authenticate("nobody@example.com", "hunter2")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCredentials));

        let user = service
            .authenticate("alice@example.com", "hunter2")
            .await
            .unwrap();
        assert_eq!(user.email, "alice@example.com");
    }
}
