//! Represents a registered user and their attached profile image.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A user account with an attached profile image.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct User {
    /// Unique identifier, assigned at creation and never reassigned.
    pub id: Uuid,

    /// Display name.
    pub name: String,

    /// Login email, unique across all users.
    pub email: String,

    /// bcrypt hash of the password. Never serialized into responses.
    #[serde(skip_serializing)]
    pub password: String,

    /// Encoded reference to the profile image blob in the `photos` namespace.
    pub image_id: String,
}

/// The shape users take in list responses: no password material.
#[derive(Serialize, Clone, Debug)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image_id: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            image_id: user.image_id,
        }
    }
}

/// Credentials presented to `POST /api/login`.
#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    #[serde(default)]
    pub password: String,
}
