use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ProfileUrl, UserId, Username};

/// Registered account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: String,
    /// bcrypt hash, never rendered.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub date_joined: NaiveDateTime,
}

/// Data required to insert a new [`User`]. The password must already be hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: Username,
    pub email: String,
    pub password_hash: String,
    pub date_joined: NaiveDateTime,
}

/// Optional details attached one-to-one to a [`User`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub user_id: UserId,
    pub website: Option<ProfileUrl>,
    /// Path relative to the media root.
    pub picture: Option<String>,
}

/// Profile fields captured at registration time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewUserProfile {
    pub website: Option<ProfileUrl>,
    pub picture: Option<String>,
}
