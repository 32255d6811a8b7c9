use serde::Serialize;

use crate::domain::user::{User, UserProfile};

/// Account details shown on the restricted page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileDto {
    pub username: String,
    pub email: String,
    pub website: Option<String>,
    /// Path relative to the media root.
    pub picture: Option<String>,
}

impl ProfileDto {
    pub fn new(user: User, profile: Option<UserProfile>) -> Self {
        let (website, picture) = match profile {
            Some(profile) => (profile.website.map(|url| url.into_inner()), profile.picture),
            None => (None, None),
        };
        Self {
            username: user.username.into_inner(),
            email: user.email,
            website,
            picture,
        }
    }
}
