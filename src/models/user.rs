use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::{ProfileUrl, TypeConstraintError, Username};
use crate::domain::user::{
    NewUser as DomainNewUser, User as DomainUser, UserProfile as DomainUserProfile,
};

/// Diesel model representing the `users` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::users)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub date_joined: NaiveDateTime,
}

/// Insertable form of [`User`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub date_joined: NaiveDateTime,
}

/// Diesel model representing the `user_profiles` table.
#[derive(Debug, Clone, Identifiable, Queryable, Associations)]
#[diesel(belongs_to(User))]
#[diesel(table_name = crate::schema::user_profiles)]
pub struct UserProfile {
    pub id: i32,
    pub user_id: i32,
    pub website: Option<String>,
    pub picture: Option<String>,
}

/// Insertable form of [`UserProfile`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::user_profiles)]
pub struct NewUserProfile<'a> {
    pub user_id: i32,
    pub website: Option<&'a str>,
    pub picture: Option<&'a str>,
}

impl TryFrom<User> for DomainUser {
    type Error = TypeConstraintError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        Ok(Self {
            id: user.id.try_into()?,
            username: Username::new(user.username)?,
            email: user.email,
            password_hash: user.password_hash,
            is_active: user.is_active,
            date_joined: user.date_joined,
        })
    }
}

impl TryFrom<UserProfile> for DomainUserProfile {
    type Error = TypeConstraintError;

    fn try_from(profile: UserProfile) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: profile.user_id.try_into()?,
            website: profile.website.map(ProfileUrl::new).transpose()?,
            picture: profile.picture,
        })
    }
}

impl<'a> From<&'a DomainNewUser> for NewUser<'a> {
    fn from(user: &'a DomainNewUser) -> Self {
        Self {
            username: user.username.as_str(),
            email: user.email.as_str(),
            password_hash: user.password_hash.as_str(),
            date_joined: user.date_joined,
        }
    }
}
