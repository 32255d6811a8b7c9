use std::path::Path;

use chrono::Utc;

use crate::domain::types::Username;
use crate::domain::user::{NewUser, NewUserProfile, User};
use crate::dto::users::ProfileDto;
use crate::forms::auth::{LoginFormPayload, PictureUpload, RegisterFormPayload};
use crate::repository::{IdentityStore, RepositoryError, UserReader};

use super::{ServiceError, ServiceResult};

/// Message attached to the `username` field when the name is taken.
pub const DUPLICATE_USERNAME_MESSAGE: &str = "A user with that username already exists.";

/// Directory under the media root holding profile pictures.
pub const PROFILE_IMAGES_DIR: &str = "profile_images";

#[cfg(not(test))]
const BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const BCRYPT_COST: u32 = 4;

/// Create an account with its profile.
///
/// The password is stored as a bcrypt hash. An uploaded picture is copied to
/// `media_root/profile_images/<username>-<random>.<ext>` and removed again if
/// the account cannot be created.
pub fn register_user<R>(
    payload: RegisterFormPayload,
    picture: Option<PictureUpload>,
    media_root: &Path,
    repo: &R,
) -> ServiceResult<User>
where
    R: IdentityStore,
{
    match repo.get_user_by_username(&payload.username) {
        Ok(None) => {}
        Ok(Some(_)) => {
            return Err(ServiceError::Conflict(
                DUPLICATE_USERNAME_MESSAGE.to_string(),
            ));
        }
        Err(e) => {
            log::error!("Failed to check username: {e}");
            return Err(ServiceError::Internal);
        }
    }

    let password_hash = bcrypt::hash(&payload.password, BCRYPT_COST).map_err(|e| {
        log::error!("Failed to hash password: {e}");
        ServiceError::Internal
    })?;

    let stored_picture = match picture {
        Some(picture) => Some(store_picture(&picture, payload.username.as_str(), media_root)?),
        None => None,
    };

    let user = NewUser {
        username: payload.username,
        email: payload.email,
        password_hash,
        date_joined: Utc::now().naive_utc(),
    };
    let profile = NewUserProfile {
        website: payload.website,
        picture: stored_picture.clone(),
    };

    let result = repo.create_user(&user, &profile);

    if result.is_err()
        && let Some(picture) = &stored_picture
        && let Err(e) = std::fs::remove_file(media_root.join(picture))
    {
        log::warn!("Failed to remove orphaned picture '{picture}': {e}");
    }

    match result {
        Ok(created) => {
            log::info!("Registered user '{}'", created.username);
            Ok(created)
        }
        Err(RepositoryError::ConstraintViolation(_)) => Err(ServiceError::Conflict(
            DUPLICATE_USERNAME_MESSAGE.to_string(),
        )),
        Err(e) => {
            log::error!("Failed to create user: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Copy the upload into the media root, returning its path relative to it.
///
/// Every upload gets a fresh file name, so a failed registration never
/// removes a picture stored by another one.
fn store_picture(
    picture: &PictureUpload,
    username: &str,
    media_root: &Path,
) -> ServiceResult<String> {
    let directory = media_root.join(PROFILE_IMAGES_DIR);
    std::fs::create_dir_all(&directory).map_err(|e| {
        log::error!("Failed to create {}: {e}", directory.display());
        ServiceError::Internal
    })?;

    let mut stored = tempfile::Builder::new()
        .prefix(&format!("{username}-"))
        .suffix(&format!(".{}", picture.extension()))
        .tempfile_in(&directory)
        .map_err(|e| {
            log::error!("Failed to create profile picture file: {e}");
            ServiceError::Internal
        })?;

    picture.copy_into(stored.as_file_mut()).map_err(|e| {
        log::error!("Failed to store profile picture: {e}");
        ServiceError::Internal
    })?;

    let (_, path) = stored.keep().map_err(|e| {
        log::error!("Failed to keep profile picture: {e}");
        ServiceError::Internal
    })?;

    match path.file_name().and_then(|name| name.to_str()) {
        Some(file_name) => Ok(format!("{PROFILE_IMAGES_DIR}/{file_name}")),
        None => {
            log::error!("Stored picture has an unusable name: {}", path.display());
            Err(ServiceError::Internal)
        }
    }
}

/// Profile of the signed-in account.
///
/// Accounts registered without profile details get an empty profile.
pub fn show_profile<R>(username: &str, repo: &R) -> ServiceResult<ProfileDto>
where
    R: UserReader,
{
    let username = Username::new(username).map_err(|_| ServiceError::NotFound)?;

    let user = match repo.get_user_by_username(&username) {
        Ok(Some(user)) => user,
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get user: {e}");
            return Err(ServiceError::Internal);
        }
    };

    match repo.get_user_profile(user.id) {
        Ok(profile) => Ok(ProfileDto::new(user, profile)),
        Err(e) => {
            log::error!("Failed to get profile of '{}': {e}", user.username);
            Err(ServiceError::Internal)
        }
    }
}

/// Check credentials.
///
/// Unknown users and wrong passwords yield `ServiceError::Unauthorized`; a
/// correct password for a deactivated account yields
/// `ServiceError::Forbidden`.
pub fn authenticate<R>(payload: LoginFormPayload, repo: &R) -> ServiceResult<User>
where
    R: UserReader,
{
    let user = match repo.get_user_by_username(&payload.username) {
        Ok(Some(user)) => user,
        Ok(None) => return Err(ServiceError::Unauthorized),
        Err(e) => {
            log::error!("Failed to get user: {e}");
            return Err(ServiceError::Internal);
        }
    };

    match bcrypt::verify(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => return Err(ServiceError::Unauthorized),
        Err(e) => {
            log::error!("Stored password hash for '{}' is unusable: {e}", user.username);
            return Err(ServiceError::Unauthorized);
        }
    }

    if !user.is_active {
        return Err(ServiceError::Forbidden);
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use actix_multipart::form::tempfile::TempFile;

    use super::*;
    use crate::domain::types::UserId;
    use crate::domain::user::UserProfile;
    use crate::forms::auth::{LoginForm, RegisterFields};
    use crate::repository::test::TestRepository;
    use crate::repository::{RepositoryResult, UserWriter};

    /// Repository that loses every registration race: the username looks
    /// free but the insert hits the unique constraint.
    struct RacingRepository;

    impl UserReader for RacingRepository {
        fn get_user_by_username(&self, _: &Username) -> RepositoryResult<Option<User>> {
            Ok(None)
        }

        fn get_user_profile(&self, _: UserId) -> RepositoryResult<Option<UserProfile>> {
            Ok(None)
        }
    }

    impl UserWriter for RacingRepository {
        fn create_user(&self, _: &NewUser, _: &NewUserProfile) -> RepositoryResult<User> {
            Err(RepositoryError::ConstraintViolation(
                "users.username".to_string(),
            ))
        }
    }

    fn png_upload() -> PictureUpload {
        let mut bytes = Vec::new();
        image::RgbImage::new(1, 1)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&bytes).unwrap();
        let upload = TempFile {
            file,
            content_type: None,
            file_name: Some("avatar.png".to_string()),
            size: bytes.len(),
        };
        PictureUpload::from_temp_file(upload).unwrap().unwrap()
    }

    fn stored_pictures(media_root: &Path) -> Vec<String> {
        match std::fs::read_dir(media_root.join(PROFILE_IMAGES_DIR)) {
            Ok(entries) => entries
                .map(|entry| entry.unwrap().file_name().into_string().unwrap())
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    fn register_payload(username: &str) -> RegisterFormPayload {
        RegisterFields {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "correct horse".to_string(),
            website: "www.example.com".to_string(),
        }
        .try_into()
        .unwrap()
    }

    fn login(username: &str, password: &str) -> LoginFormPayload {
        LoginForm {
            username: username.to_string(),
            password: password.to_string(),
        }
        .try_into()
        .unwrap()
    }

    #[test]
    fn registration_hashes_password_and_creates_profile() {
        let repo = TestRepository::default();
        let media = tempfile::tempdir().unwrap();

        let user = register_user(register_payload("leifos"), None, media.path(), &repo).unwrap();

        assert_ne!(user.password_hash, "correct horse");
        assert!(bcrypt::verify("correct horse", &user.password_hash).unwrap());
        let profiles = repo.profiles();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].user_id, user.id);
        assert_eq!(
            profiles[0].website.as_ref().unwrap().as_str(),
            "http://www.example.com"
        );
        assert_eq!(profiles[0].picture, None);
    }

    #[test]
    fn duplicate_username_is_a_conflict() {
        let repo = TestRepository::default();
        let media = tempfile::tempdir().unwrap();
        register_user(register_payload("leifos"), None, media.path(), &repo).unwrap();

        let err = register_user(register_payload("leifos"), None, media.path(), &repo).unwrap_err();

        assert_eq!(
            err,
            ServiceError::Conflict(DUPLICATE_USERNAME_MESSAGE.to_string())
        );
    }

    #[test]
    fn registration_stores_picture_under_media_root() {
        let repo = TestRepository::default();
        let media = tempfile::tempdir().unwrap();

        register_user(register_payload("leifos"), Some(png_upload()), media.path(), &repo).unwrap();

        let picture = repo.profiles()[0].picture.clone().unwrap();
        assert!(picture.starts_with("profile_images/leifos-"), "{picture}");
        assert!(picture.ends_with(".png"), "{picture}");
        assert!(media.path().join(&picture).is_file());
        assert_eq!(stored_pictures(media.path()).len(), 1);
    }

    #[test]
    fn each_upload_gets_its_own_file() {
        let media = tempfile::tempdir().unwrap();

        let first = store_picture(&png_upload(), "leifos", media.path()).unwrap();
        let second = store_picture(&png_upload(), "leifos", media.path()).unwrap();

        assert_ne!(first, second);
        assert_eq!(stored_pictures(media.path()).len(), 2);
    }

    #[test]
    fn picture_is_removed_when_account_insert_fails() {
        let media = tempfile::tempdir().unwrap();
        let kept = store_picture(&png_upload(), "leifos", media.path()).unwrap();

        let err = register_user(
            register_payload("leifos"),
            Some(png_upload()),
            media.path(),
            &RacingRepository,
        )
        .unwrap_err();

        assert_eq!(
            err,
            ServiceError::Conflict(DUPLICATE_USERNAME_MESSAGE.to_string())
        );
        assert_eq!(
            stored_pictures(media.path()),
            [kept.trim_start_matches("profile_images/").to_string()]
        );
    }

    #[test]
    fn profile_lists_website_and_picture() {
        let repo = TestRepository::default();
        let media = tempfile::tempdir().unwrap();
        register_user(register_payload("leifos"), Some(png_upload()), media.path(), &repo).unwrap();

        let profile = show_profile("leifos", &repo).unwrap();

        assert_eq!(profile.username, "leifos");
        assert_eq!(profile.website.as_deref(), Some("http://www.example.com"));
        assert_eq!(profile.picture, repo.profiles()[0].picture);
    }

    #[test]
    fn profile_of_unknown_account_is_not_found() {
        let repo = TestRepository::default();

        assert_eq!(
            show_profile("ghost", &repo).unwrap_err(),
            ServiceError::NotFound
        );
    }

    #[test]
    fn login_checks_password() {
        let repo = TestRepository::default();
        let media = tempfile::tempdir().unwrap();
        register_user(register_payload("leifos"), None, media.path(), &repo).unwrap();

        let user = authenticate(login("leifos", "correct horse"), &repo).unwrap();
        assert_eq!(user.username.as_str(), "leifos");

        assert_eq!(
            authenticate(login("leifos", "wrong"), &repo).unwrap_err(),
            ServiceError::Unauthorized
        );
        assert_eq!(
            authenticate(login("nobody", "correct horse"), &repo).unwrap_err(),
            ServiceError::Unauthorized
        );
    }

    #[test]
    fn inactive_account_is_forbidden() {
        let repo = TestRepository::default().with_users(vec![User {
            id: UserId::new(1).unwrap(),
            username: Username::new("dormant").unwrap(),
            email: String::new(),
            password_hash: bcrypt::hash("secret", BCRYPT_COST).unwrap(),
            is_active: false,
            date_joined: Utc::now().naive_utc(),
        }]);

        assert_eq!(
            authenticate(login("dormant", "secret"), &repo).unwrap_err(),
            ServiceError::Forbidden
        );
    }
}
