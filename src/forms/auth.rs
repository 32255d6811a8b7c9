use std::fmt::{Debug, Formatter};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use image::{ImageFormat, ImageReader};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::types::{ProfileUrl, Username};
use crate::forms::FieldErrors;

const PICTURE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Decodable picture formats with the extension used when storing them.
const PICTURE_FORMATS: [(ImageFormat, &str); 4] = [
    (ImageFormat::Jpeg, "jpg"),
    (ImageFormat::Png, "png"),
    (ImageFormat::Gif, "gif"),
    (ImageFormat::WebP, "webp"),
];

const INVALID_PICTURE_MESSAGE: &str =
    "Upload a valid image. Supported formats: jpg, jpeg, png, gif, webp.";

/// Multipart registration form: account fields plus an optional picture.
#[derive(MultipartForm)]
pub struct RegisterForm {
    pub username: Text<String>,
    pub email: Option<Text<String>>,
    pub password: Text<String>,
    pub website: Option<Text<String>>,
    #[multipart(limit = "5MB")]
    pub picture: Option<TempFile>,
}

impl RegisterForm {
    /// Split the upload from the text fields so the latter can be validated
    /// and echoed back on errors.
    pub fn into_parts(self) -> (RegisterFields, Option<TempFile>) {
        let text = |value: Option<Text<String>>| value.map(Text::into_inner).unwrap_or_default();
        let fields = RegisterFields {
            username: self.username.into_inner(),
            email: text(self.email),
            password: self.password.into_inner(),
            website: text(self.website),
        };
        (fields, self.picture)
    }
}

#[derive(Clone, Default, Deserialize, Serialize, Validate)]
pub struct RegisterFields {
    #[validate(length(
        min = 1,
        max = 150,
        message = "Username must be between 1 and 150 characters."
    ))]
    pub username: String,
    #[validate(custom(function = "validate_optional_email"))]
    pub email: String,
    #[serde(skip_serializing)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub password: String,
    #[validate(length(max = 200, message = "Website must be at most 200 characters."))]
    pub website: String,
}

impl Debug for RegisterFields {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterFields")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("website", &self.website)
            .finish_non_exhaustive()
    }
}

fn validate_optional_email(value: &str) -> Result<(), validator::ValidationError> {
    use validator::ValidateEmail;

    if value.trim().is_empty() || value.trim().validate_email() {
        Ok(())
    } else {
        let mut error = validator::ValidationError::new("email");
        error.message = Some("Enter a valid email address.".into());
        Err(error)
    }
}

#[derive(Clone, PartialEq)]
pub struct RegisterFormPayload {
    pub username: Username,
    pub email: String,
    pub password: String,
    pub website: Option<ProfileUrl>,
}

impl Debug for RegisterFormPayload {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterFormPayload")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("website", &self.website)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error)]
pub enum RegisterFormError {
    #[error("Register form validation failed: {0}")]
    Validation(FieldErrors),
}

impl RegisterFormError {
    pub fn field_errors(&self) -> &FieldErrors {
        match self {
            Self::Validation(errors) => errors,
        }
    }
}

impl From<ValidationErrors> for RegisterFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.into())
    }
}

impl TryFrom<RegisterFields> for RegisterFormPayload {
    type Error = RegisterFormError;

    fn try_from(value: RegisterFields) -> Result<Self, Self::Error> {
        value.validate()?;

        let mut errors = FieldErrors::new();
        let username = Username::new(value.username)
            .map_err(|e| errors.merge(FieldErrors::constraint("username", e)))
            .ok();
        let website = match value.website.trim() {
            "" => Some(None),
            website => ProfileUrl::new(website)
                .map(Some)
                .map_err(|e| errors.merge(FieldErrors::constraint("website", e)))
                .ok(),
        };

        match (username, website) {
            (Some(username), Some(website)) => Ok(Self {
                username,
                email: value.email.trim().to_string(),
                password: value.password,
                website,
            }),
            _ => Err(RegisterFormError::Validation(errors)),
        }
    }
}

/// Profile picture accepted from the registration form.
pub struct PictureUpload {
    file: TempFile,
    extension: &'static str,
}

impl PictureUpload {
    /// Accepts an upload whose name carries an image extension and whose
    /// content decodes as a supported image. An empty file input yields `None`.
    pub fn from_temp_file(file: TempFile) -> Result<Option<Self>, RegisterFormError> {
        if file.size == 0 {
            return Ok(None);
        }

        let named_as_image = file
            .file_name
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| PICTURE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));

        match sniff_extension(file.file.path()) {
            Some(extension) if named_as_image => Ok(Some(Self { file, extension })),
            _ => Err(RegisterFormError::Validation(FieldErrors::single(
                "picture",
                INVALID_PICTURE_MESSAGE,
            ))),
        }
    }

    /// Extension matching the decoded format, not the uploaded name.
    pub fn extension(&self) -> &'static str {
        self.extension
    }

    /// Copy the upload into `destination`.
    pub fn copy_into(&self, destination: &mut impl Write) -> std::io::Result<u64> {
        let mut source = File::open(self.file.file.path())?;
        std::io::copy(&mut source, destination)
    }
}

/// Detect the image format from the file content and read its header.
fn sniff_extension(path: &Path) -> Option<&'static str> {
    let reader = match ImageReader::open(path).and_then(ImageReader::with_guessed_format) {
        Ok(reader) => reader,
        Err(e) => {
            log::warn!("Failed to read uploaded picture: {e}");
            return None;
        }
    };

    let extension = reader.format().and_then(|format| {
        PICTURE_FORMATS
            .iter()
            .find(|(supported, _)| *supported == format)
            .map(|(_, extension)| *extension)
    })?;

    match reader.into_dimensions() {
        Ok(_) => Some(extension),
        Err(e) => {
            log::warn!("Uploaded picture is not a decodable image: {e}");
            None
        }
    }
}

impl Debug for PictureUpload {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PictureUpload")
            .field("file_name", &self.file.file_name)
            .field("size", &self.file.size)
            .finish()
    }
}

#[derive(Clone, Default, Deserialize, Serialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "This field is required."))]
    pub username: String,
    #[serde(skip_serializing)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub password: String,
}

#[derive(Clone, PartialEq)]
pub struct LoginFormPayload {
    pub username: Username,
    pub password: String,
}

impl Debug for LoginFormPayload {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginFormPayload")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error)]
pub enum LoginFormError {
    #[error("Login form validation failed: {0}")]
    Validation(FieldErrors),
}

impl LoginFormError {
    pub fn field_errors(&self) -> &FieldErrors {
        match self {
            Self::Validation(errors) => errors,
        }
    }
}

impl From<ValidationErrors> for LoginFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.into())
    }
}

impl TryFrom<LoginForm> for LoginFormPayload {
    type Error = LoginFormError;

    fn try_from(value: LoginForm) -> Result<Self, Self::Error> {
        value.validate()?;
        let username = Username::new(value.username)
            .map_err(|e| LoginFormError::Validation(FieldErrors::constraint("username", e)))?;

        Ok(Self {
            username,
            password: value.password,
        })
    }
}
