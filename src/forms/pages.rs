use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::page::NewPage;
use crate::domain::types::{CategoryId, PageTitle, PageUrl, ViewCount};
use crate::forms::FieldErrors;

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct AddPageForm {
    #[validate(length(
        min = 1,
        max = 128,
        message = "Title must be between 1 and 128 characters."
    ))]
    pub title: String,
    #[validate(length(
        min = 1,
        max = 200,
        message = "URL must be between 1 and 200 characters."
    ))]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddPageFormPayload {
    pub title: PageTitle,
    pub url: PageUrl,
}

impl AddPageFormPayload {
    /// New pages start with zero views; creating a page is not a visit.
    pub fn into_new_page(self, category_id: CategoryId) -> NewPage {
        NewPage {
            category_id,
            title: self.title,
            url: self.url,
            views: ViewCount::zero(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AddPageFormError {
    #[error("Add page form validation failed: {0}")]
    Validation(FieldErrors),
}

impl AddPageFormError {
    pub fn field_errors(&self) -> &FieldErrors {
        match self {
            Self::Validation(errors) => errors,
        }
    }
}

impl From<ValidationErrors> for AddPageFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.into())
    }
}

impl TryFrom<AddPageForm> for AddPageFormPayload {
    type Error = AddPageFormError;

    fn try_from(value: AddPageForm) -> Result<Self, Self::Error> {
        value.validate()?;

        let mut errors = FieldErrors::new();
        let title = PageTitle::new(value.title)
            .map_err(|e| errors.merge(FieldErrors::constraint("title", e)))
            .ok();
        let url = PageUrl::new(value.url)
            .map_err(|e| errors.merge(FieldErrors::constraint("url", e)))
            .ok();

        match (title, url) {
            (Some(title), Some(url)) => Ok(Self { title, url }),
            _ => Err(AddPageFormError::Validation(errors)),
        }
    }
}
