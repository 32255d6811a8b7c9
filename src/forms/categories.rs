use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::category::NewCategory;
use crate::domain::types::{CategoryName, TypeConstraintError};
use crate::forms::FieldErrors;

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct AddCategoryForm {
    #[validate(length(
        min = 1,
        max = 128,
        message = "Category name must be between 1 and 128 characters."
    ))]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddCategoryFormPayload {
    pub category: NewCategory,
}

impl AddCategoryFormPayload {
    pub fn into_new_category(self) -> NewCategory {
        self.category
    }
}

#[derive(Debug, Error)]
pub enum AddCategoryFormError {
    #[error("Add category form validation failed: {0}")]
    Validation(FieldErrors),
}

impl AddCategoryFormError {
    pub fn field_errors(&self) -> &FieldErrors {
        match self {
            Self::Validation(errors) => errors,
        }
    }
}

impl From<ValidationErrors> for AddCategoryFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.into())
    }
}

impl From<TypeConstraintError> for AddCategoryFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::Validation(FieldErrors::constraint("name", value))
    }
}

impl TryFrom<AddCategoryForm> for AddCategoryFormPayload {
    type Error = AddCategoryFormError;

    fn try_from(value: AddCategoryForm) -> Result<Self, Self::Error> {
        value.validate()?;
        let name = CategoryName::new(value.name)?;

        Ok(Self {
            category: NewCategory::new(name)?,
        })
    }
}
