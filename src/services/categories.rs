use crate::domain::types::CategorySlug;
use crate::dto::categories::CategoryDto;
use crate::dto::pages::PageDto;
use crate::forms::categories::AddCategoryFormPayload;
use crate::repository::{
    CategoryReader, CategoryStore, PageListQuery, PageReader, RepositoryError,
};

use super::{ServiceError, ServiceResult};

/// Message attached to the `name` field when a category already exists.
pub const DUPLICATE_CATEGORY_MESSAGE: &str = "Category with this name already exists.";

/// A category with its pages, most viewed first.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDetails {
    pub category: CategoryDto,
    pub pages: Vec<PageDto>,
}

/// Resolve a slug taken from the URL. Anything that is not a canonical slug
/// cannot match a stored category.
fn parse_slug(slug: &str) -> ServiceResult<CategorySlug> {
    CategorySlug::new(slug).map_err(|_| ServiceError::NotFound)
}

/// Look up a category by slug.
pub fn find_category<R>(slug: &str, repo: &R) -> ServiceResult<CategoryDto>
where
    R: CategoryReader,
{
    let slug = parse_slug(slug)?;

    match repo.get_category_by_slug(&slug) {
        Ok(Some(category)) => Ok(category.into()),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get category: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Core business logic for the category page.
///
/// Loads the category and its pages and counts the view. Returns
/// `ServiceError::NotFound` for stale slugs so the route can render the empty
/// state.
pub fn show_category<R>(slug: &str, repo: &R) -> ServiceResult<CategoryDetails>
where
    R: CategoryStore + PageReader,
{
    let slug = parse_slug(slug)?;

    let mut category = match repo.get_category_by_slug(&slug) {
        Ok(Some(category)) => category,
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get category: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let pages = match repo.list_pages(PageListQuery::default().category(category.id)) {
        Ok(pages) => pages,
        Err(e) => {
            log::error!("Failed to list pages: {e}");
            return Err(ServiceError::Internal);
        }
    };

    match repo.increment_category_views(category.id) {
        Ok(views) => category.views = views,
        Err(e) => log::error!("Failed to count category view: {e}"),
    }

    Ok(CategoryDetails {
        category: category.into(),
        pages: pages.into_iter().map(PageDto::from).collect(),
    })
}

/// Persist a new category.
///
/// A category whose name or slug is already taken yields
/// `ServiceError::Conflict` and nothing is written.
pub fn add_category<R>(payload: AddCategoryFormPayload, repo: &R) -> ServiceResult<CategoryDto>
where
    R: CategoryStore,
{
    let category = payload.into_new_category();

    match repo.get_category_by_slug(&category.slug) {
        Ok(None) => {}
        Ok(Some(_)) => {
            return Err(ServiceError::Conflict(
                DUPLICATE_CATEGORY_MESSAGE.to_string(),
            ));
        }
        Err(e) => {
            log::error!("Failed to check category slug: {e}");
            return Err(ServiceError::Internal);
        }
    }

    match repo.create_category(&category) {
        Ok(created) => {
            log::info!("Created category '{}'", created.slug);
            Ok(created.into())
        }
        Err(RepositoryError::ConstraintViolation(reason)) => {
            log::warn!("Rejected duplicate category '{}': {reason}", category.name);
            Err(ServiceError::Conflict(
                DUPLICATE_CATEGORY_MESSAGE.to_string(),
            ))
        }
        Err(e) => {
            log::error!("Failed to create category: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Add a like to a category, returning the new total.
pub fn like_category<R>(slug: &str, repo: &R) -> ServiceResult<i32>
where
    R: CategoryStore,
{
    let slug = parse_slug(slug)?;

    let category = match repo.get_category_by_slug(&slug) {
        Ok(Some(category)) => category,
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get category: {e}");
            return Err(ServiceError::Internal);
        }
    };

    match repo.increment_category_likes(category.id) {
        Ok(likes) => Ok(likes.get()),
        Err(RepositoryError::NotFound) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to like category: {e}");
            Err(ServiceError::Internal)
        }
    }
}
