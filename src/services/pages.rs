use crate::domain::types::{CategorySlug, PageId};
use crate::dto::pages::PageDto;
use crate::forms::pages::AddPageFormPayload;
use crate::repository::{CategoryReader, PageStore, RepositoryError};

use super::{ServiceError, ServiceResult};

/// Attach a new page to the category identified by `slug`.
///
/// Returns `ServiceError::NotFound` without persisting anything when the
/// category does not exist.
pub fn add_page<R>(slug: &str, payload: AddPageFormPayload, repo: &R) -> ServiceResult<PageDto>
where
    R: CategoryReader + PageStore,
{
    let slug = CategorySlug::new(slug).map_err(|_| ServiceError::NotFound)?;

    let category = match repo.get_category_by_slug(&slug) {
        Ok(Some(category)) => category,
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get category: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let page = payload.into_new_page(category.id);
    match repo.create_page(&page) {
        Ok(created) => {
            log::info!("Added page '{}' to category '{}'", created.title, slug);
            Ok(created.into())
        }
        Err(RepositoryError::ConstraintViolation(reason)) => {
            log::warn!("Category '{slug}' vanished before page insert: {reason}");
            Err(ServiceError::NotFound)
        }
        Err(e) => {
            log::error!("Failed to create page: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Count a click-through on a page and return the URL to redirect to.
pub fn goto_page<R>(page_id: i32, repo: &R) -> ServiceResult<String>
where
    R: PageStore,
{
    let page_id = PageId::new(page_id).map_err(|_| ServiceError::NotFound)?;

    let page = match repo.get_page_by_id(page_id) {
        Ok(Some(page)) => page,
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get page: {e}");
            return Err(ServiceError::Internal);
        }
    };

    if let Err(e) = repo.increment_page_views(page.id) {
        log::error!("Failed to count page view: {e}");
    }

    Ok(page.url.into_inner())
}
