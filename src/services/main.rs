use crate::TOP_N;
use crate::dto::categories::CategoryDto;
use crate::dto::pages::PageDto;
use crate::repository::{CategoryListQuery, CategoryOrder, CategoryReader, PageListQuery, PageReader};

use super::{ServiceError, ServiceResult};

/// Data shown on the landing page.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexData {
    pub categories: Vec<CategoryDto>,
    pub pages: Vec<PageDto>,
}

/// Core business logic for rendering the index page.
///
/// Fetches the most liked categories and the most viewed pages. Repository
/// errors are translated into `ServiceError` so that the HTTP route can remain
/// a thin wrapper.
pub fn show_index<R>(repo: &R) -> ServiceResult<IndexData>
where
    R: CategoryReader + PageReader,
{
    let categories = match repo.list_categories(
        CategoryListQuery::default()
            .order(CategoryOrder::MostLiked)
            .top(TOP_N),
    ) {
        Ok(categories) => categories,
        Err(e) => {
            log::error!("Failed to list categories: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let pages = match repo.list_pages(PageListQuery::default().top(TOP_N)) {
        Ok(pages) => pages,
        Err(e) => {
            log::error!("Failed to list pages: {e}");
            return Err(ServiceError::Internal);
        }
    };

    Ok(IndexData {
        categories: categories.into_iter().map(CategoryDto::from).collect(),
        pages: pages.into_iter().map(PageDto::from).collect(),
    })
}

/// All categories, alphabetically, for the about page.
pub fn show_about<R>(repo: &R) -> ServiceResult<Vec<CategoryDto>>
where
    R: CategoryReader,
{
    match repo.list_categories(CategoryListQuery::default()) {
        Ok(categories) => Ok(categories.into_iter().map(CategoryDto::from).collect()),
        Err(e) => {
            log::error!("Failed to list categories: {e}");
            Err(ServiceError::Internal)
        }
    }
}
