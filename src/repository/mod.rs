use crate::db::{DbConnection, DbPool};
use crate::domain::category::{Category, NewCategory};
use crate::domain::page::{NewPage, Page};
use crate::domain::types::{CategoryId, CategorySlug, LikeCount, PageId, UserId, Username, ViewCount};
use crate::domain::user::{NewUser, NewUserProfile, User, UserProfile};

pub mod category;
pub mod errors;
pub mod page;
pub mod user;

pub use errors::{RepositoryError, RepositoryResult};

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Sort order for category listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryOrder {
    #[default]
    Name,
    MostLiked,
}

/// Query parameters used when listing categories.
#[derive(Debug, Clone, Default)]
pub struct CategoryListQuery {
    pub order: CategoryOrder,
    /// Return at most this many rows.
    pub limit: Option<usize>,
}

impl CategoryListQuery {
    pub fn order(mut self, order: CategoryOrder) -> Self {
        self.order = order;
        self
    }
    pub fn top(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Query parameters used when listing pages.
///
/// Pages always come back most viewed first.
#[derive(Debug, Clone, Default)]
pub struct PageListQuery {
    /// Restrict to pages of a single category.
    pub category_id: Option<CategoryId>,
    /// Return at most this many rows.
    pub limit: Option<usize>,
}

impl PageListQuery {
    pub fn category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }
    pub fn top(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Read-only operations for category entities.
pub trait CategoryReader {
    /// List categories using the supplied query options.
    fn list_categories(&self, query: CategoryListQuery) -> RepositoryResult<Vec<Category>>;
    /// Retrieve a category by its slug.
    fn get_category_by_slug(&self, slug: &CategorySlug) -> RepositoryResult<Option<Category>>;
}

/// Write operations for category entities.
pub trait CategoryWriter {
    /// Persist a new category. Duplicate names or slugs fail with
    /// [`RepositoryError::ConstraintViolation`].
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<Category>;
    /// Bump the view counter, returning the new value.
    fn increment_category_views(&self, id: CategoryId) -> RepositoryResult<ViewCount>;
    /// Bump the like counter, returning the new value.
    fn increment_category_likes(&self, id: CategoryId) -> RepositoryResult<LikeCount>;
}

/// Read-only operations for page entities.
pub trait PageReader {
    /// List pages using the supplied query options.
    fn list_pages(&self, query: PageListQuery) -> RepositoryResult<Vec<Page>>;
    /// Retrieve a page by its identifier.
    fn get_page_by_id(&self, id: PageId) -> RepositoryResult<Option<Page>>;
}

/// Write operations for page entities.
pub trait PageWriter {
    /// Persist a new page. A missing parent category fails with
    /// [`RepositoryError::ConstraintViolation`].
    fn create_page(&self, page: &NewPage) -> RepositoryResult<Page>;
    /// Bump the view counter, returning the new value.
    fn increment_page_views(&self, id: PageId) -> RepositoryResult<ViewCount>;
}

/// Read-only operations for accounts.
pub trait UserReader {
    fn get_user_by_username(&self, username: &Username) -> RepositoryResult<Option<User>>;
    fn get_user_profile(&self, user_id: UserId) -> RepositoryResult<Option<UserProfile>>;
}

/// Write operations for accounts.
pub trait UserWriter {
    /// Create a user together with its profile in one transaction.
    fn create_user(&self, user: &NewUser, profile: &NewUserProfile) -> RepositoryResult<User>;
}

/// Everything the catalog needs for categories.
pub trait CategoryStore: CategoryReader + CategoryWriter {}
impl<T: CategoryReader + CategoryWriter> CategoryStore for T {}

/// Everything the catalog needs for pages.
pub trait PageStore: PageReader + PageWriter {}
impl<T: PageReader + PageWriter> PageStore for T {}

/// Account storage used by registration and login.
pub trait IdentityStore: UserReader + UserWriter {}
impl<T: UserReader + UserWriter> IdentityStore for T {}
