use diesel::prelude::*;

use crate::domain::page::{NewPage as DomainNewPage, Page as DomainPage};
use crate::domain::types::{PageTitle, PageUrl, TypeConstraintError, ViewCount};
use crate::models::category::Category;

/// Diesel model representing the `pages` table.
#[derive(Debug, Clone, Identifiable, Queryable, Associations)]
#[diesel(belongs_to(Category))]
#[diesel(table_name = crate::schema::pages)]
pub struct Page {
    pub id: i32,
    pub category_id: i32,
    pub title: String,
    pub url: String,
    pub views: i32,
}

/// Insertable form of [`Page`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::pages)]
pub struct NewPage<'a> {
    pub category_id: i32,
    pub title: &'a str,
    pub url: &'a str,
    pub views: i32,
}

impl TryFrom<Page> for DomainPage {
    type Error = TypeConstraintError;

    fn try_from(page: Page) -> Result<Self, Self::Error> {
        Ok(Self {
            id: page.id.try_into()?,
            category_id: page.category_id.try_into()?,
            title: PageTitle::new(page.title)?,
            url: PageUrl::new(page.url)?,
            views: ViewCount::new(page.views)?,
        })
    }
}

impl<'a> From<&'a DomainNewPage> for NewPage<'a> {
    fn from(page: &'a DomainNewPage) -> Self {
        Self {
            category_id: page.category_id.get(),
            title: page.title.as_str(),
            url: page.url.as_str(),
            views: page.views.get(),
        }
    }
}
