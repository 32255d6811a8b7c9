use diesel::prelude::*;

use crate::domain::page::{NewPage, Page};
use crate::domain::types::{PageId, ViewCount};
use crate::models::page::{NewPage as DbNewPage, Page as DbPage};
use crate::repository::{
    DieselRepository, PageListQuery, PageReader, PageWriter, RepositoryError,
    RepositoryResult,
};

impl PageReader for DieselRepository {
    fn list_pages(&self, query: PageListQuery) -> RepositoryResult<Vec<Page>> {
        use crate::schema::pages;

        let mut conn = self.conn()?;

        let mut items = pages::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(category_id) = query.category_id {
            items = items.filter(pages::category_id.eq(category_id.get()));
        }

        items = items.order((pages::views.desc(), pages::id.asc()));

        if let Some(limit) = query.limit {
            items = items.limit(limit as i64);
        }

        let items = items
            .load::<DbPage>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Page>, _>>()?;

        Ok(items)
    }

    fn get_page_by_id(&self, id: PageId) -> RepositoryResult<Option<Page>> {
        use crate::schema::pages;

        let mut conn = self.conn()?;

        let page = pages::table
            .filter(pages::id.eq(id.get()))
            .first::<DbPage>(&mut conn)
            .optional()?;

        let page = page.map(TryInto::try_into).transpose()?;
        Ok(page)
    }
}

impl PageWriter for DieselRepository {
    fn create_page(&self, page: &NewPage) -> RepositoryResult<Page> {
        use crate::schema::pages;

        let mut conn = self.conn()?;
        let db_page: DbNewPage = page.into();

        let created = diesel::insert_into(pages::table)
            .values(&db_page)
            .get_result::<DbPage>(&mut conn)?;

        Ok(created.try_into()?)
    }

    fn increment_page_views(&self, id: PageId) -> RepositoryResult<ViewCount> {
        use crate::schema::pages;

        let mut conn = self.conn()?;

        let views = diesel::update(pages::table.filter(pages::id.eq(id.get())))
            .set(pages::views.eq(pages::views + 1))
            .returning(pages::views)
            .get_result::<i32>(&mut conn)
            .optional()?
            .ok_or(RepositoryError::NotFound)?;

        Ok(ViewCount::new(views)?)
    }
}
