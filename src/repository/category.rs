use diesel::prelude::*;

use crate::domain::category::{Category, NewCategory};
use crate::domain::types::{CategoryId, CategorySlug, LikeCount, ViewCount};
use crate::models::category::{Category as DbCategory, NewCategory as DbNewCategory};
use crate::repository::{
    CategoryListQuery, CategoryOrder, CategoryReader, CategoryWriter, DieselRepository,
    RepositoryError, RepositoryResult,
};

impl CategoryReader for DieselRepository {
    fn list_categories(&self, query: CategoryListQuery) -> RepositoryResult<Vec<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let mut items = categories::table.into_boxed::<diesel::sqlite::Sqlite>();

        items = match query.order {
            CategoryOrder::Name => items.order(categories::name.asc()),
            CategoryOrder::MostLiked => {
                items.order((categories::likes.desc(), categories::name.asc()))
            }
        };

        if let Some(limit) = query.limit {
            items = items.limit(limit as i64);
        }

        let items = items
            .load::<DbCategory>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Category>, _>>()?;

        Ok(items)
    }

    fn get_category_by_slug(&self, slug: &CategorySlug) -> RepositoryResult<Option<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let category = categories::table
            .filter(categories::slug.eq(slug.as_str()))
            .first::<DbCategory>(&mut conn)
            .optional()?;

        let category = category.map(TryInto::try_into).transpose()?;
        Ok(category)
    }
}

impl CategoryWriter for DieselRepository {
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<Category> {
        use crate::schema::categories;

        let mut conn = self.conn()?;
        let db_category: DbNewCategory = category.into();

        let created = diesel::insert_into(categories::table)
            .values(&db_category)
            .get_result::<DbCategory>(&mut conn)?;

        Ok(created.try_into()?)
    }

    fn increment_category_views(&self, id: CategoryId) -> RepositoryResult<ViewCount> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let views = diesel::update(categories::table.filter(categories::id.eq(id.get())))
            .set(categories::views.eq(categories::views + 1))
            .returning(categories::views)
            .get_result::<i32>(&mut conn)
            .optional()?
            .ok_or(RepositoryError::NotFound)?;

        Ok(ViewCount::new(views)?)
    }

    fn increment_category_likes(&self, id: CategoryId) -> RepositoryResult<LikeCount> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let likes = diesel::update(categories::table.filter(categories::id.eq(id.get())))
            .set(categories::likes.eq(categories::likes + 1))
            .returning(categories::likes)
            .get_result::<i32>(&mut conn)
            .optional()?
            .ok_or(RepositoryError::NotFound)?;

        Ok(LikeCount::new(likes)?)
    }
}
