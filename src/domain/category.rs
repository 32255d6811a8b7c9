use serde::{Deserialize, Serialize};

use crate::domain::types::{
    CategoryId, CategoryName, CategorySlug, LikeCount, TypeConstraintError, ViewCount,
};

/// A named grouping of pages with aggregate view and like counters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub name: CategoryName,
    pub slug: CategorySlug,
    pub views: ViewCount,
    pub likes: LikeCount,
}

/// Data required to insert a new [`Category`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCategory {
    pub name: CategoryName,
    pub slug: CategorySlug,
    pub views: ViewCount,
    pub likes: LikeCount,
}

impl NewCategory {
    /// Builds a category with zeroed counters and a slug derived from `name`.
    pub fn new(name: CategoryName) -> Result<Self, TypeConstraintError> {
        let slug = CategorySlug::from_name(&name)?;
        Ok(Self {
            name,
            slug,
            views: ViewCount::zero(),
            likes: LikeCount::zero(),
        })
    }
}
