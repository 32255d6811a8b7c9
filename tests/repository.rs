use chrono::Utc;
use rango::domain::category::NewCategory;
use rango::domain::page::NewPage;
use rango::domain::types::{
    CategoryId, CategoryName, CategorySlug, PageTitle, PageUrl, ProfileUrl, Username, ViewCount,
};
use rango::domain::user::{NewUser, NewUserProfile};
use rango::repository::{
    CategoryListQuery, CategoryOrder, CategoryReader, CategoryWriter, PageListQuery, PageReader,
    PageWriter, RepositoryError, UserReader, UserWriter,
};

mod common;

fn new_category(name: &str) -> NewCategory {
    NewCategory::new(CategoryName::new(name).expect("valid category name"))
        .expect("valid category")
}

fn new_page(category_id: CategoryId, title: &str) -> NewPage {
    NewPage {
        category_id,
        title: PageTitle::new(title).expect("valid title"),
        url: PageUrl::new("docs.python.org/3/tutorial/").expect("valid url"),
        views: ViewCount::zero(),
    }
}

#[test]
fn category_round_trip_with_counters() {
    let test_db = common::TestDb::new();
    let repo = test_db.repository();

    let created = repo
        .create_category(&new_category("Other Frameworks"))
        .expect("should create category");
    assert_eq!(created.slug.as_str(), "other-frameworks");
    assert_eq!(created.views, 0);
    assert_eq!(created.likes, 0);

    repo.increment_category_views(created.id)
        .expect("should count view");
    let likes = repo
        .increment_category_likes(created.id)
        .expect("should count like");
    assert_eq!(likes, 1);

    let slug = CategorySlug::new("other-frameworks").expect("valid slug");
    let fetched = repo
        .get_category_by_slug(&slug)
        .expect("should query category")
        .expect("category should exist");
    assert_eq!(fetched.views, 1);
    assert_eq!(fetched.likes, 1);
}

#[test]
fn duplicate_category_name_violates_constraint() {
    let test_db = common::TestDb::new();
    let repo = test_db.repository();

    repo.create_category(&new_category("Python"))
        .expect("should create category");
    let err = repo
        .create_category(&new_category("Python"))
        .expect_err("duplicate should be rejected");

    assert!(matches!(err, RepositoryError::ConstraintViolation(_)));
}

#[test]
fn categories_are_listed_by_likes_with_limit() {
    let test_db = common::TestDb::new();
    let repo = test_db.repository();

    for (name, likes) in [("Python", 3), ("Django", 5), ("Flask", 1)] {
        let category = repo
            .create_category(&new_category(name))
            .expect("should create category");
        for _ in 0..likes {
            repo.increment_category_likes(category.id)
                .expect("should count like");
        }
    }

    let top = repo
        .list_categories(
            CategoryListQuery::default()
                .order(CategoryOrder::MostLiked)
                .top(2),
        )
        .expect("should list categories");
    let names: Vec<_> = top.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Django", "Python"]);

    let all = repo
        .list_categories(CategoryListQuery::default())
        .expect("should list categories");
    let names: Vec<_> = all.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Django", "Flask", "Python"]);
}

#[test]
fn pages_belong_to_existing_categories() {
    let test_db = common::TestDb::new();
    let repo = test_db.repository();

    let category = repo
        .create_category(&new_category("Python"))
        .expect("should create category");
    let first = repo
        .create_page(&new_page(category.id, "Official Python Tutorial"))
        .expect("should create page");
    let second = repo
        .create_page(&new_page(category.id, "How to Think like a Computer Scientist"))
        .expect("should create page");
    assert_eq!(first.url.as_str(), "http://docs.python.org/3/tutorial/");

    repo.increment_page_views(second.id)
        .expect("should count view");

    let pages = repo
        .list_pages(PageListQuery::default().category(category.id))
        .expect("should list pages");
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].id, second.id);
    assert_eq!(pages[0].views, 1);

    let orphan = new_page(CategoryId::new(999).expect("valid id"), "Orphan");
    let err = repo.create_page(&orphan).expect_err("orphan page rejected");
    assert!(matches!(err, RepositoryError::ConstraintViolation(_)));
}

#[test]
fn user_is_created_with_profile() {
    let test_db = common::TestDb::new();
    let repo = test_db.repository();

    let user = NewUser {
        username: Username::new("leifos").expect("valid username"),
        email: "leifos@example.com".to_string(),
        password_hash: "$2b$04$notarealhash".to_string(),
        date_joined: Utc::now().naive_utc(),
    };
    let profile = NewUserProfile {
        website: Some(ProfileUrl::new("www.leifos.com").expect("valid url")),
        picture: Some("profile_images/leifos.png".to_string()),
    };

    let created = repo
        .create_user(&user, &profile)
        .expect("should create user");
    assert!(created.is_active);

    let fetched = repo
        .get_user_by_username(&user.username)
        .expect("should query user")
        .expect("user should exist");
    assert_eq!(fetched.id, created.id);

    let stored_profile = repo
        .get_user_profile(created.id)
        .expect("should query profile")
        .expect("profile should exist");
    assert_eq!(
        stored_profile.website.expect("website stored").as_str(),
        "http://www.leifos.com"
    );
    assert_eq!(
        stored_profile.picture.as_deref(),
        Some("profile_images/leifos.png")
    );

    let err = repo
        .create_user(&user, &NewUserProfile::default())
        .expect_err("duplicate username rejected");
    assert!(matches!(err, RepositoryError::ConstraintViolation(_)));
}
