//! Tests for the blog service.

use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::ports::{
    BlogRepositoryError, MockBlogRepository, MockImageStore, MockUserRepository,
};
use crate::domain::test_fixtures::{self, FixtureClock, fixed_now, image, png_upload, session};
use crate::domain::{BlogBody, BlogTitle, Category, ErrorCode, Role, User};

type Service = BlogService<MockBlogRepository, MockUserRepository, MockImageStore>;

struct Mocks {
    blogs: MockBlogRepository,
    users: MockUserRepository,
    images: MockImageStore,
}

impl Mocks {
    fn new() -> Self {
        Self {
            blogs: MockBlogRepository::new(),
            users: MockUserRepository::new(),
            images: MockImageStore::new(),
        }
    }

    fn expect_user(&mut self, user: &User) {
        let user = user.clone();
        self.users
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(user)));
    }

    fn build(self) -> Service {
        BlogService::new(
            Arc::new(self.blogs),
            Arc::new(self.users),
            Arc::new(self.images),
            Arc::new(FixtureClock::default()),
        )
    }
}

fn draft() -> BlogDraft {
    BlogDraft {
        title: BlogTitle::new("Night trains of Europe").expect("title"),
        category: Category::new("Travel").expect("category"),
        body: BlogBody::new("<p>All aboard</p>").expect("body"),
        image: png_upload("cover.png"),
    }
}

#[tokio::test]
async fn readers_cannot_publish() {
    let reader = test_fixtures::user(Role::Reader);
    let mut mocks = Mocks::new();
    mocks.images.expect_upload().never();
    mocks.blogs.expect_insert().never();

    let err = mocks
        .build()
        .create(&session(&reader), draft())
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn creators_publish_with_uploaded_cover() {
    let creator = test_fixtures::user(Role::Creator);
    let mut mocks = Mocks::new();
    mocks.expect_user(&creator);
    mocks
        .images
        .expect_upload()
        .times(1)
        .return_once(|_| Ok(image("covers/new")));
    mocks
        .blogs
        .expect_insert()
        .withf(|blog| blog.like_count == 0 && blog.image.public_id == "covers/new")
        .times(1)
        .return_once(|_| Ok(()));

    let view = mocks
        .build()
        .create(&session(&creator), draft())
        .await
        .expect("published");
    assert_eq!(view.author.id, creator.id);
    assert_eq!(view.created_at, fixed_now());
    assert_eq!(view.liked, None);
}

#[tokio::test]
async fn failed_insert_discards_cover() {
    let creator = test_fixtures::user(Role::Creator);
    let mut mocks = Mocks::new();
    mocks.expect_user(&creator);
    mocks
        .images
        .expect_upload()
        .return_once(|_| Ok(image("covers/orphan")));
    mocks
        .blogs
        .expect_insert()
        .return_once(|_| Err(BlogRepositoryError::connection("gone")));
    mocks
        .images
        .expect_delete()
        .withf(|img| img.public_id == "covers/orphan")
        .times(1)
        .return_once(|_| Ok(()));

    let err = mocks
        .build()
        .create(&session(&creator), draft())
        .await
        .expect_err("insert failed");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[case::update(true)]
#[case::delete(false)]
#[tokio::test]
async fn non_authors_cannot_modify(#[case] update: bool) {
    let author = test_fixtures::user(Role::Creator);
    let intruder = test_fixtures::user(Role::Creator);
    let blog = test_fixtures::blog(&author, "Mine, not yours", 0);
    let id = blog.id;
    let mut mocks = Mocks::new();
    mocks
        .blogs
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(blog)));
    mocks.blogs.expect_update().never();
    mocks.blogs.expect_delete().never();

    let service = mocks.build();
    let actor = session(&intruder);
    let err = if update {
        service
            .update(&actor, &id, BlogChanges::default())
            .await
            .expect_err("forbidden")
    } else {
        service.delete(&actor, &id).await.expect_err("forbidden")
    };
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn missing_blogs_are_not_found() {
    let reader = test_fixtures::user(Role::Reader);
    let mut mocks = Mocks::new();
    mocks.blogs.expect_find_by_id().returning(|_| Ok(None));
    mocks.blogs.expect_toggle_like().never();

    let service = mocks.build();
    let id = BlogId::random();
    let like = service
        .toggle_like(&session(&reader), &id)
        .await
        .expect_err("missing");
    let get = service.get(&id, None).await.expect_err("missing");
    assert_eq!(like.code(), ErrorCode::NotFound);
    assert_eq!(get.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn update_swaps_image_and_deletes_the_old_one() {
    let author = test_fixtures::user(Role::Creator);
    let blog = test_fixtures::blog(&author, "Draft title", 2);
    let id = blog.id;
    let old_image = blog.image.public_id.clone();
    let mut mocks = Mocks::new();
    mocks.expect_user(&author);
    mocks
        .blogs
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(blog)));
    mocks
        .images
        .expect_upload()
        .return_once(|_| Ok(image("covers/v2")));
    mocks
        .blogs
        .expect_update()
        .withf(|blog| blog.title.as_ref() == "Final title" && blog.like_count == 2)
        .times(1)
        .return_once(|_| Ok(()));
    mocks
        .images
        .expect_delete()
        .withf(move |img| img.public_id == old_image)
        .times(1)
        .return_once(|_| Ok(()));

    let changes = BlogChanges {
        title: Some(BlogTitle::new("Final title").expect("title")),
        image: Some(png_upload("v2.png")),
        ..BlogChanges::default()
    };
    let view = mocks
        .build()
        .update(&session(&author), &id, changes)
        .await
        .expect("updated");
    assert_eq!(view.image.public_id, "covers/v2");
    assert_eq!(view.category.as_ref(), "Travel");
}

#[tokio::test]
async fn delete_removes_row_then_image() {
    let author = test_fixtures::user(Role::Creator);
    let blog = test_fixtures::blog(&author, "Short lived", 0);
    let id = blog.id;
    let mut mocks = Mocks::new();
    mocks
        .blogs
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(blog)));
    mocks.blogs.expect_delete().times(1).return_once(|_| Ok(true));
    mocks.images.expect_delete().times(1).return_once(|_| Ok(()));

    mocks
        .build()
        .delete(&session(&author), &id)
        .await
        .expect("deleted");
}

#[tokio::test]
async fn get_reports_viewer_state() {
    let author = test_fixtures::user(Role::Creator);
    let viewer = test_fixtures::user(Role::Reader);
    let blog = test_fixtures::blog(&author, "Stateful", 5);
    let id = blog.id;
    let author_copy = author.clone();
    let mut mocks = Mocks::new();
    mocks
        .blogs
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(blog)));
    mocks
        .users
        .expect_find_by_ids()
        .return_once(move |_| Ok(vec![author_copy]));
    mocks.blogs.expect_is_liked().return_once(|_, _| Ok(true));
    mocks.blogs.expect_is_saved().return_once(|_, _| Ok(false));

    let view = mocks
        .build()
        .get(&id, Some(viewer.id))
        .await
        .expect("view");
    assert_eq!(view.liked, Some(true));
    assert_eq!(view.saved, Some(false));
    assert_eq!(view.author.name, author.name);
}

#[tokio::test]
async fn feed_attaches_authors_in_order() {
    let first = test_fixtures::user(Role::Creator);
    let second = test_fixtures::user(Role::Creator);
    let blogs = vec![
        test_fixtures::blog(&second, "Second author", 1),
        test_fixtures::blog(&first, "First author", 0),
    ];
    let users = vec![first.clone(), second.clone()];
    let mut mocks = Mocks::new();
    mocks.blogs.expect_feed().return_once(move |query| {
        Ok(FeedPage::new(blogs, query, 12))
    });
    mocks
        .users
        .expect_find_by_ids()
        .withf(|ids| ids.len() == 2)
        .return_once(move |_| Ok(users));

    let page = mocks
        .build()
        .feed(&FeedQuery::default())
        .await
        .expect("feed");
    assert_eq!(page.total, 12);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items[0].author.id, second.id);
    assert_eq!(page.items[1].author.id, first.id);
}

#[tokio::test]
async fn dashboard_sums_likes_for_creators() {
    let author = test_fixtures::user(Role::Creator);
    let blogs = vec![
        test_fixtures::blog(&author, "One", 2),
        test_fixtures::blog(&author, "Two", 5),
    ];
    let mut mocks = Mocks::new();
    mocks.expect_user(&author);
    mocks
        .blogs
        .expect_authored_by()
        .return_once(move |_| Ok(blogs));

    let dashboard = mocks
        .build()
        .dashboard(&session(&author))
        .await
        .expect("dashboard");
    assert_eq!(dashboard.total_blogs, 2);
    assert_eq!(dashboard.total_likes, 7);
}

#[tokio::test]
async fn dashboard_is_forbidden_for_readers() {
    let reader = test_fixtures::user(Role::Reader);
    let err = Mocks::new()
        .build()
        .dashboard(&session(&reader))
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn toggle_save_reports_new_state() {
    let reader = test_fixtures::user(Role::Reader);
    let author = test_fixtures::user(Role::Creator);
    let blog = test_fixtures::blog(&author, "Bookmark me", 0);
    let id = blog.id;
    let mut mocks = Mocks::new();
    mocks
        .blogs
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(blog)));
    mocks
        .blogs
        .expect_toggle_save()
        .times(1)
        .return_once(|_, _| Ok(true));

    let outcome = mocks
        .build()
        .toggle_save(&session(&reader), &id)
        .await
        .expect("saved");
    assert!(outcome.saved);
}
