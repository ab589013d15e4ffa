//! PostgreSQL-backed `BlogRepository` implementation using Diesel ORM.
//!
//! Likes and bookmarks live in join tables keyed by `(blog, user)`. The
//! denormalised `blogs.like_count` is only ever changed inside the same
//! transaction that inserts or deletes a `blog_likes` row.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use tracing::warn;

use crate::domain::ports::{BlogRepository, BlogRepositoryError};
use crate::domain::{
    Blog, BlogBody, BlogId, BlogTitle, BlogValidationError, Category, CategoryCount, FeedPage,
    FeedQuery, FeedSort, ImageRef, LikeOutcome, UserId,
};

use super::error_mapping::{DbFailure, classify_diesel_error, classify_pool_error, escape_like};
use super::models::{BlogContentUpdate, BlogRow, NewBlogLikeRow, NewBlogRow, NewSavedBlogRow};
use super::pool::{DbPool, PoolError};
use super::schema::{blog_likes, blogs, saved_blogs};

diesel::define_sql_function! {
    /// SQL `lower()` for case-insensitive category matching.
    fn lower(x: diesel::sql_types::Text) -> diesel::sql_types::Text;
}

/// Diesel-backed implementation of the `BlogRepository` port.
#[derive(Clone)]
pub struct DieselBlogRepository {
    pool: DbPool,
}

impl DieselBlogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn into_port_error(failure: DbFailure) -> BlogRepositoryError {
    match failure {
        DbFailure::Connection(message) => BlogRepositoryError::connection(message),
        DbFailure::UniqueViolation { constraint } => BlogRepositoryError::query(format!(
            "unique constraint violated: {}",
            constraint.as_deref().unwrap_or("unknown")
        )),
        DbFailure::Query(message) => BlogRepositoryError::query(message),
    }
}

fn map_pool_error(error: PoolError) -> BlogRepositoryError {
    into_port_error(classify_pool_error(error))
}

fn map_diesel_error(error: diesel::result::Error) -> BlogRepositoryError {
    into_port_error(classify_diesel_error(error))
}

fn count_to_u64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

fn row_to_blog(row: BlogRow) -> Result<Blog, BlogRepositoryError> {
    let corrupt = |err: BlogValidationError| {
        warn!(blog_id = %row.id, %err, "stored blog row failed validation");
        BlogRepositoryError::query(format!("invalid stored blog: {err}"))
    };
    Ok(Blog {
        id: BlogId::from_uuid(row.id),
        title: BlogTitle::new(row.title.as_str()).map_err(corrupt)?,
        category: Category::new(row.category.as_str()).map_err(corrupt)?,
        body: BlogBody::new(row.body.as_str()).map_err(corrupt)?,
        author: UserId::from_uuid(row.author_id),
        image: ImageRef::new(row.image_public_id.as_str(), row.image_url.as_str()),
        like_count: count_to_u64(row.like_count),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn rows_to_blogs(rows: Vec<BlogRow>) -> Result<Vec<Blog>, BlogRepositoryError> {
    rows.into_iter().map(row_to_blog).collect()
}

/// Blogs passing the feed filters, unordered and unpaginated.
fn filtered(query: &FeedQuery) -> blogs::BoxedQuery<'static, Pg> {
    let mut statement = blogs::table.into_boxed();
    if let Some(category) = query.category() {
        statement = statement.filter(lower(blogs::category).eq(category.key()));
    }
    if let Some(author) = query.author() {
        statement = statement.filter(blogs::author_id.eq(*author.as_uuid()));
    }
    if let Some(term) = query.search() {
        statement = statement.filter(blogs::title.ilike(format!("%{}%", escape_like(term))));
    }
    statement
}

fn ordered(
    statement: blogs::BoxedQuery<'static, Pg>,
    sort: FeedSort,
) -> blogs::BoxedQuery<'static, Pg> {
    match sort {
        FeedSort::Latest => statement
            .order_by(blogs::created_at.desc())
            .then_order_by(blogs::id.desc()),
        FeedSort::Oldest => statement
            .order_by(blogs::created_at.asc())
            .then_order_by(blogs::id.asc()),
        FeedSort::Popular => statement
            .order_by(blogs::like_count.desc())
            .then_order_by(blogs::created_at.desc())
            .then_order_by(blogs::id.desc()),
    }
}

/// Sort grouped counts largest first, then alphabetically.
fn rank_categories(rows: Vec<(Option<String>, i64)>) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = rows
        .into_iter()
        .filter_map(|(category, count)| {
            category.map(|category| CategoryCount {
                category,
                count: count_to_u64(count),
            })
        })
        .collect();
    counts.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.category.to_lowercase().cmp(&b.category.to_lowercase()))
    });
    counts
}

#[async_trait]
impl BlogRepository for DieselBlogRepository {
    async fn insert(&self, blog: &Blog) -> Result<(), BlogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewBlogRow {
            id: *blog.id.as_uuid(),
            author_id: *blog.author.as_uuid(),
            title: blog.title.as_ref(),
            category: blog.category.as_ref(),
            body: blog.body.as_ref(),
            image_public_id: blog.image.public_id.as_str(),
            image_url: blog.image.url.as_str(),
            like_count: i64::try_from(blog.like_count).unwrap_or(i64::MAX),
            created_at: blog.created_at,
            updated_at: blog.updated_at,
        };
        diesel::insert_into(blogs::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, blog: &Blog) -> Result<(), BlogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = BlogContentUpdate {
            title: blog.title.as_ref(),
            category: blog.category.as_ref(),
            body: blog.body.as_ref(),
            image_public_id: blog.image.public_id.as_str(),
            image_url: blog.image.url.as_str(),
            updated_at: blog.updated_at,
        };
        let updated = diesel::update(blogs::table.find(blog.id.as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(BlogRepositoryError::query("blog not found for update"));
        }
        Ok(())
    }

    async fn delete(&self, id: &BlogId) -> Result<bool, BlogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        // Likes and bookmarks cascade with the row.
        let removed = diesel::delete(blogs::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn find_by_id(&self, id: &BlogId) -> Result<Option<Blog>, BlogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<BlogRow> = blogs::table
            .find(id.as_uuid())
            .select(BlogRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_blog).transpose()
    }

    async fn feed(&self, query: &FeedQuery) -> Result<FeedPage<Blog>, BlogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = filtered(query)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let offset = i64::try_from(query.offset()).unwrap_or(i64::MAX);
        let rows: Vec<BlogRow> = ordered(filtered(query), query.sort())
            .limit(i64::from(query.limit()))
            .offset(offset)
            .select(BlogRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(FeedPage::new(rows_to_blogs(rows)?, query, count_to_u64(total)))
    }

    async fn toggle_like(
        &self,
        blog: &BlogId,
        user: &UserId,
    ) -> Result<LikeOutcome, BlogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let blog_id = *blog.as_uuid();
        let user_id = *user.as_uuid();
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                let removed = diesel::delete(blog_likes::table.find((blog_id, user_id)))
                    .execute(conn)
                    .await?;
                let (liked, delta) = if removed > 0 {
                    (false, -1_i64)
                } else {
                    let inserted = diesel::insert_into(blog_likes::table)
                        .values(NewBlogLikeRow { blog_id, user_id })
                        .on_conflict_do_nothing()
                        .execute(conn)
                        .await?;
                    (true, i64::from(inserted > 0))
                };
                let likes: i64 = diesel::update(blogs::table.find(blog_id))
                    .set(blogs::like_count.eq(blogs::like_count + delta))
                    .returning(blogs::like_count)
                    .get_result(conn)
                    .await?;
                Ok(LikeOutcome {
                    liked,
                    likes: count_to_u64(likes),
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn is_liked(&self, blog: &BlogId, user: &UserId) -> Result<bool, BlogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            blog_likes::table.find((*blog.as_uuid(), *user.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn toggle_save(&self, user: &UserId, blog: &BlogId) -> Result<bool, BlogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_id = *user.as_uuid();
        let blog_id = *blog.as_uuid();
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                let removed = diesel::delete(saved_blogs::table.find((user_id, blog_id)))
                    .execute(conn)
                    .await?;
                if removed > 0 {
                    return Ok(false);
                }
                diesel::insert_into(saved_blogs::table)
                    .values(NewSavedBlogRow { user_id, blog_id })
                    .on_conflict_do_nothing()
                    .execute(conn)
                    .await?;
                Ok(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn is_saved(&self, user: &UserId, blog: &BlogId) -> Result<bool, BlogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            saved_blogs::table.find((*user.as_uuid(), *blog.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn saved_by(&self, user: &UserId) -> Result<Vec<Blog>, BlogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BlogRow> = saved_blogs::table
            .inner_join(blogs::table)
            .filter(saved_blogs::user_id.eq(*user.as_uuid()))
            .order_by(saved_blogs::created_at.desc())
            .select(BlogRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_blogs(rows)
    }

    async fn authored_by(&self, user: &UserId) -> Result<Vec<Blog>, BlogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BlogRow> = blogs::table
            .filter(blogs::author_id.eq(*user.as_uuid()))
            .order_by(blogs::created_at.desc())
            .then_order_by(blogs::id.desc())
            .select(BlogRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_blogs(rows)
    }

    async fn categories(&self) -> Result<Vec<CategoryCount>, BlogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(Option<String>, i64)> = blogs::table
            .group_by(lower(blogs::category))
            .select((diesel::dsl::min(blogs::category), diesel::dsl::count_star()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rank_categories(rows))
    }
}
