//! Blog endpoints.
//!
//! ```text
//! GET    /api/v1/blogs?category=travel&sort=popular&page=2&limit=10
//! GET    /api/v1/blogs/categories
//! GET    /api/v1/blogs/dashboard
//! POST   /api/v1/blogs              multipart: title, category, body, image
//! GET    /api/v1/blogs/{id}
//! PUT    /api/v1/blogs/{id}         multipart: title?, category?, body?, image?
//! DELETE /api/v1/blogs/{id}
//! POST   /api/v1/blogs/{id}/like
//! POST   /api/v1/blogs/{id}/save
//! ```

use actix_multipart::Multipart;
use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::ApiResult;
use super::multipart::{FormShape, read_form};
use super::session::SessionContext;
use super::state::HttpState;
use crate::domain::{
    BlogBody, BlogChanges, BlogDraft, BlogId, BlogTitle, BlogView, Category, CategoryCount,
    Dashboard, Error, FeedPage, FeedQuery, FeedSort, LikeOutcome, SaveOutcome, UserId,
};

const CREATE_FORM: FormShape = FormShape {
    text: &["title", "category", "body"],
    files: &["image"],
};

// Same inputs, all optional on edit.
const EDIT_FORM: FormShape = CREATE_FORM;

/// Feed filters and paging.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeedParams {
    /// Case-insensitive category match.
    pub category: Option<String>,
    /// Author user id.
    pub author: Option<String>,
    /// Case-insensitive title substring.
    pub search: Option<String>,
    /// `latest` (default), `oldest` or `popular`.
    pub sort: Option<String>,
    /// 1-based page number.
    pub page: Option<u32>,
    /// Page size, 1 to 50.
    pub limit: Option<u32>,
}

impl TryFrom<FeedParams> for FeedQuery {
    type Error = Error;

    fn try_from(params: FeedParams) -> Result<Self, Self::Error> {
        let present = |value: Option<String>| value.filter(|raw| !raw.trim().is_empty());

        let category = present(params.category).map(Category::new).transpose()?;
        let author = present(params.author)
            .map(|raw| {
                UserId::new(raw).map_err(|_| {
                    Error::invalid_field("author", "invalid_author", "author must be a user id")
                })
            })
            .transpose()?;
        let sort = present(params.sort)
            .map(|raw| raw.parse::<FeedSort>())
            .transpose()?
            .unwrap_or_default();

        FeedQuery::try_new(
            category,
            author,
            params.search.as_deref(),
            sort,
            params.page,
            params.limit,
        )
        .map_err(Error::from)
    }
}

/// Multipart blog form, documented for OpenAPI only.
#[derive(ToSchema)]
#[expect(dead_code, reason = "OpenAPI request body description")]
pub struct BlogForm {
    #[schema(example = "Sourdough at altitude")]
    title: String,
    #[schema(example = "Food & Drink")]
    category: String,
    /// Rich-text HTML body.
    body: String,
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
}

fn blog_id(raw: &str) -> Result<BlogId, Error> {
    BlogId::new(raw).map_err(|_| Error::not_found("blog not found"))
}

/// Paginated public feed.
#[utoipa::path(
    get,
    path = "/api/v1/blogs",
    params(FeedParams),
    responses(
        (status = 200, description = "Feed page", body = FeedPage<BlogView>),
        (status = 400, description = "Invalid filter or paging", body = Error)
    ),
    tags = ["blogs"],
    operation_id = "listBlogs",
    security([])
)]
#[get("/blogs")]
pub async fn feed(
    state: web::Data<HttpState>,
    params: web::Query<FeedParams>,
) -> ApiResult<web::Json<FeedPage<BlogView>>> {
    let query = FeedQuery::try_from(params.into_inner())?;
    let page = state.blog_queries.feed(&query).await?;
    Ok(web::Json(page))
}

/// Categories in use with their post counts.
#[utoipa::path(
    get,
    path = "/api/v1/blogs/categories",
    responses((status = 200, description = "Categories", body = [CategoryCount])),
    tags = ["blogs"],
    operation_id = "listCategories",
    security([])
)]
#[get("/blogs/categories")]
pub async fn categories(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<CategoryCount>>> {
    let counts = state.blog_queries.categories().await?;
    Ok(web::Json(counts))
}

/// The signed-in creator's totals and posts.
#[utoipa::path(
    get,
    path = "/api/v1/blogs/dashboard",
    responses(
        (status = 200, description = "Dashboard", body = Dashboard),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Creators only", body = Error)
    ),
    tags = ["blogs"],
    operation_id = "getDashboard"
)]
#[get("/blogs/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Dashboard>> {
    let actor = session.require_user()?;
    let dashboard = state.blog_queries.dashboard(&actor).await?;
    Ok(web::Json(dashboard))
}

/// Publish a post.
#[utoipa::path(
    post,
    path = "/api/v1/blogs",
    request_body(content = BlogForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Published", body = BlogView),
        (status = 400, description = "Invalid form", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Creators only", body = Error)
    ),
    tags = ["blogs"],
    operation_id = "createBlog"
)]
#[post("/blogs")]
pub async fn create(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user()?;
    let mut form = read_form(payload, &CREATE_FORM, state.max_image_bytes).await?;
    let draft = BlogDraft {
        title: BlogTitle::new(form.require_text("title")?)?,
        category: Category::new(form.require_text("category")?)?,
        body: BlogBody::new(form.require_text("body")?)?,
        image: form.require_image("image")?,
    };

    let view = state.blogs.create(&actor, draft).await?;
    Ok(HttpResponse::Created().json(view))
}

/// One post; signed-in viewers also get `liked` and `saved`.
#[utoipa::path(
    get,
    path = "/api/v1/blogs/{id}",
    params(("id" = String, Path, description = "Blog id")),
    responses(
        (status = 200, description = "Post", body = BlogView),
        (status = 404, description = "No such post", body = Error)
    ),
    tags = ["blogs"],
    operation_id = "getBlog",
    security([])
)]
#[get("/blogs/{id}")]
pub async fn get_blog(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<BlogView>> {
    let id = blog_id(&path)?;
    let viewer = session.session_user()?.map(|user| user.id);
    let view = state.blog_queries.get(&id, viewer).await?;
    Ok(web::Json(view))
}

/// Edit a post; only the sent inputs change.
#[utoipa::path(
    put,
    path = "/api/v1/blogs/{id}",
    params(("id" = String, Path, description = "Blog id")),
    request_body(content = BlogForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated post", body = BlogView),
        (status = 400, description = "Invalid form", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "No such post", body = Error)
    ),
    tags = ["blogs"],
    operation_id = "updateBlog"
)]
#[put("/blogs/{id}")]
pub async fn update(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: Multipart,
) -> ApiResult<web::Json<BlogView>> {
    let actor = session.require_user()?;
    let id = blog_id(&path)?;
    let mut form = read_form(payload, &EDIT_FORM, state.max_image_bytes).await?;
    let changes = BlogChanges {
        title: form.text("title").map(BlogTitle::new).transpose()?,
        category: form.text("category").map(Category::new).transpose()?,
        body: form.text("body").map(BlogBody::new).transpose()?,
        image: form.image("image")?,
    };

    let view = state.blogs.update(&actor, &id, changes).await?;
    Ok(web::Json(view))
}

/// Remove a post and its cover image.
#[utoipa::path(
    delete,
    path = "/api/v1/blogs/{id}",
    params(("id" = String, Path, description = "Blog id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "No such post", body = Error)
    ),
    tags = ["blogs"],
    operation_id = "deleteBlog"
)]
#[delete("/blogs/{id}")]
pub async fn delete_blog(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user()?;
    let id = blog_id(&path)?;
    state.blogs.delete(&actor, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Like or unlike a post.
#[utoipa::path(
    post,
    path = "/api/v1/blogs/{id}/like",
    params(("id" = String, Path, description = "Blog id")),
    responses(
        (status = 200, description = "New like state", body = LikeOutcome),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "No such post", body = Error)
    ),
    tags = ["blogs"],
    operation_id = "toggleLike"
)]
#[post("/blogs/{id}/like")]
pub async fn like(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<LikeOutcome>> {
    let actor = session.require_user()?;
    let id = blog_id(&path)?;
    let outcome = state.blogs.toggle_like(&actor, &id).await?;
    Ok(web::Json(outcome))
}

/// Bookmark or un-bookmark a post.
#[utoipa::path(
    post,
    path = "/api/v1/blogs/{id}/save",
    params(("id" = String, Path, description = "Blog id")),
    responses(
        (status = 200, description = "New bookmark state", body = SaveOutcome),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "No such post", body = Error)
    ),
    tags = ["blogs"],
    operation_id = "toggleSave"
)]
#[post("/blogs/{id}/save")]
pub async fn save(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<SaveOutcome>> {
    let actor = session.require_user()?;
    let id = blog_id(&path)?;
    let outcome = state.blogs.toggle_save(&actor, &id).await?;
    Ok(web::Json(outcome))
}

/// Register the blog routes; literal segments go before `{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(feed)
        .service(categories)
        .service(dashboard)
        .service(create)
        .service(get_blog)
        .service(update)
        .service(delete_blog)
        .service(like)
        .service(save);
}

#[cfg(test)]
#[path = "blogs_tests.rs"]
mod tests;
