//! OpenAPI document for the REST API.
//!
//! Paths come from the `#[utoipa::path]` annotations on the handlers; schemas
//! are derived directly on the domain types. Swagger UI serves the document
//! in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    AuthorProfile, AuthorSummary, BlogView, CategoryCount, Dashboard, Error, ErrorCode, FeedSort,
    ImageRef, LikeOutcome, Role, SaveOutcome, User,
};
use crate::inbound::http::blogs::BlogForm;
use crate::inbound::http::users::{LoginRequest, ProfileForm, RegisterForm};

struct SessionCookieAddon;

impl Modify for SessionCookieAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);
        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Encrypted session cookie set by register and login.",
            ))),
        );
    }
}

/// OpenAPI description of the StoryScape backend.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SessionCookieAddon),
    info(
        title = "StoryScape API",
        description = "Accounts, blog posts, likes and bookmarks for the StoryScape SPA."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::me,
        crate::inbound::http::users::update_me,
        crate::inbound::http::users::saved,
        crate::inbound::http::users::authors,
        crate::inbound::http::users::author,
        crate::inbound::http::blogs::feed,
        crate::inbound::http::blogs::categories,
        crate::inbound::http::blogs::dashboard,
        crate::inbound::http::blogs::create,
        crate::inbound::http::blogs::get_blog,
        crate::inbound::http::blogs::update,
        crate::inbound::http::blogs::delete_blog,
        crate::inbound::http::blogs::like,
        crate::inbound::http::blogs::save,
        crate::inbound::http::images::image,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        User,
        Role,
        ImageRef,
        AuthorSummary,
        AuthorProfile,
        BlogView,
        CategoryCount,
        Dashboard,
        LikeOutcome,
        SaveOutcome,
        FeedSort,
        Error,
        ErrorCode,
        LoginRequest,
        RegisterForm,
        ProfileForm,
        BlogForm,
    )),
    tags(
        (name = "users", description = "Registration, sessions and profiles"),
        (name = "blogs", description = "Posts, feed, likes and bookmarks"),
        (name = "images", description = "Uploads kept by the in-process image store"),
        (name = "health", description = "Readiness and liveness checks")
    )
)]
pub struct ApiDoc;
