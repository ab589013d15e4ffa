//! Account endpoints.
//!
//! ```text
//! POST /api/v1/users/register   multipart: name, email, phone, password, role, photo
//! POST /api/v1/users/login      {"email":"ada@example.com","password":"...","role":"creator"}
//! POST /api/v1/users/logout
//! GET  /api/v1/users/me
//! PUT  /api/v1/users/me         multipart: name?, phone?, about?, photo?
//! GET  /api/v1/users/me/saved
//! GET  /api/v1/users/authors
//! GET  /api/v1/users/{id}
//! ```

use actix_multipart::Multipart;
use actix_web::{HttpResponse, get, post, put, web};
use serde::Deserialize;
use utoipa::ToSchema;

use super::ApiResult;
use super::multipart::{FormShape, read_form};
use super::session::SessionContext;
use super::state::HttpState;
use crate::domain::{
    About, AuthorProfile, AuthorSummary, BlogView, Email, Error, LoginCredentials, Password,
    Phone, ProfileUpdate, RegistrationDraft, Role, SessionUser, User, UserId, UserName,
};

const REGISTER_FORM: FormShape = FormShape {
    text: &["name", "email", "phone", "password", "role"],
    files: &["photo"],
};

const PROFILE_FORM: FormShape = FormShape {
    text: &["name", "phone", "about"],
    files: &["photo"],
};

/// Login request body.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub password: String,
    /// Portal the user is signing in to; must match the account role.
    #[schema(example = "creator")]
    pub role: Option<String>,
}

/// Multipart registration form, documented for OpenAPI only.
#[derive(ToSchema)]
#[expect(dead_code, reason = "OpenAPI request body description")]
pub struct RegisterForm {
    name: String,
    email: String,
    phone: String,
    #[schema(format = Password)]
    password: String,
    role: Role,
    #[schema(value_type = String, format = Binary)]
    photo: Vec<u8>,
}

/// Multipart profile edit form, documented for OpenAPI only.
#[derive(ToSchema)]
#[expect(dead_code, reason = "OpenAPI request body description")]
pub struct ProfileForm {
    name: Option<String>,
    phone: Option<String>,
    /// Empty string clears the bio.
    about: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    photo: Option<Vec<u8>>,
}

fn session_user(user: &User) -> SessionUser {
    SessionUser {
        id: user.id,
        role: user.role,
    }
}

/// Create an account and sign it in.
#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    request_body(content = RegisterForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Account created", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid form or duplicate email/phone", body = Error),
        (status = 503, description = "Database or image host unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/users/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let mut form = read_form(payload, &REGISTER_FORM, state.max_image_bytes).await?;
    let draft = RegistrationDraft {
        name: UserName::new(form.require_text("name")?)?,
        email: Email::new(form.require_text("email")?)?,
        phone: Phone::new(form.require_text("phone")?)?,
        password: Password::new(form.require_text("password")?)?,
        role: form.require_text("role")?.parse::<Role>()?,
        photo: form.require_image("photo")?,
    };

    let user = state.accounts.register(draft).await?;
    session.persist_user(&session_user(&user))?;
    Ok(HttpResponse::Created().json(user))
}

/// Check credentials and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request or role mismatch", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/users/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&request.email, &request.password, request.role.as_deref())?;
    let user = state.login.authenticate(&credentials).await?;
    session.persist_user(&session_user(&user))?;
    Ok(HttpResponse::Ok().json(user))
}

/// Forget the session.
#[utoipa::path(
    post,
    path = "/api/v1/users/logout",
    responses((status = 204, description = "Signed out")),
    tags = ["users"],
    operation_id = "logout",
    security([])
)]
#[post("/users/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// The signed-in user's full profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Profile", body = User),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Account no longer exists", body = Error)
    ),
    tags = ["users"],
    operation_id = "getMe"
)]
#[get("/users/me")]
pub async fn me(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<User>> {
    let actor = session.require_user()?;
    let user = state.profiles.me(&actor.id).await?;
    Ok(web::Json(user))
}

/// Edit the signed-in user's profile.
#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    request_body(content = ProfileForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated profile", body = User),
        (status = 400, description = "Invalid form or duplicate phone", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateMe"
)]
#[put("/users/me")]
pub async fn update_me(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: Multipart,
) -> ApiResult<web::Json<User>> {
    let actor = session.require_user()?;
    let mut form = read_form(payload, &PROFILE_FORM, state.max_image_bytes).await?;
    let update = ProfileUpdate {
        name: form.text("name").map(UserName::new).transpose()?,
        phone: form.text("phone").map(Phone::new).transpose()?,
        about: form.text("about").map(About::new).transpose()?,
        photo: form.image("photo")?,
    };

    let user = state.accounts.update_profile(&actor.id, update).await?;
    Ok(web::Json(user))
}

/// Posts the signed-in user bookmarked, newest bookmark first.
#[utoipa::path(
    get,
    path = "/api/v1/users/me/saved",
    responses(
        (status = 200, description = "Saved posts", body = [BlogView]),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["users"],
    operation_id = "listSaved"
)]
#[get("/users/me/saved")]
pub async fn saved(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<BlogView>>> {
    let actor = session.require_user()?;
    let blogs = state.blog_queries.saved(&actor.id).await?;
    Ok(web::Json(blogs))
}

/// Every creator account.
#[utoipa::path(
    get,
    path = "/api/v1/users/authors",
    responses((status = 200, description = "Authors", body = [AuthorSummary])),
    tags = ["users"],
    operation_id = "listAuthors",
    security([])
)]
#[get("/users/authors")]
pub async fn authors(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<AuthorSummary>>> {
    let authors = state.profiles.authors().await?;
    Ok(web::Json(authors))
}

/// Public author page.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Author profile", body = AuthorProfile),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["users"],
    operation_id = "getAuthor",
    security([])
)]
#[get("/users/{id}")]
pub async fn author(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<AuthorProfile>> {
    let id = UserId::new(path.as_str()).map_err(|_| Error::not_found("user not found"))?;
    let profile = state.profiles.author_profile(&id).await?;
    Ok(web::Json(profile))
}

/// Register the account routes; literal segments go before `{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(logout)
        .service(me)
        .service(update_me)
        .service(saved)
        .service(authors)
        .service(author);
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
