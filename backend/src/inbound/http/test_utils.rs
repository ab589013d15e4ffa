//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::test::TestRequest;
use actix_web::{App, HttpResponse, web};

use super::session::SessionContext;
use super::state::{HttpState, HttpStatePorts};
use super::{ApiResult, configure_api};
use crate::domain::ports::{
    MockAccountCommand, MockBlogCommand, MockBlogQuery, MockLoginService, MockUserProfileQuery,
};
use crate::domain::{Role, SessionUser, User, UserId};

/// Session middleware with a throwaway key and the `Secure` flag off so
/// plain-HTTP test requests carry the cookie.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The `session` cookie set by `res`.
///
/// # Panics
///
/// Panics when the response did not set a session cookie.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

const BOUNDARY: &str = "storyscape-test-boundary";

/// One part of a hand-built `multipart/form-data` body.
pub enum FormPart<'a> {
    Text {
        name: &'a str,
        value: &'a str,
    },
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

impl<'a> FormPart<'a> {
    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self::Text { name, value }
    }

    pub fn file(name: &'a str, file_name: &'a str, content_type: &'a str, bytes: &'a [u8]) -> Self {
        Self::File {
            name,
            file_name,
            content_type,
            bytes,
        }
    }
}

/// Attach a multipart body built from `parts` to `req`.
pub fn multipart_request(req: TestRequest, parts: &[FormPart<'_>]) -> TestRequest {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            FormPart::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            FormPart::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    req.insert_header((
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
    ))
    .set_payload(body)
}

/// Smallest byte string the image sniffer accepts as PNG.
pub fn png_bytes() -> Vec<u8> {
    crate::domain::test_fixtures::PNG_BYTES.to_vec()
}

/// Mocked driving ports; set expectations then call [`MockPorts::into_state`].
#[derive(Default)]
pub struct MockPorts {
    pub accounts: MockAccountCommand,
    pub login: MockLoginService,
    pub profiles: MockUserProfileQuery,
    pub blogs: MockBlogCommand,
    pub blog_queries: MockBlogQuery,
}

impl MockPorts {
    pub fn into_state(self) -> HttpState {
        HttpState::new(HttpStatePorts {
            accounts: Arc::new(self.accounts),
            login: Arc::new(self.login),
            profiles: Arc::new(self.profiles),
            blogs: Arc::new(self.blogs),
            blog_queries: Arc::new(self.blog_queries),
        })
    }
}

async fn plant_session(
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (id, role) = path.into_inner();
    session.persist_user(&SessionUser {
        id: UserId::new(id)?,
        role: role.parse::<Role>()?,
    })?;
    Ok(HttpResponse::Ok().finish())
}

/// The API under `/api/v1` plus a `/test/session/{id}/{role}` route that
/// signs a user in without going through the login port.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .route("/test/session/{id}/{role}", web::post().to(plant_session))
        .service(web::scope("/api/v1").configure(configure_api))
}

/// Request to the test route that signs `user` in; read the cookie from
/// its response with [`session_cookie`].
pub fn sign_in_request(user: &User) -> TestRequest {
    TestRequest::post().uri(&format!("/test/session/{}/{}", user.id, user.role))
}
