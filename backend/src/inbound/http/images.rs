//! Delivery of images kept by the in-process image store.
//!
//! ```text
//! GET /api/v1/images/{public_id}
//! ```
//!
//! When an external image host is configured, image URLs point there and
//! this route always answers 404.

use actix_web::{HttpResponse, get, http::header, web};

use super::ApiResult;
use super::state::HttpState;
use crate::domain::Error;
use crate::domain::ports::ImageStoreError;

fn unavailable(error: ImageStoreError) -> Error {
    Error::service_unavailable(error.to_string())
}

/// Raw bytes of an uploaded photo or cover image.
#[utoipa::path(
    get,
    path = "/api/v1/images/{public_id}",
    params(("public_id" = String, Path, description = "Image id from an `ImageRef`")),
    responses(
        (status = 200, description = "Image bytes", body = [u8], content_type = "image/*"),
        (status = 404, description = "No such image", body = Error)
    ),
    tags = ["images"],
    operation_id = "getImage",
    security([])
)]
#[get("/images/{public_id}")]
pub async fn image(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let not_found = || Error::not_found("image not found");
    let source = state.image_source.as_ref().ok_or_else(not_found)?;
    let stored = source
        .fetch(&path)
        .await
        .map_err(unavailable)?
        .ok_or_else(not_found)?;

    Ok(HttpResponse::Ok()
        .content_type(stored.format.content_type())
        .insert_header((header::CACHE_CONTROL, "public, max-age=31536000, immutable"))
        .body(stored.bytes))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(image);
}
