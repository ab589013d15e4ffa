//! StoryScape backend library: domain, adapters and HTTP surface.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// OpenAPI document served by Swagger UI.
pub use doc::ApiDoc;
pub use middleware::Trace;
