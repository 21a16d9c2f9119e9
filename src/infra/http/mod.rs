//! HTTP surface: the upload form, the conversion endpoint and a health probe.

mod handlers;
mod middleware;
mod multipart;
mod response;

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit, middleware as axum_middleware, routing::get};

use crate::application::export::ExportService;

pub use middleware::{REQUEST_ID_HEADER, RequestContext};
pub use response::build_download_response;

#[derive(Clone)]
pub struct HttpState {
    pub export: Arc<ExportService>,
    pub upload_limit_bytes: u64,
}

impl HttpState {
    pub fn new(export: Arc<ExportService>, upload_limit_bytes: u64) -> Self {
        Self {
            export,
            upload_limit_bytes,
        }
    }

    fn upload_limit_mib(&self) -> u64 {
        self.upload_limit_bytes.div_ceil(1_048_576)
    }
}

pub fn build_router(state: HttpState) -> Router {
    let body_limit = usize::try_from(state.upload_limit_bytes).unwrap_or(usize::MAX);

    Router::new()
        .route("/", get(handlers::index).post(handlers::convert))
        .route("/_health", get(handlers::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}
