use std::sync::Arc;

use aide::{
	axum::{
		routing::{get, get_with},
		ApiRouter, IntoApiResponse,
	},
	openapi::OpenApi,
	scalar::Scalar,
};
use axum::{response::IntoResponse, Extension};

use crate::extract::Json;

pub const DOCUMENT_PATH: &str = "/docs/private/api.json";

/// The interactive API reference and the raw `OpenAPI` document behind it.
pub fn routes() -> ApiRouter {
	ApiRouter::new()
		.api_route(
			"/",
			get_with(
				Scalar::new(DOCUMENT_PATH).with_title("Yatube").axum_handler(),
				|op| op.description("This documentation page."),
			),
		)
		.route("/private/api.json", get(serve_docs))
}

async fn serve_docs(Extension(api): Extension<Arc<OpenApi>>) -> impl IntoApiResponse {
	Json(api.as_ref()).into_response()
}
