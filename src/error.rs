use std::borrow::Cow;

use axum::{
	body::Body,
	extract::rejection,
	http::{Response, StatusCode},
	response::{IntoResponse, Redirect},
	Json,
};
use schemars::JsonSchema;
use serde::Serialize;
use tower_governor::GovernorError;

pub type Map = serde_json::Map<String, serde_json::Value>;

/// A single client-facing error message.
///
/// `content` is the message, or a machine-readable code when there is no
/// message. `field` is set for validation failures of a single input field.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct Message<'a> {
	pub content: Cow<'a, str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'a, str>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Cow<'a, Map>>,
}

impl<'a> Message<'a> {
	pub fn new(content: impl Into<Cow<'a, str>>) -> Self {
		Self {
			content: content.into(),
			field: None,
			details: None,
		}
	}

	pub fn field(mut self, field: impl Into<Cow<'a, str>>) -> Self {
		self.field = Some(field.into());
		self
	}

	pub fn detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
		self.details
			.get_or_insert_with(|| Cow::Owned(Map::new()))
			.to_mut()
			.insert(key.into(), value.into());
		self
	}

	pub fn into_vec(self) -> Vec<Self> {
		vec![self]
	}
}

/// Flattens validation errors into one message per failed rule, ordered by field.
pub fn validation_messages(errors: &validator::ValidationErrors) -> Vec<Message<'static>> {
	let mut fields = errors.field_errors().into_iter().collect::<Vec<_>>();
	fields.sort_by(|a, b| a.0.cmp(&b.0));

	fields
		.into_iter()
		.flat_map(|(field, errors)| {
			let field = field.to_string();

			errors.iter().map(move |error| {
				let content = error
					.message
					.clone()
					.unwrap_or_else(|| error.code.clone());

				Message::new(content.into_owned()).field(field.clone())
			})
		})
		.collect()
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorResponse {
	pub success: bool,
	pub errors: Vec<Message<'static>>,
}

impl ErrorResponse {
	pub fn new(errors: Vec<Message<'static>>) -> Self {
		Self {
			success: false,
			errors,
		}
	}
}

/// Errors shared by every route.
///
/// The Display trait is not sent to the client, so it can show
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("json error")]
	Json(axum_jsonschema::JsonSchemaRejection),
	#[error("query error: {0}")]
	Query(#[from] rejection::QueryRejection),
	#[error("path error: {0}")]
	Path(#[from] rejection::PathRejection),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
	#[error("rate limited")]
	RateLimit(GovernorError),
	#[error("not found")]
	NotFound,
}

impl From<axum_jsonschema::JsonSchemaRejection> for AppError {
	fn from(rejection: axum_jsonschema::JsonSchemaRejection) -> Self {
		Self::Json(rejection)
	}
}

impl From<GovernorError> for AppError {
	fn from(error: GovernorError) -> Self {
		Self::RateLimit(error)
	}
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response<Body> {
		let (status, errors) = match self {
			Self::Validation(errors) => (StatusCode::BAD_REQUEST, validation_messages(&errors)),
			Self::Json(rejection) => return rejection.into_response(),
			Self::Query(rejection) => (
				StatusCode::BAD_REQUEST,
				Message::new(rejection.body_text()).into_vec(),
			),
			Self::Path(rejection) => (
				StatusCode::BAD_REQUEST,
				Message::new(rejection.body_text()).into_vec(),
			),
			Self::RateLimit(..) => (
				StatusCode::TOO_MANY_REQUESTS,
				Message::new("too_many_requests").into_vec(),
			),
			Self::NotFound => (StatusCode::NOT_FOUND, Message::new("not_found").into_vec()),
			Self::Database(error) => {
				tracing::error!(%error, "database error");

				(StatusCode::INTERNAL_SERVER_ERROR, Vec::new())
			}
			Self::Serialization(error) => {
				tracing::error!(%error, "serialization error");

				(StatusCode::INTERNAL_SERVER_ERROR, Vec::new())
			}
		};

		(status, Json(ErrorResponse::new(errors))).into_response()
	}
}

/// The shape of a route-specific error as seen by the client.
pub trait ErrorShape: std::fmt::Debug {
	fn status(&self) -> StatusCode;

	fn into_errors(self) -> Vec<Message<'static>>;

	/// When set, the error is answered with a `303 See Other` to this location
	/// instead of an error body.
	fn redirect(&self) -> Option<String> {
		None
	}
}

/// An error returned from a route: either one of the route module's own
/// errors, or one shared by the whole application.
#[derive(Debug)]
pub enum RouteError<T> {
	App(AppError),
	Route(T),
}

impl<T: ErrorShape> From<T> for RouteError<T> {
	fn from(error: T) -> Self {
		Self::Route(error)
	}
}

impl<T> From<AppError> for RouteError<T> {
	fn from(error: AppError) -> Self {
		Self::App(error)
	}
}

impl<T> From<sqlx::Error> for RouteError<T> {
	fn from(error: sqlx::Error) -> Self {
		Self::App(AppError::Database(error))
	}
}

impl<T> From<validator::ValidationErrors> for RouteError<T> {
	fn from(errors: validator::ValidationErrors) -> Self {
		Self::App(AppError::Validation(errors))
	}
}

impl<T: ErrorShape> IntoResponse for RouteError<T> {
	fn into_response(self) -> Response<Body> {
		match self {
			Self::App(error) => error.into_response(),
			Self::Route(error) => {
				if let Some(location) = error.redirect() {
					return Redirect::to(&location).into_response();
				}

				let status = error.status();

				if status.is_server_error() {
					tracing::error!(?error, "route error");
				}

				(status, Json(ErrorResponse::new(error.into_errors()))).into_response()
			}
		}
	}
}

impl<T> aide::OperationOutput for RouteError<T> {
	type Inner = ErrorResponse;
}
