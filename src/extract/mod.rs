mod session;

pub use session::{MaybeSession, Session};

use aide::OperationIo;
use axum::{
	body::Body,
	extract::{FromRequest, FromRequestParts, Request},
	http::{request, Response},
	response::IntoResponse,
};
use schemars::JsonSchema;
use serde::de;
use validator::Validate;

use crate::error::AppError;

fn validated<T: Validate>(value: T) -> Result<T, AppError> {
	value.validate()?;
	Ok(value)
}

/// A JSON body, validated before the handler sees it. Also used to send JSON.
///
/// ```rust
/// async fn route(Json(group): Json<GroupInput>) -> Json<Group> {
///   // ...
/// }
/// ```
#[derive(OperationIo)]
#[aide(
	input_with = "axum_jsonschema::Json<T>",
	output_with = "axum_jsonschema::Json<T>",
	json_schema
)]
pub struct Json<T>(pub T);

impl<T> IntoResponse for Json<T>
where
	T: serde::Serialize,
{
	fn into_response(self) -> Response<Body> {
		axum::extract::Json(self.0).into_response()
	}
}

#[axum::async_trait]
impl<T, S> FromRequest<S> for Json<T>
where
	T: de::DeserializeOwned + Validate + JsonSchema + 'static,
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let axum_jsonschema::Json(value) = axum_jsonschema::Json::<T>::from_request(req, state).await?;

		validated(value).map(Self)
	}
}

/// A form submission sent as a JSON body. Unlike [`Json`], the input is not
/// validated: form handlers either show the form again with the errors or
/// drop the submission.
///
/// ```rust
/// async fn route(Submission(input): Submission<PostInput>) {
///   if let Err(errors) = input.validate() {
///     // ...
///   }
/// }
/// ```
#[derive(OperationIo)]
#[aide(input_with = "axum_jsonschema::Json<T>", json_schema)]
pub struct Submission<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for Submission<T>
where
	T: de::DeserializeOwned + JsonSchema + 'static,
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let axum_jsonschema::Json(value) = axum_jsonschema::Json::<T>::from_request(req, state).await?;

		Ok(Self(value))
	}
}

/// A validated query string, such as `?page=2`.
#[derive(OperationIo)]
#[aide(input_with = "axum::extract::Query<T>", json_schema)]
pub struct Query<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for Query<T>
where
	T: de::DeserializeOwned + Validate,
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let axum::extract::Query(value) =
			axum::extract::Query::<T>::from_request_parts(parts, state).await?;

		validated(value).map(Self)
	}
}

/// Validated path parameters, such as the `:id` of `/posts/:id`.
#[derive(OperationIo)]
#[aide(input_with = "axum::extract::Path<T>", json_schema)]
pub struct Path<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for Path<T>
where
	T: de::DeserializeOwned + Validate + Send,
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let axum::extract::Path(value) =
			axum::extract::Path::<T>::from_request_parts(parts, state).await?;

		validated(value).map(Self)
	}
}
