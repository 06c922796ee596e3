use std::marker::PhantomData;

use aide::{
	gen::GenContext,
	openapi::{Operation, Response as ApiResponse},
	OperationOutput,
};
use axum::{
	body::{Body, Bytes},
	http::{header, Response, StatusCode},
	response::{IntoResponse, Redirect},
};
use schemars::JsonSchema;
use serde::Serialize;

use crate::extract::Json;

/// A `303 See Other` redirect to a local path.
#[derive(Debug)]
pub struct SeeOther(pub String);

impl SeeOther {
	pub fn to(location: impl Into<String>) -> Self {
		Self(location.into())
	}
}

impl IntoResponse for SeeOther {
	fn into_response(self) -> Response<Body> {
		Redirect::to(&self.0).into_response()
	}
}

impl OperationOutput for SeeOther {
	type Inner = ();

	fn inferred_responses(
		_ctx: &mut GenContext,
		_operation: &mut Operation,
	) -> Vec<(Option<u16>, ApiResponse)> {
		vec![(
			Some(303),
			ApiResponse {
				description: "Redirect to the resulting page.".into(),
				..Default::default()
			},
		)]
	}
}

/// Either a redirect after a successful submission, or a rendered view
/// (an input form, possibly with errors) with the given status.
#[derive(Debug)]
pub enum Outcome<T> {
	Redirect(SeeOther),
	Render(StatusCode, T),
}

impl<T> Outcome<T> {
	pub fn redirect(location: impl Into<String>) -> Self {
		Self::Redirect(SeeOther::to(location))
	}

	pub fn render(view: T) -> Self {
		Self::Render(StatusCode::OK, view)
	}

	pub fn invalid(view: T) -> Self {
		Self::Render(StatusCode::BAD_REQUEST, view)
	}
}

impl<T: Serialize> IntoResponse for Outcome<T> {
	fn into_response(self) -> Response<Body> {
		match self {
			Self::Redirect(redirect) => redirect.into_response(),
			Self::Render(status, view) => (status, Json(view)).into_response(),
		}
	}
}

impl<T: JsonSchema> OperationOutput for Outcome<T> {
	type Inner = T;

	fn operation_response(ctx: &mut GenContext, operation: &mut Operation) -> Option<ApiResponse> {
		Json::<T>::operation_response(ctx, operation)
	}

	fn inferred_responses(
		ctx: &mut GenContext,
		operation: &mut Operation,
	) -> Vec<(Option<u16>, ApiResponse)> {
		let mut responses = Json::<T>::inferred_responses(ctx, operation);
		responses.extend(SeeOther::inferred_responses(ctx, operation));
		responses
	}
}

/// A JSON body that was serialized ahead of time, typically taken from a
/// [`crate::cache::PageCache`]. `T` only documents the shape of the body.
pub struct CachedJson<T> {
	body: Bytes,
	_shape: PhantomData<fn() -> T>,
}

impl<T: Serialize> CachedJson<T> {
	pub fn from_bytes(body: Bytes) -> Self {
		Self {
			body,
			_shape: PhantomData,
		}
	}

	pub fn serialize(value: &T) -> Result<Self, serde_json::Error> {
		Ok(Self::from_bytes(Bytes::from(serde_json::to_vec(value)?)))
	}

	pub fn bytes(&self) -> Bytes {
		self.body.clone()
	}
}

impl<T> IntoResponse for CachedJson<T> {
	fn into_response(self) -> Response<Body> {
		(
			[(header::CONTENT_TYPE, "application/json")],
			self.body,
		)
			.into_response()
	}
}

impl<T: JsonSchema> OperationOutput for CachedJson<T> {
	type Inner = T;

	fn operation_response(ctx: &mut GenContext, operation: &mut Operation) -> Option<ApiResponse> {
		Json::<T>::operation_response(ctx, operation)
	}

	fn inferred_responses(
		ctx: &mut GenContext,
		operation: &mut Operation,
	) -> Vec<(Option<u16>, ApiResponse)> {
		Json::<T>::inferred_responses(ctx, operation)
	}
}
