use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown post {0}")]
	UnknownPost(String),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/", get_with(get_posts, get_posts_docs))
		.api_route(
			"/create",
			get_with(new_post, new_post_docs).post_with(create_post, create_post_docs),
		)
		.api_route("/posts/:id", get_with(get_post, get_post_docs))
		.api_route(
			"/posts/:id/edit",
			get_with(edit_post, edit_post_docs).post_with(update_post, update_post_docs),
		)
		.api_route("/posts/:id/comment", post_with(add_comment, add_comment_docs))
}

/// Path of a post's detail page.
pub fn post_url(id: Uuid) -> String {
	format!("/posts/{id}/")
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) => StatusCode::NOT_FOUND,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		match self {
			Self::UnknownPost(post) => error::Message::new("unknown_post")
				.detail("post", post)
				.into_vec(),
		}
	}
}
