use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown group {0}")]
	UnknownGroup(String),
	#[error("slug {0} already taken")]
	SlugTaken(String),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/group", post_with(create_group, create_group_docs))
		.api_route("/group/:slug", get_with(get_group, get_group_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownGroup(..) => StatusCode::NOT_FOUND,
			Self::SlugTaken(..) => StatusCode::CONFLICT,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		match self {
			Self::UnknownGroup(slug) => error::Message::new("unknown_group")
				.detail("slug", slug)
				.into_vec(),
			Self::SlugTaken(slug) => error::Message::new("slug_taken")
				.field("slug")
				.detail("slug", slug)
				.into_vec(),
		}
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[sqlx::test]
	async fn test_group_lists_its_posts(pool: Database) {
		let state = state(pool);
		let leo = signed_in(&state, "leo").await;

		let response = leo
			.post("/group")
			.json(&json!({
				"title": "g1",
				"slug": "g1",
				"description": "The first group",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let group = response.json::<serde_json::Value>()["id"]
			.as_str()
			.unwrap()
			.parse::<uuid::Uuid>()
			.unwrap();

		let post = create_post(&state, "leo", "P1", Some(group)).await;
		create_post(&state, "leo", "Not in a group", None).await;

		let page = app(state)
			.get("/group/g1")
			.await
			.json::<serde_json::Value>();

		assert_eq!(page["group"]["slug"], "g1");
		assert_eq!(page["group"]["description"], "The first group");
		assert_eq!(page["page"]["count"], 1);
		assert_eq!(page["page"]["items"][0]["id"], post.to_string());
		assert_eq!(page["page"]["items"][0]["text"], "P1");
	}

	#[sqlx::test]
	async fn test_group_pages_clamp(pool: Database) {
		let state = state(pool);
		let group = create_group(&state, "g1").await;

		for i in 0..12 {
			create_post(&state, "leo", &format!("Post {i}"), Some(group)).await;
		}

		let page = app(state)
			.get("/group/g1")
			.add_query_param("page", 40)
			.await
			.json::<serde_json::Value>();

		assert_eq!(page["page"]["number"], 2);
		assert_eq!(page["page"]["items"].as_array().unwrap().len(), 2);
	}

	#[sqlx::test]
	async fn test_unknown_group_is_not_found(pool: Database) {
		let response = app(state(pool)).get("/group/missing").await;

		assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
	}

	#[sqlx::test]
	async fn test_slug_taken(pool: Database) {
		let state = state(pool);
		let leo = signed_in(&state, "leo").await;
		create_group(&state, "g1").await;

		let response = leo
			.post("/group")
			.json(&json!({
				"title": "Another",
				"slug": "g1",
				"description": "Same slug",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::CONFLICT);
	}
}
