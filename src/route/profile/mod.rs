use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown user {0}")]
	UnknownUser(String),
	#[error("not following {0}")]
	NotFollowing(String),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/follow", get_with(get_feed, get_feed_docs))
		.api_route("/profile/:username", get_with(get_profile, get_profile_docs))
		.api_route(
			"/profile/:username/follow",
			get_with(follow, follow_docs).post_with(follow, follow_docs),
		)
		.api_route(
			"/profile/:username/unfollow",
			get_with(unfollow, unfollow_docs).post_with(unfollow, unfollow_docs),
		)
}

/// Path of a user's profile page.
pub fn profile_url(username: &str) -> String {
	format!("/profile/{}/", urlencoding::encode(username))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownUser(..) | Self::NotFollowing(..) => StatusCode::NOT_FOUND,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		match self {
			Self::UnknownUser(username) => error::Message::new("unknown_user")
				.detail("username", username)
				.into_vec(),
			Self::NotFollowing(username) => error::Message::new("not_following")
				.detail("username", username)
				.into_vec(),
		}
	}
}

#[cfg(test)]
mod test {
	use crate::{paginate::PAGE_SIZE, test::*};

	async fn follow_count(state: &AppState) -> i64 {
		sqlx::query_scalar("SELECT COUNT(*) FROM follow")
			.fetch_one(&state.database)
			.await
			.unwrap()
	}

	#[sqlx::test]
	async fn test_profile_lists_author_posts(pool: Database) {
		let state = state(pool);

		for i in 0..12 {
			create_post(&state, "leo", &format!("Post {i}"), None).await;
		}
		create_post(&state, "fyodor", "Someone else's", None).await;

		let page = app(state)
			.get("/profile/leo")
			.await
			.json::<serde_json::Value>();

		assert_eq!(page["author"]["username"], "leo");
		assert!(page["author"].get("email").is_none());
		assert!(page["author"].get("password").is_none());
		assert_eq!(page["post_count"], 12);
		assert_eq!(page["following"], false);
		assert_eq!(
			page["page"]["items"].as_array().unwrap().len(),
			PAGE_SIZE as usize
		);
		assert_eq!(page["page"]["items"][0]["text"], "Post 11");
	}

	#[sqlx::test]
	async fn test_unknown_profile_is_not_found(pool: Database) {
		let response = app(state(pool)).get("/profile/nobody").await;

		assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
	}

	#[sqlx::test]
	async fn test_follow_twice_creates_one_edge(pool: Database) {
		let state = state(pool);
		let leo = signed_in(&state, "leo").await;
		signed_in(&state, "fyodor").await;

		for _ in 0..2 {
			let response = leo.post("/profile/fyodor/follow").await;

			assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
			assert_eq!(response.header("location"), "/profile/fyodor/");
		}

		// Links to follow are plain GETs as well
		leo.get("/profile/fyodor/follow").await;

		assert_eq!(follow_count(&state).await, 1);

		let page = leo.get("/profile/fyodor").await.json::<serde_json::Value>();

		assert_eq!(page["following"], true);
	}

	#[sqlx::test]
	async fn test_concurrent_follows_create_one_edge(pool: Database) {
		let state = state(pool);
		let leo = signed_in(&state, "leo").await;
		signed_in(&state, "fyodor").await;

		let (a, b) = tokio::join!(
			async { leo.post("/profile/fyodor/follow").await },
			async { leo.post("/profile/fyodor/follow").await },
		);

		assert_eq!(a.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(b.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(follow_count(&state).await, 1);
	}

	#[sqlx::test]
	async fn test_self_follow_creates_no_edge(pool: Database) {
		let state = state(pool);
		let leo = signed_in(&state, "leo").await;

		for _ in 0..3 {
			let response = leo.post("/profile/leo/follow").await;

			assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
			assert_eq!(response.header("location"), "/profile/leo/");
		}

		assert_eq!(follow_count(&state).await, 0);
	}

	#[sqlx::test]
	async fn test_follow_unknown_user(pool: Database) {
		let state = state(pool);
		let leo = signed_in(&state, "leo").await;

		let response = leo.post("/profile/nobody/follow").await;

		assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
	}

	#[sqlx::test]
	async fn test_follow_requires_login(pool: Database) {
		let state = state(pool);
		signed_in(&state, "fyodor").await;

		let response = app(state.clone()).post("/profile/fyodor/follow").await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(
			response.header("location"),
			"/auth/login?next=%2Fprofile%2Ffyodor%2Ffollow"
		);
		assert_eq!(follow_count(&state).await, 0);
	}

	#[sqlx::test]
	async fn test_unfollow(pool: Database) {
		let state = state(pool);
		let leo = signed_in(&state, "leo").await;
		signed_in(&state, "fyodor").await;

		leo.post("/profile/fyodor/follow").await;

		let response = leo.post("/profile/fyodor/unfollow").await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(response.header("location"), "/profile/fyodor/");
		assert_eq!(follow_count(&state).await, 0);
	}

	#[sqlx::test]
	async fn test_unfollow_without_edge_is_not_found(pool: Database) {
		let state = state(pool);
		let leo = signed_in(&state, "leo").await;
		signed_in(&state, "fyodor").await;
		signed_in(&state, "anton").await;

		leo.post("/profile/anton/follow").await;

		let response = leo.post("/profile/fyodor/unfollow").await;

		assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
		assert_eq!(follow_count(&state).await, 1);
	}

	#[sqlx::test]
	async fn test_feed_shows_followed_authors(pool: Database) {
		let state = state(pool);
		let leo = signed_in(&state, "leo").await;
		signed_in(&state, "fyodor").await;
		let anton = signed_in(&state, "anton").await;

		leo.post("/profile/fyodor/follow").await;

		let post = create_post(&state, "fyodor", "P2", None).await;
		create_post(&state, "anton", "Not followed", None).await;

		let feed = leo.get("/follow").await.json::<serde_json::Value>();

		assert_eq!(feed["count"], 1);
		assert_eq!(feed["items"][0]["id"], post.to_string());

		let feed = anton.get("/follow").await.json::<serde_json::Value>();

		assert_eq!(feed["count"], 0);
		assert_eq!(feed["items"], json!([]));
	}

	#[sqlx::test]
	async fn test_feed_requires_login(pool: Database) {
		let response = app(state(pool)).get("/follow").await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(response.header("location"), "/auth/login?next=%2Ffollow");
	}
}
