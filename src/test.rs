pub use axum::http::StatusCode;
pub use serde_json::json;

pub use crate::{AppState, Database};

use std::time::Duration;

use argon2::Argon2;
use axum_test::{TestServer, TestServerConfig};
use uuid::Uuid;

use crate::{cache::PageCache, route::auth::route::hash_password};

/// Password of every user created by [`register`].
pub const PASSWORD: &str = "warandpeace";

/// Application state over a test database. The page cache outlives every test,
/// so cached pages only go away when invalidated.
pub fn state(database: Database) -> AppState {
	AppState {
		database,
		hasher: Argon2::default(),
		page_cache: PageCache::new(Duration::from_secs(3600)),
	}
}

/// A test client that keeps the cookies it receives.
pub fn app(state: AppState) -> TestServer {
	TestServer::new_with_config(
		crate::router(state),
		TestServerConfig {
			save_cookies: true,
			..Default::default()
		},
	)
	.unwrap()
}

/// Creates `username` (with the email `{username}@example.com` and [`PASSWORD`])
/// unless it already exists, returning its id.
pub async fn register(state: &AppState, username: &str) -> Uuid {
	let id = Uuid::new_v4();
	let hashed = hash_password(&state.hasher, PASSWORD, &id).unwrap();

	sqlx::query(
		r#"
			INSERT INTO "user" (id, email, username, password) VALUES ($1, $2, $3, $4)
			ON CONFLICT (username) DO NOTHING
		"#,
	)
	.bind(id)
	.bind(format!("{username}@example.com"))
	.bind(username)
	.bind(&hashed[..])
	.execute(&state.database)
	.await
	.unwrap();

	sqlx::query_scalar(r#"SELECT id FROM "user" WHERE username = $1"#)
		.bind(username)
		.fetch_one(&state.database)
		.await
		.unwrap()
}

/// A test client logged in as `username`, creating the user if needed.
pub async fn signed_in(state: &AppState, username: &str) -> TestServer {
	register(state, username).await;

	let server = app(state.clone());
	let response = server
		.post("/auth/login")
		.json(&json!({
			"email": format!("{username}@example.com"),
			"password": PASSWORD,
		}))
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);

	server
}

pub async fn create_group(state: &AppState, slug: &str) -> Uuid {
	sqlx::query_scalar(
		r#"
			INSERT INTO "group" (title, slug, description) VALUES ($1, $1, $2)
			RETURNING id
		"#,
	)
	.bind(slug)
	.bind(format!("About {slug}"))
	.fetch_one(&state.database)
	.await
	.unwrap()
}

/// Inserts a post directly, bypassing the page cache.
pub async fn create_post(state: &AppState, username: &str, text: &str, group: Option<Uuid>) -> Uuid {
	let author = register(state, username).await;

	sqlx::query_scalar(
		"INSERT INTO post (text, author_id, group_id) VALUES ($1, $2, $3) RETURNING id",
	)
	.bind(text)
	.bind(author)
	.bind(group)
	.fetch_one(&state.database)
	.await
	.unwrap()
}

pub async fn post_count(state: &AppState) -> i64 {
	sqlx::query_scalar("SELECT COUNT(*) FROM post")
		.fetch_one(&state.database)
		.await
		.unwrap()
}
