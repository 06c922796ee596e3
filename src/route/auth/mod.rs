use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod model;
pub mod route;

/// Path of the login route, where requests without a session are sent.
pub const LOGIN_PATH: &str = "/auth/login";

/// An error that can occur during authentication.
///
/// Note that the messages are presented to the client, so they should not contain
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid username or password")]
	InvalidUsernameOrPassword,
	#[error("password validation error")]
	Argon(#[from] argon2::Error),
	#[error("login required")]
	LoginRequired(String),
	#[error("username already taken")]
	UsernameTaken,
	#[error("email already taken")]
	EmailTaken,
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/login", post_with(login, login_docs))
		.api_route("/logout", get_with(logout, logout_docs))
		.api_route("/register", post_with(register, register_docs))
}

/// Builds the login URL that returns to `next` afterwards.
pub fn login_url(next: &str) -> String {
	format!("{LOGIN_PATH}?next={}", urlencoding::encode(next))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::InvalidUsernameOrPassword | Self::LoginRequired(..) => StatusCode::UNAUTHORIZED,
			Self::Argon(..) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::UsernameTaken | Self::EmailTaken => StatusCode::CONFLICT,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		error::Message::new(self.to_string()).into_vec()
	}

	fn redirect(&self) -> Option<String> {
		match self {
			Self::LoginRequired(next) => Some(login_url(next)),
			_ => None,
		}
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[test]
	fn test_login_url() {
		assert_eq!(super::login_url("/create/"), "/auth/login?next=%2Fcreate%2F");
	}

	#[sqlx::test]
	async fn test_signup_flow(pool: Database) {
		let app = app(state(pool));

		let response = app
			.post("/auth/register")
			.json(&json!({
				"email": "leo@tolstoy.ru",
				"username": "leo",
				"password": "warandpeace",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);
		assert!(response
			.header("set-cookie")
			.to_str()
			.unwrap()
			.contains("session="));

		let response = app
			.post("/auth/login")
			.json(&json!({
				"email": "leo@tolstoy.ru",
				"password": "warandpeace",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);
		assert!(response.json::<serde_json::Value>()["session_id"].is_string());

		let response = app.get("/auth/logout").await;

		assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
	}

	#[sqlx::test]
	async fn test_login_wrong_password(pool: Database) {
		let state = state(pool);
		register(&state, "leo").await;

		let response = app(state)
			.post("/auth/login")
			.json(&json!({
				"email": "leo@example.com",
				"password": "not-the-password",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
	}

	#[sqlx::test]
	async fn test_username_taken(pool: Database) {
		let state = state(pool);
		register(&state, "leo").await;

		let response = app(state)
			.post("/auth/register")
			.json(&json!({
				"email": "other@example.com",
				"username": "leo",
				"password": "warandpeace",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::CONFLICT);
	}

	#[sqlx::test]
	async fn test_login_redirects_to_next(pool: Database) {
		let state = state(pool);
		register(&state, "leo").await;

		let response = app(state)
			.post("/auth/login")
			.add_query_param("next", "/create")
			.json(&json!({
				"email": "leo@example.com",
				"password": PASSWORD,
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(response.header("location"), "/create");
	}

	#[sqlx::test]
	async fn test_login_ignores_foreign_next(pool: Database) {
		let state = state(pool);
		register(&state, "leo").await;

		let response = app(state.clone())
			.post("/auth/login")
			.add_query_param("next", "//evil.example.com")
			.json(&json!({
				"email": "leo@example.com",
				"password": PASSWORD,
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let response = app(state)
			.post("/auth/login")
			.add_query_param("next", "/create\r\nSet-Cookie: x=1")
			.json(&json!({
				"email": "leo@example.com",
				"password": PASSWORD,
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);
		assert!(response.headers().get("location").is_none());
	}

	#[sqlx::test]
	async fn test_logout_requires_login(pool: Database) {
		let response = app(state(pool)).get("/auth/logout").await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(
			response.header("location"),
			"/auth/login?next=%2Fauth%2Flogout"
		);
	}
}
