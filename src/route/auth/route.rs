use aide::axum::IntoApiResponse;
use argon2::Argon2;
use axum::{
	extract::State,
	http::{header, StatusCode},
};
use macros::route;
use uuid::Uuid;

use crate::{
	extract::{Json, Query, Session},
	openapi::tag,
	response::Outcome,
	session, AppState, Database,
};

use super::{model, Error, RouteError};

pub const KEY_LENGTH: usize = 32;

/// Hashes a password with Argon2, salted with the user's id.
pub(crate) fn hash_password(
	hasher: &Argon2,
	password: &str,
	id: &Uuid,
) -> Result<[u8; KEY_LENGTH], argon2::Error> {
	let mut hash = [0; KEY_LENGTH];

	hasher.hash_password_into(password.as_bytes(), id.as_bytes(), &mut hash)?;
	Ok(hash)
}

/// Starts a session for the user, returning it with the `Set-Cookie` value
/// that carries it.
async fn open_session<'e>(
	executor: impl sqlx::PgExecutor<'e>,
	user_id: Uuid,
) -> Result<(model::Session, String), sqlx::Error> {
	let session = sqlx::query_as::<_, model::Session>(
		"INSERT INTO session (user_id) VALUES ($1) RETURNING *",
	)
	.bind(user_id)
	.fetch_one(executor)
	.await?;

	let cookie = session::create_cookie(session.id).to_string();

	Ok((session, cookie))
}

fn conflict(error: sqlx::Error) -> RouteError {
	match error {
		sqlx::Error::Database(ref d) => match d.constraint() {
			Some("user_email_key") => Error::EmailTaken.into(),
			Some("user_username_key") => Error::UsernameTaken.into(),
			_ => RouteError::from(error),
		},
		error => RouteError::from(error),
	}
}

/// Log in
/// Logs in to an account and sets a session cookie. With a local `next` path,
/// redirects there afterwards; otherwise returns the new session.
#[route(tag = tag::AUTH, response(status = 200, description = "Logged in successfully.", shape = "Json<model::Session>"))]
pub async fn login(
	State(state): State<AppState>,
	Query(query): Query<model::LoginQuery>,
	Json(auth): Json<model::LoginInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let user = sqlx::query_as::<_, model::User>(r#"SELECT * FROM "user" WHERE email = $1"#)
		.bind(&auth.email)
		.fetch_optional(&state.database)
		.await?
		.ok_or(Error::InvalidUsernameOrPassword)?;

	if hash_password(&state.hasher, &auth.password, &user.id).map_err(Error::Argon)? != user.password[..] {
		return Err(Error::InvalidUsernameOrPassword.into());
	}

	let (session, cookie) = open_session(&state.database, user.id).await?;

	tracing::info!(username = %user.username, "user logged in");

	let outcome = match query.next.as_deref().and_then(session::local_redirect) {
		Some(next) => Outcome::redirect(next),
		None => Outcome::render(session),
	};

	Ok(([(header::SET_COOKIE, cookie)], outcome))
}

/// Log out
/// Ends the current session and clears its cookie.
#[route(tag = tag::AUTH, response(status = 204, description = "Logged out successfully."))]
pub async fn logout(
	State(database): State<Database>,
	session: Session,
) -> Result<impl IntoApiResponse, RouteError> {
	sqlx::query("DELETE FROM session WHERE id = $1")
		.bind(session.id)
		.execute(&database)
		.await?;

	tracing::info!(username = %session.user.username, "user logged out");

	Ok((
		[(header::SET_COOKIE, session::clear_cookie().to_string())],
		StatusCode::NO_CONTENT,
	))
}

/// Register account
/// Creates an account and logs in to it. The username and email must not be
/// taken.
#[route(tag = tag::AUTH, response(status = 200, description = "Registered successfully.", shape = "Json<model::Session>"))]
pub async fn register(
	State(state): State<AppState>,
	Json(auth): Json<model::RegisterInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let user_id = Uuid::new_v4();
	let hashed = hash_password(&state.hasher, &auth.password, &user_id).map_err(Error::Argon)?;

	let mut tx = state.database.begin().await?;

	sqlx::query(r#"INSERT INTO "user" (id, email, username, password) VALUES ($1, $2, $3, $4)"#)
		.bind(user_id)
		.bind(&auth.email)
		.bind(&auth.username)
		.bind(&hashed[..])
		.execute(&mut *tx)
		.await
		.map_err(conflict)?;

	let (session, cookie) = open_session(&mut *tx, user_id).await?;

	tx.commit().await?;

	tracing::info!(username = %auth.username, "user registered");

	Ok(([(header::SET_COOKIE, cookie)], Json(session)))
}
