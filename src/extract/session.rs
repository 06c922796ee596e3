use aide::OperationInput;
use axum::{
	extract::{FromRef, FromRequestParts, OriginalUri},
	http::{header, request},
};
use uuid::Uuid;

use crate::{
	error::RouteError, openapi::SECURITY_SCHEME_SESSION, route::auth, session, Database,
};

/// Extracts the session and related user from the request.
///
/// Requests without a valid session cookie are rejected with
/// [`auth::Error::LoginRequired`], which redirects to the login page and
/// carries the current path and query as the return path.
///
/// ```rust
/// async fn route(session: Session) {
///   println!("{:?}", session.user);
/// }
/// ```
#[derive(Debug)]
pub struct Session {
	pub id: Uuid,
	pub user: auth::model::User,
}

impl Session {
	/// Looks up the session named by the request's cookie, if any.
	async fn lookup(
		parts: &request::Parts,
		database: &Database,
	) -> Result<Option<Self>, sqlx::Error> {
		let cookies = parts
			.headers
			.get_all(header::COOKIE)
			.into_iter()
			.filter_map(|value| value.to_str().ok());

		let Some(session_id) = cookies
			.flat_map(cookie::Cookie::split_parse)
			.filter_map(Result::ok)
			.find(|cookie| cookie.name() == session::COOKIE_NAME)
			.and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
		else {
			return Ok(None);
		};

		let user = sqlx::query_as::<_, auth::model::User>(
			r#"
				SELECT * FROM "user" WHERE id = (
					SELECT user_id FROM session WHERE id = $1
				)
			"#,
		)
		.bind(session_id)
		.fetch_optional(database)
		.await?;

		Ok(user.map(|user| Self {
			id: session_id,
			user,
		}))
	}
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
	Database: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = RouteError<auth::Error>;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let database = Database::from_ref(state);

		match Self::lookup(parts, &database).await? {
			Some(session) => Ok(session),
			None => {
				// Nested routers only see the tail of the path
				let uri = parts
					.extensions
					.get::<OriginalUri>()
					.map_or(&parts.uri, |original| &original.0);
				let next = uri
					.path_and_query()
					.map_or_else(|| uri.path().to_string(), ToString::to_string);

				Err(auth::Error::LoginRequired(next).into())
			}
		}
	}
}

impl OperationInput for Session {
	/// Operation input for the session extractor.
	///
	/// This adds a session cookie requirement to the `OpenAPI` operation.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		operation.security.push(
			[(SECURITY_SCHEME_SESSION.to_string(), Vec::new())]
				.into_iter()
				.collect(),
		);
	}
}

/// Like [`Session`], but anonymous requests are let through as `None`.
#[derive(Debug)]
pub struct MaybeSession(pub Option<Session>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for MaybeSession
where
	Database: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = RouteError<auth::Error>;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let database = Database::from_ref(state);

		Ok(Self(Session::lookup(parts, &database).await?))
	}
}

impl OperationInput for MaybeSession {}
