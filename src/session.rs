use axum::http::HeaderValue;
use uuid::Uuid;

pub const COOKIE_NAME: &str = "session";

/// Creates a session cookie with no expiry, sent over HTTPS only in release builds.
pub fn create_cookie(session_id: Uuid) -> cookie::Cookie<'static> {
	cookie::Cookie::build((COOKIE_NAME, session_id.to_string()))
		.secure(!cfg!(debug_assertions))
		.http_only(true)
		.same_site(cookie::SameSite::Lax)
		.path("/")
		.into()
}

/// Creates an empty session cookie used to invalidate a previous one
pub fn clear_cookie() -> cookie::Cookie<'static> {
	cookie::Cookie::build(COOKIE_NAME)
		.http_only(true)
		.path("/")
		.max_age(cookie::time::Duration::ZERO)
		.into()
}

/// Returns `next` if it is safe to redirect to after logging in.
///
/// Only local absolute paths that fit in a `Location` header are accepted,
/// so `//host`, `https://host` and paths with control characters are rejected.
pub fn local_redirect(next: &str) -> Option<&str> {
	let rest = next.strip_prefix('/')?;

	if rest.starts_with('/') || rest.starts_with('\\') {
		return None;
	}

	if next.chars().any(char::is_control) || HeaderValue::from_str(next).is_err() {
		return None;
	}

	Some(next)
}
