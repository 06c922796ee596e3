use axum::extract::State;
use macros::route;

use crate::{
	extract::{Json, MaybeSession, Path, Query, Session},
	openapi::tag,
	paginate::{Page, Paginator},
	response::SeeOther,
	route::{
		auth::model::User,
		post::model::{post_view_query, PostView},
	},
	Database,
};

use super::{model, profile_url, Error, RouteError};

async fn fetch_user(database: &Database, username: &str) -> Result<User, RouteError> {
	let user = sqlx::query_as::<_, User>(r#"SELECT * FROM "user" WHERE username = $1"#)
		.bind(username)
		.fetch_optional(database)
		.await?;

	Ok(user.ok_or_else(|| Error::UnknownUser(username.to_string()))?)
}

/// Get profile
/// Returns an author, a page of their posts (newest first), and whether the
/// viewer follows them.
#[route(tag = tag::PROFILE)]
pub async fn get_profile(
	State(database): State<Database>,
	MaybeSession(viewer): MaybeSession,
	Path(path): Path<model::UsernameInput>,
	Query(query): Query<model::PageQuery>,
) -> Result<Json<model::ProfilePage>, RouteError> {
	let author = fetch_user(&database, &path.username).await?;

	let following = match viewer {
		Some(viewer) => {
			sqlx::query_scalar::<_, bool>(
				"SELECT EXISTS (SELECT 1 FROM follow WHERE user_id = $1 AND author_id = $2)",
			)
			.bind(viewer.user.id)
			.bind(author.id)
			.fetch_one(&database)
			.await?
		}
		None => false,
	};

	let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM post WHERE author_id = $1")
		.bind(author.id)
		.fetch_one(&database)
		.await?;
	let paginator = Paginator::new(count, query.number());

	let posts = sqlx::query_as::<_, PostView>(post_view_query!(
		"WHERE p.author_id = $1 ORDER BY p.pub_date DESC, p.id DESC LIMIT $2 OFFSET $3"
	))
	.bind(author.id)
	.bind(paginator.limit())
	.bind(paginator.offset())
	.fetch_all(&database)
	.await?;

	Ok(Json(model::ProfilePage {
		author,
		post_count: count,
		following,
		page: paginator.page(posts),
	}))
}

/// Follow author
/// Subscribes to an author's posts and redirects to their profile. Following
/// yourself, or someone you already follow, changes nothing.
#[route(tag = tag::PROFILE)]
pub async fn follow(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::UsernameInput>,
) -> Result<SeeOther, RouteError> {
	let author = fetch_user(&database, &path.username).await?;

	if author.id == session.user.id {
		return Ok(SeeOther::to(profile_url(&author.username)));
	}

	let created = sqlx::query(
		r#"
			INSERT INTO follow (user_id, author_id) VALUES ($1, $2)
			ON CONFLICT (user_id, author_id) DO NOTHING
		"#,
	)
	.bind(session.user.id)
	.bind(author.id)
	.execute(&database)
	.await?
	.rows_affected();

	if created > 0 {
		tracing::info!(follower = %session.user.username, author = %author.username, "followed");
	}

	Ok(SeeOther::to(profile_url(&author.username)))
}

/// Unfollow author
/// Removes the subscription to an author and redirects to their profile.
/// Fails if there is no subscription.
#[route(tag = tag::PROFILE)]
pub async fn unfollow(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::UsernameInput>,
) -> Result<SeeOther, RouteError> {
	let author = fetch_user(&database, &path.username).await?;

	let deleted = sqlx::query("DELETE FROM follow WHERE user_id = $1 AND author_id = $2")
		.bind(session.user.id)
		.bind(author.id)
		.execute(&database)
		.await?
		.rows_affected();

	if deleted == 0 {
		return Err(Error::NotFollowing(author.username).into());
	}

	tracing::info!(follower = %session.user.username, author = %author.username, "unfollowed");

	Ok(SeeOther::to(profile_url(&author.username)))
}

/// Get followed posts
/// Returns a page of posts by the authors you follow, newest first.
#[route(tag = tag::PROFILE)]
pub async fn get_feed(
	State(database): State<Database>,
	session: Session,
	Query(query): Query<model::PageQuery>,
) -> Result<Json<Page<PostView>>, RouteError> {
	let count = sqlx::query_scalar::<_, i64>(
		r#"
			SELECT COUNT(*) FROM post
			WHERE author_id IN (SELECT author_id FROM follow WHERE user_id = $1)
		"#,
	)
	.bind(session.user.id)
	.fetch_one(&database)
	.await?;
	let paginator = Paginator::new(count, query.number());

	let posts = sqlx::query_as::<_, PostView>(post_view_query!(
		"WHERE p.author_id IN (SELECT author_id FROM follow WHERE user_id = $1) ",
		"ORDER BY p.pub_date DESC, p.id DESC LIMIT $2 OFFSET $3"
	))
	.bind(session.user.id)
	.bind(paginator.limit())
	.bind(paginator.offset())
	.fetch_all(&database)
	.await?;

	Ok(Json(paginator.page(posts)))
}
