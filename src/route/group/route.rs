use axum::extract::State;
use macros::route;

use crate::{
	extract::{Json, Path, Query, Session},
	openapi::tag,
	paginate::Paginator,
	route::post::model::{post_view_query, PostView},
	Database,
};

use super::{model, Error, RouteError};

/// Get group
/// Returns a group and a page of its posts, newest first.
#[route(tag = tag::GROUP)]
pub async fn get_group(
	State(database): State<Database>,
	Path(path): Path<model::SlugInput>,
	Query(query): Query<model::PageQuery>,
) -> Result<Json<model::GroupPage>, RouteError> {
	let group = sqlx::query_as::<_, model::Group>(r#"SELECT * FROM "group" WHERE slug = $1"#)
		.bind(&path.slug)
		.fetch_optional(&database)
		.await?
		.ok_or_else(|| Error::UnknownGroup(path.slug.clone()))?;

	let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM post WHERE group_id = $1")
		.bind(group.id)
		.fetch_one(&database)
		.await?;
	let paginator = Paginator::new(count, query.number());

	let posts = sqlx::query_as::<_, PostView>(post_view_query!(
		"WHERE p.group_id = $1 ORDER BY p.pub_date DESC, p.id DESC LIMIT $2 OFFSET $3"
	))
	.bind(group.id)
	.bind(paginator.limit())
	.bind(paginator.offset())
	.fetch_all(&database)
	.await?;

	Ok(Json(model::GroupPage {
		group,
		page: paginator.page(posts),
	}))
}

/// Create group
/// Creates a new group. The slug must not be taken.
#[route(tag = tag::GROUP)]
pub async fn create_group(
	State(database): State<Database>,
	session: Session,
	Json(input): Json<model::GroupInput>,
) -> Result<Json<model::Group>, RouteError> {
	let group = sqlx::query_as::<_, model::Group>(
		r#"
			INSERT INTO "group" (title, slug, description)
			VALUES ($1, $2, $3)
			RETURNING *
		"#,
	)
	.bind(&input.title)
	.bind(&input.slug)
	.bind(&input.description)
	.fetch_one(&database)
	.await
	.map_err(|e| match e {
		sqlx::Error::Database(ref d) if d.constraint() == Some("group_slug_key") => {
			Error::SlugTaken(input.slug.clone()).into()
		}
		e => RouteError::from(e),
	})?;

	tracing::info!(slug = %group.slug, user = %session.user.username, "group created");

	Ok(Json(group))
}
