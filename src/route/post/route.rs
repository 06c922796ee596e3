use axum::extract::State;
use macros::route;
use validator::Validate;

use crate::{
	cache,
	error::{self, AppError},
	extract::{Json, Path, Query, Session, Submission},
	openapi::tag,
	paginate::{Page, Paginator},
	response::{CachedJson, Outcome, SeeOther},
	route::{group::model::Group, profile::profile_url},
	AppState, Database,
};

use super::{
	model::{self, post_view_query},
	post_url, Error, RouteError,
};

/// Ids that are not UUIDs cannot name a post.
fn post_id(path: &model::IdInput) -> Result<uuid::Uuid, Error> {
	path.uuid().ok_or_else(|| Error::UnknownPost(path.id.clone()))
}

async fn fetch_post(database: &Database, path: &model::IdInput) -> Result<model::Post, RouteError> {
	let post = sqlx::query_as::<_, model::Post>("SELECT * FROM post WHERE id = $1")
		.bind(post_id(path)?)
		.fetch_optional(database)
		.await?;

	Ok(post.ok_or_else(|| Error::UnknownPost(path.id.clone()))?)
}

async fn group_choices(database: &Database) -> Result<Vec<Group>, sqlx::Error> {
	sqlx::query_as::<_, Group>(r#"SELECT * FROM "group" ORDER BY title"#)
		.fetch_all(database)
		.await
}

/// Validates a submitted post, including that the chosen group exists.
async fn form_errors(
	database: &Database,
	input: &model::PostInput,
) -> Result<Vec<error::Message<'static>>, sqlx::Error> {
	let mut errors = match input.validate() {
		Ok(()) => Vec::new(),
		Err(errors) => error::validation_messages(&errors),
	};

	if let Some(group_id) = input.group_id {
		let exists = sqlx::query_scalar::<_, bool>(
			r#"SELECT EXISTS (SELECT 1 FROM "group" WHERE id = $1)"#,
		)
		.bind(group_id)
		.fetch_one(database)
		.await?;

		if !exists {
			errors.push(error::Message::new("Select a valid choice.").field("group_id"));
		}
	}

	Ok(errors)
}

/// Get all posts
/// Returns a page of all posts, newest first. The rendered page is cached
/// for a short time, independently of the query string.
#[route(tag = tag::POST)]
pub async fn get_posts(
	State(state): State<AppState>,
	Query(query): Query<model::PageQuery>,
) -> Result<CachedJson<Page<model::PostView>>, RouteError> {
	if let Some(body) = state.page_cache.get(cache::INDEX_PAGE).await {
		return Ok(CachedJson::from_bytes(body));
	}

	let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM post")
		.fetch_one(&state.database)
		.await?;
	let paginator = Paginator::new(count, query.number());

	let posts = sqlx::query_as::<_, model::PostView>(post_view_query!(
		"ORDER BY p.pub_date DESC, p.id DESC LIMIT $1 OFFSET $2"
	))
	.bind(paginator.limit())
	.bind(paginator.offset())
	.fetch_all(&state.database)
	.await?;

	let page = CachedJson::serialize(&paginator.page(posts)).map_err(AppError::from)?;

	// A post created while this page was built may be missing from it until
	// the entry expires.
	state.page_cache.insert(cache::INDEX_PAGE, page.bytes()).await;

	Ok(page)
}

/// Get single post
/// Returns a post with its comments and the number of posts by its author.
#[route(tag = tag::POST)]
pub async fn get_post(
	State(database): State<Database>,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::PostDetail>, RouteError> {
	let post = sqlx::query_as::<_, model::PostView>(post_view_query!("WHERE p.id = $1"))
		.bind(post_id(&path)?)
		.fetch_optional(&database)
		.await?
		.ok_or_else(|| Error::UnknownPost(path.id.clone()))?;

	let author_posts = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM post WHERE author_id = $1")
		.bind(post.author_id)
		.fetch_one(&database)
		.await?;

	let comments = sqlx::query_as::<_, model::CommentView>(
		r#"
			SELECT c.id, c.text, c.created, u.username AS author
			FROM comment c
			JOIN "user" u ON u.id = c.author_id
			WHERE c.post_id = $1
			ORDER BY c.created, c.id
		"#,
	)
	.bind(post.id)
	.fetch_all(&database)
	.await?;

	Ok(Json(model::PostDetail {
		title: model::title(&post.text),
		post,
		author_posts,
		comments,
	}))
}

/// New post form
/// Returns the empty post form with the groups a post can be filed under.
#[route(tag = tag::POST)]
pub async fn new_post(
	State(database): State<Database>,
	_session: Session,
) -> Result<Json<model::PostForm>, RouteError> {
	Ok(Json(model::PostForm {
		is_edit: false,
		post: None,
		input: None,
		groups: group_choices(&database).await?,
		errors: Vec::new(),
	}))
}

/// Create post
/// Creates a new post and redirects to the author's profile. Invalid input
/// returns the form again with the errors.
#[route(tag = tag::POST)]
pub async fn create_post(
	State(state): State<AppState>,
	session: Session,
	Submission(input): Submission<model::PostInput>,
) -> Result<Outcome<model::PostForm>, RouteError> {
	let errors = form_errors(&state.database, &input).await?;

	if !errors.is_empty() {
		return Ok(Outcome::invalid(model::PostForm {
			is_edit: false,
			post: None,
			input: Some(input),
			groups: group_choices(&state.database).await?,
			errors,
		}));
	}

	let post = sqlx::query_as::<_, model::Post>(
		r#"
			INSERT INTO post (text, author_id, group_id, image)
			VALUES ($1, $2, $3, $4)
			RETURNING *
		"#,
	)
	.bind(&input.text)
	.bind(session.user.id)
	.bind(input.group_id)
	.bind(&input.image)
	.fetch_one(&state.database)
	.await?;

	state.page_cache.invalidate(cache::INDEX_PAGE).await;

	tracing::info!(post = %post.id, author = %session.user.username, "post created");

	Ok(Outcome::redirect(profile_url(&session.user.username)))
}

/// Edit post form
/// Returns the form for editing a post. Anyone but the author is redirected
/// to the post instead.
#[route(tag = tag::POST)]
pub async fn edit_post(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
) -> Result<Outcome<model::PostForm>, RouteError> {
	let post = fetch_post(&database, &path).await?;

	if post.author_id != session.user.id {
		return Ok(Outcome::redirect(post_url(post.id)));
	}

	Ok(Outcome::render(model::PostForm {
		is_edit: true,
		post: Some(post),
		input: None,
		groups: group_choices(&database).await?,
		errors: Vec::new(),
	}))
}

/// Update post
/// Replaces the text and group of a post, and its image when a new one is
/// given, then redirects to the post. Anyone but the author is redirected
/// without changing anything.
#[route(tag = tag::POST)]
pub async fn update_post(
	State(state): State<AppState>,
	session: Session,
	Path(path): Path<model::IdInput>,
	Submission(input): Submission<model::PostInput>,
) -> Result<Outcome<model::PostForm>, RouteError> {
	let post = fetch_post(&state.database, &path).await?;

	if post.author_id != session.user.id {
		tracing::debug!(post = %post.id, user = %session.user.username, "edit by non-author");

		return Ok(Outcome::redirect(post_url(post.id)));
	}

	let errors = form_errors(&state.database, &input).await?;

	if !errors.is_empty() {
		return Ok(Outcome::invalid(model::PostForm {
			is_edit: true,
			post: Some(post),
			input: Some(input),
			groups: group_choices(&state.database).await?,
			errors,
		}));
	}

	sqlx::query(
		r#"
			UPDATE post
			SET text = $1, group_id = $2, image = COALESCE($3, image)
			WHERE id = $4 AND author_id = $5
		"#,
	)
	.bind(&input.text)
	.bind(input.group_id)
	.bind(&input.image)
	.bind(post.id)
	.bind(session.user.id)
	.execute(&state.database)
	.await?;

	state.page_cache.invalidate(cache::INDEX_PAGE).await;

	Ok(Outcome::redirect(post_url(post.id)))
}

/// Add comment
/// Comments on a post and redirects back to it. Invalid comments are
/// dropped, but still redirect.
#[route(tag = tag::POST)]
pub async fn add_comment(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
	Submission(input): Submission<model::CommentInput>,
) -> Result<SeeOther, RouteError> {
	let post = fetch_post(&database, &path).await?;

	match input.validate() {
		Ok(()) => {
			sqlx::query("INSERT INTO comment (post_id, author_id, text) VALUES ($1, $2, $3)")
				.bind(post.id)
				.bind(session.user.id)
				.bind(&input.text)
				.execute(&database)
				.await?;
		}
		Err(errors) => {
			tracing::debug!(post = %post.id, %errors, "dropping invalid comment");
		}
	}

	Ok(SeeOther::to(post_url(post.id)))
}
