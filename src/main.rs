#![warn(clippy::pedantic)]

mod cache;
mod config;
mod error;
mod extract;
mod openapi;
mod paginate;
mod ratelimit;
mod response;
mod route;
mod session;
#[cfg(test)]
mod test;
mod trace;

use std::{net::SocketAddr, sync::Arc};

use aide::{axum::ApiRouter, openapi::OpenApi};
use argon2::Argon2;
use axum::{extract::Request, Extension, Router, ServiceExt};
use tower::Layer;
use tower_governor::GovernorLayer;
use tower_http::{
	compression::CompressionLayer,
	normalize_path::NormalizePathLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};

use crate::{cache::PageCache, config::Config, error::AppError};

pub type Database = sqlx::Pool<sqlx::Postgres>;
pub type AppState = State;

/// The shared application state.
///
/// Everything handlers need to share: the connection pool, the password
/// hasher and the rendered-page cache.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub database: Database,
	pub hasher: Argon2<'static>,
	pub page_cache: PageCache,
}

/// Errors that stop the server from starting.
#[derive(Debug, thiserror::Error)]
enum Error {
	#[error(transparent)]
	Config(#[from] config::Error),
	#[error(transparent)]
	Trace(#[from] trace::Error),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("migration error: {0}")]
	Migrate(#[from] sqlx::migrate::MigrateError),
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
	#[error("rate limits must be non-zero")]
	RateLimit,
}

/// Builds the application with its documentation, without any of the
/// connection-level middleware.
pub fn router(state: AppState) -> Router {
	let mut api = OpenApi::default();

	ApiRouter::new()
		.merge(route::routes())
		.nest_api_service("/docs", route::docs::routes())
		.finish_api_with(&mut api, openapi::docs)
		.layer(Extension(Arc::new(api)))
		.fallback(|| async { AppError::NotFound })
		.with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
	let config = Config::from_env()?;
	let _guard = trace::init(config.otel_enabled)?;

	aide::gen::on_error(|error| tracing::error!(%error, "failed to generate api docs"));
	aide::gen::extract_schemas(true);

	let database = Database::connect(&config.database_url).await?;

	sqlx::migrate!().run(&database).await?;

	let state = State {
		database,
		hasher: Argon2::default(),
		page_cache: PageCache::new(config.index_cache_ttl),
	};

	let governor = ratelimit::default().ok_or(Error::RateLimit)?;

	ratelimit::cleanup_old_limits(&[&governor]);

	let app = router(state)
		.layer(GovernorLayer { config: governor })
		.layer(CompressionLayer::new())
		.layer(PropagateRequestIdLayer::x_request_id())
		.layer(TraceLayer::new_for_http())
		.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

	// Trailing slashes have to go before routing sees the path
	let app = NormalizePathLayer::trim_trailing_slash().layer(app);

	let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;

	tracing::info!("listening on port {}", config.port);

	axum::serve(
		listener,
		ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
	)
	.await?;

	Ok(())
}
