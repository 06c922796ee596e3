use std::{sync::Arc, time::Duration};

use axum::{
	body::Body,
	response::{IntoResponse, Response},
};
use governor::{
	clock::QuantaInstant,
	middleware::{RateLimitingMiddleware, StateInformationMiddleware},
};
use tower_governor::{
	governor::{GovernorConfig, GovernorConfigBuilder},
	key_extractor::{KeyExtractor, PeerIpKeyExtractor},
	GovernorError,
};

use crate::error::AppError;

pub type Config = GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>;

/// Per-client limits for every route: a sustained 10 requests per second with
/// bursts of up to 50. `None` only if the limits are zero.
pub fn default() -> Option<Arc<Config>> {
	GovernorConfigBuilder::default()
		.per_second(10)
		.burst_size(50)
		.use_headers()
		.error_handler(error_handler)
		.finish()
		.map(Arc::new)
}

fn error_handler(error: GovernorError) -> Response<Body> {
	AppError::from(error).into_response()
}

/// Periodically drops limiter state for clients that have not been seen
/// recently, so memory does not grow with every address ever seen.
pub fn cleanup_old_limits<T, M>(configs: &[&Arc<GovernorConfig<T, M>>])
where
	T: KeyExtractor,
	<T as KeyExtractor>::Key: Send + Sync + 'static,
	M: RateLimitingMiddleware<QuantaInstant> + Send + Sync + 'static,
{
	let limiters = configs
		.iter()
		.map(|config| config.limiter().clone())
		.collect::<Vec<_>>();
	let interval = Duration::from_secs(60);

	std::thread::spawn(move || loop {
		std::thread::sleep(interval);

		for limiter in &limiters {
			tracing::debug!("rate limiting storage size: {}", limiter.len());

			limiter.retain_recent();
		}
	});
}
