use std::time::Duration;

/// Seconds the rendered global post list stays cached when `INDEX_CACHE_TTL` is unset.
pub const DEFAULT_INDEX_CACHE_TTL: u64 = 20;
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{0} must be set")]
	Missing(&'static str),
	#[error("{name} must be {expected}, got {value:?}")]
	Invalid {
		name: &'static str,
		expected: &'static str,
		value: String,
	},
}

/// Runtime configuration, read from the environment (and `.env`, if present).
#[derive(Debug, Clone)]
pub struct Config {
	pub database_url: String,
	pub port: u16,
	pub index_cache_ttl: Duration,
	/// Export traces and metrics over OTLP in addition to stdout logging.
	pub otel_enabled: bool,
}

impl Config {
	pub fn from_env() -> Result<Self, Error> {
		dotenvy::dotenv().ok();

		Self::from_lookup(|name| std::env::var(name).ok())
	}

	fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
		let database_url = lookup("DATABASE_URL").ok_or(Error::Missing("DATABASE_URL"))?;

		let port = parse(&lookup, "PORT", "a port number")?.unwrap_or(DEFAULT_PORT);
		let ttl = parse(&lookup, "INDEX_CACHE_TTL", "a number of seconds")?
			.unwrap_or(DEFAULT_INDEX_CACHE_TTL);
		let otel_enabled = parse(&lookup, "OTEL_ENABLED", "true or false")?.unwrap_or(false);

		Ok(Self {
			database_url,
			port,
			index_cache_ttl: Duration::from_secs(ttl),
			otel_enabled,
		})
	}
}

fn parse<T: std::str::FromStr>(
	lookup: &impl Fn(&str) -> Option<String>,
	name: &'static str,
	expected: &'static str,
) -> Result<Option<T>, Error> {
	let Some(value) = lookup(name) else {
		return Ok(None);
	};

	value
		.trim()
		.parse()
		.map(Some)
		.map_err(|_| Error::Invalid {
			name,
			expected,
			value,
		})
}

#[cfg(test)]
mod test {
	use std::collections::HashMap;

	use super::*;

	fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let vars = vars
			.iter()
			.map(|(k, v)| ((*k).to_string(), (*v).to_string()))
			.collect::<HashMap<_, _>>();

		move |name| vars.get(name).cloned()
	}

	#[test]
	fn test_defaults() {
		let config = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost")])).unwrap();

		assert_eq!(config.port, DEFAULT_PORT);
		assert_eq!(
			config.index_cache_ttl,
			Duration::from_secs(DEFAULT_INDEX_CACHE_TTL)
		);
		assert!(!config.otel_enabled);
	}

	#[test]
	fn test_missing_database_url() {
		let error = Config::from_lookup(lookup(&[("PORT", "8080")])).unwrap_err();

		assert!(matches!(error, Error::Missing("DATABASE_URL")));
	}

	#[test]
	fn test_invalid_port() {
		let error = Config::from_lookup(lookup(&[
			("DATABASE_URL", "postgres://localhost"),
			("PORT", "http"),
		]))
		.unwrap_err();

		assert!(matches!(error, Error::Invalid { name: "PORT", .. }));
	}

	#[test]
	fn test_overrides() {
		let config = Config::from_lookup(lookup(&[
			("DATABASE_URL", "postgres://localhost"),
			("PORT", "8080"),
			("INDEX_CACHE_TTL", "5"),
			("OTEL_ENABLED", "true"),
		]))
		.unwrap();

		assert_eq!(config.port, 8080);
		assert_eq!(config.index_cache_ttl, Duration::from_secs(5));
		assert!(config.otel_enabled);
	}
}
