//! Server configuration, read from the environment once at startup.

use crate::auth::jwt::JwtConfig;

/// Everything the HTTP server needs besides the database URL.
///
/// Defaults suit local development; production overrides via environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS, from the comma-separated `CORS_ORIGINS` var.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load from `HOST` (default `0.0.0.0`), `PORT` (default `3000`),
    /// `CORS_ORIGINS` (default `http://localhost:5173`) and
    /// `REQUEST_TIMEOUT_SECS` (default `30`), plus the JWT variables.
    ///
    /// Unparseable numeric values panic; a server with a garbled port must
    /// not come up.
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_or("PORT", "3000")
                .parse()
                .expect("PORT must be a valid u16"),
            cors_origins: split_origins(&env_or("CORS_ORIGINS", "http://localhost:5173")),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", "30")
                .parse()
                .expect("REQUEST_TIMEOUT_SECS must be a valid u64"),
            jwt: JwtConfig::from_env(),
        }
    }
}

fn env_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_empties_dropped() {
        let origins = split_origins("http://a.test, http://b.test ,,");
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }
}
