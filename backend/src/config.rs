use std::time::Duration;

use actix_cors::Cors;
use actix_web::http::{header, Uri};
use log::warn;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_STATIC_DIR: &str = "./static";
const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 60;
const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Server configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub static_dir: String,
    pub session_ttl: Duration,
    pub max_sessions: usize,
    /// Extra CORS origins. The server's own origin is always allowed.
    pub allowed_origins: Vec<String>,
    /// Set by `ALLOWED_ORIGINS=*`.
    pub allow_any_origin: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            workers: num_cpus::get(),
            static_dir: DEFAULT_STATIC_DIR.to_string(),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            max_sessions: DEFAULT_MAX_SESSIONS,
            allowed_origins: Vec::new(),
            allow_any_origin: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source. Unparseable values
    /// fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let host = lookup("HOST").unwrap_or(defaults.host);
        let port = lookup("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);
        let workers = lookup("WORKERS")
            .and_then(|w| w.parse().ok())
            .filter(|&w: &usize| w > 0)
            .unwrap_or(defaults.workers);
        let static_dir = lookup("STATIC_DIR").unwrap_or(defaults.static_dir);
        let session_ttl = lookup("SESSION_TTL_SECS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.session_ttl);
        let max_sessions = lookup("MAX_SESSIONS")
            .and_then(|m| m.parse().ok())
            .filter(|&m: &usize| m > 0)
            .unwrap_or(defaults.max_sessions);

        let mut allowed_origins = Vec::new();
        let mut allow_any_origin = false;
        if let Some(origins) = lookup("ALLOWED_ORIGINS") {
            for origin in origins.split(',').map(str::trim).filter(|o| !o.is_empty()) {
                if origin == "*" {
                    allow_any_origin = true;
                } else if is_valid_origin(origin) {
                    allowed_origins.push(origin.to_string());
                } else {
                    warn!("ALLOWED_ORIGINS: ignoring invalid origin '{}'", origin);
                }
            }
        }

        Self {
            host,
            port,
            workers,
            static_dir,
            session_ttl,
            max_sessions,
            allowed_origins,
            allow_any_origin,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Origins accepted by CORS: the local server plus any configured extras.
    pub fn cors_origins(&self) -> Vec<String> {
        let mut origins = vec![
            format!("http://localhost:{}", self.port),
            format!("http://127.0.0.1:{}", self.port),
        ];
        for origin in &self.allowed_origins {
            if !origins.contains(origin) {
                origins.push(origin.clone());
            }
        }
        origins
    }

    pub fn cors(&self) -> Cors {
        let cors = if self.allow_any_origin {
            Cors::default().allow_any_origin()
        } else {
            self.cors_origins()
                .iter()
                .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        };

        cors.allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![header::CONTENT_TYPE])
            .max_age(3600)
    }
}

/// An origin must carry a scheme and a host, e.g. `https://quake.example`.
fn is_valid_origin(origin: &str) -> bool {
    origin
        .parse::<Uri>()
        .map(|uri| uri.scheme().is_some() && uri.host().is_some())
        .unwrap_or(false)
}
