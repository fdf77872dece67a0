use chrono::Duration;

/// Process-wide configuration, read once at startup and injected into
/// services. Nothing here is re-read after construction.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub cors_allowed_origins: Vec<String>,
    pub token_sweep_interval_secs: u64,
    pub database_url: Option<String>,
}

impl AppConfig {
    /// Reads configuration from environment variables, falling back to
    /// development defaults.
    pub fn from_env() -> Self {
        let access_minutes = std::env::var("ACCESS_TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(15);

        let refresh_token_ttl = std::env::var("REFRESH_TOKEN_TTL")
            .ok()
            .and_then(|s| parse_duration(&s))
            .unwrap_or_else(|| Duration::days(7));

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let token_sweep_interval_secs = std::env::var("TOKEN_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3600);

        Self {
            jwt_secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "your-secret-key-change-in-production".to_string()),
            access_token_ttl: Duration::minutes(access_minutes),
            refresh_token_ttl,
            cors_allowed_origins,
            token_sweep_interval_secs,
            database_url: std::env::var("DATABASE_URL").ok(),
        }
    }
}

/// Parses duration strings like "7d", "24h", "30m" or "90s".
/// A bare number is taken as seconds.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let (value, unit) = match raw.char_indices().last() {
        Some((idx, c)) if c.is_ascii_alphabetic() => (&raw[..idx], Some(c)),
        _ => (raw, None),
    };

    let value: i64 = value.parse().ok()?;
    if value < 0 {
        return None;
    }

    match unit {
        Some('s') | None => Some(Duration::seconds(value)),
        Some('m') => Some(Duration::minutes(value)),
        Some('h') => Some(Duration::hours(value)),
        Some('d') => Some(Duration::days(value)),
        _ => None,
    }
}
