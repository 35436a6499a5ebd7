use anyhow::{bail, Context, Result};

const DEFAULT_JOBS_FEED_URL: &str = "https://remotive.com/api/remote-jobs";
const DEFAULT_NEWS_FEED_URL: &str = "https://finance.yahoo.com/news/rssindex";
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    pub jwt_secret: String,
    /// Shared secret for the legacy user import. Import is disabled when unset.
    pub admin_token: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub static_dir: String,
    pub jobs_feed_url: String,
    pub news_feed_url: String,
    pub jobs_cache_ttl_secs: u64,
    pub max_upload_bytes: usize,
    pub token_ttl_hours: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let jwt_secret = require_env("JWT_SECRET")?;
        if jwt_secret.len() < 32 {
            bail!("JWT_SECRET must be at least 32 bytes");
        }

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            jwt_secret,
            admin_token: std::env::var("ADMIN_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            static_dir: std::env::var("STATIC_DIR").unwrap_or_else(|_| "public".to_string()),
            jobs_feed_url: std::env::var("JOBS_FEED_URL")
                .unwrap_or_else(|_| DEFAULT_JOBS_FEED_URL.to_string()),
            news_feed_url: std::env::var("NEWS_FEED_URL")
                .unwrap_or_else(|_| DEFAULT_NEWS_FEED_URL.to_string()),
            jobs_cache_ttl_secs: parse_env("JOBS_CACHE_TTL_SECS", 600)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,
            token_ttl_hours: check_token_ttl(parse_env("TOKEN_TTL_HOURS", 24)?)?,
        })
    }
}

fn check_token_ttl(hours: i64) -> Result<i64> {
    if !(1..=MAX_TOKEN_TTL_HOURS).contains(&hours) {
        bail!("TOKEN_TTL_HOURS must be between 1 and {MAX_TOKEN_TTL_HOURS}, got {hours}");
    }
    Ok(hours)
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_ttl_range() {
        assert_eq!(check_token_ttl(24).unwrap(), 24);
        assert_eq!(check_token_ttl(MAX_TOKEN_TTL_HOURS).unwrap(), MAX_TOKEN_TTL_HOURS);
        assert!(check_token_ttl(0).is_err());
        assert!(check_token_ttl(-3).is_err());
        assert!(check_token_ttl(i64::MAX).is_err());
    }
}
