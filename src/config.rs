use std::{fmt, net::SocketAddr, time::Duration};

use anyhow::Context;
use lazy_static::lazy_static;
use regex::Regex;

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

/// Deployment mode. Development relaxes the refresh cookie so it works over plain http.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_dev(self) -> bool {
        self == Environment::Development
    }
}

#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub domain: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub environment: Environment,
    pub jwt: JwtConfig,
    pub cookie: CookieConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is required")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is required")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "cinereview".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "cinereview-users".into()),
            access_ttl: ttl_from_env("JWT_ACCESS_TOKEN_TTL", "15m")?,
            refresh_ttl: ttl_from_env("JWT_REFRESH_TOKEN_TTL", "7d")?,
        };
        let environment = match std::env::var("APP_ENV").as_deref() {
            Ok("development") | Ok("dev") => Environment::Development,
            Ok("production") | Ok("prod") | Err(_) => Environment::Production,
            Ok(other) => anyhow::bail!("APP_ENV: unknown environment {other:?}"),
        };
        let cookie = CookieConfig {
            domain: std::env::var("COOKIE_DOMAIN").unwrap_or_else(|_| "localhost".into()),
        };
        let server = ServerConfig {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .map(|v| v.parse::<u16>())
                .transpose()
                .context("APP_PORT must be a port number")?
                .unwrap_or(8080),
        };

        Ok(Self {
            database_url,
            environment,
            jwt,
            cookie,
            server,
        })
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .context("APP_HOST/APP_PORT do not form a socket address")
    }
}

fn ttl_from_env(key: &str, default: &str) -> anyhow::Result<Duration> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    parse_ttl(&raw).with_context(|| format!("{key}: invalid duration {raw:?}"))
}

const MAX_TTL_SECS: u64 = 3650 * 24 * 60 * 60;

/// Parses `15m`, `2h`, `7d` style durations. A bare number is seconds.
pub fn parse_ttl(raw: &str) -> anyhow::Result<Duration> {
    lazy_static! {
        static ref TTL_RE: Regex = Regex::new(r"^\s*(\d+)\s*([a-z]*)\s*$").unwrap();
    }
    let caps = TTL_RE
        .captures(raw)
        .ok_or_else(|| anyhow::anyhow!("expected <number><unit>, e.g. 15m or 7d"))?;
    let amount: u64 = caps[1].parse()?;
    let unit_secs = match &caps[2] {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 60 * 60 * 24,
        "w" => 60 * 60 * 24 * 7,
        other => anyhow::bail!("unknown unit {other:?}"),
    };
    anyhow::ensure!(amount > 0, "duration must be positive");
    let secs = amount
        .checked_mul(unit_secs)
        .filter(|secs| *secs <= MAX_TTL_SECS)
        .ok_or_else(|| anyhow::anyhow!("duration exceeds 3650 days"))?;
    Ok(Duration::from_secs(secs))
}
