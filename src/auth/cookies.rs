use std::time::Duration;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::{Duration as TimeDuration, OffsetDateTime};

use crate::config::{CookieConfig, Environment};

pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// Builds the `refresh_token` cookie. Production cookies are `Secure` and
/// `SameSite=None` so a separately hosted frontend can send them back.
#[derive(Debug, Clone)]
pub struct RefreshCookie {
    domain: String,
    secure: bool,
    same_site: SameSite,
    ttl: Duration,
}

impl RefreshCookie {
    pub fn new(cfg: &CookieConfig, environment: Environment, ttl: Duration) -> Self {
        let dev = environment.is_dev();
        Self {
            domain: cfg.domain.clone(),
            secure: !dev,
            same_site: if dev { SameSite::Lax } else { SameSite::None },
            ttl,
        }
    }

    fn build(&self, value: String, expires: OffsetDateTime) -> Cookie<'static> {
        Cookie::build((REFRESH_COOKIE_NAME, value))
            .http_only(true)
            .domain(self.domain.clone())
            .path("/")
            .secure(self.secure)
            .same_site(self.same_site)
            .expires(expires)
            .build()
    }

    pub fn issue(&self, token: String) -> anyhow::Result<Cookie<'static>> {
        let expires = i64::try_from(self.ttl.as_secs())
            .ok()
            .and_then(|secs| OffsetDateTime::now_utc().checked_add(TimeDuration::seconds(secs)))
            .ok_or_else(|| anyhow::anyhow!("refresh cookie ttl out of range"))?;
        Ok(self.build(token, expires))
    }

    /// Empty cookie that expired at the Unix epoch.
    pub fn expired(&self) -> Cookie<'static> {
        self.build(String::new(), OffsetDateTime::UNIX_EPOCH)
    }
}

pub fn read_refresh_token(jar: &CookieJar) -> Option<String> {
    jar.get(REFRESH_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_ttl(environment: Environment, ttl: Duration) -> RefreshCookie {
        RefreshCookie::new(
            &CookieConfig {
                domain: "cinereview.test".into(),
            },
            environment,
            ttl,
        )
    }

    fn settings(environment: Environment) -> RefreshCookie {
        settings_with_ttl(environment, Duration::from_secs(7 * 24 * 3600))
    }

    #[test]
    fn production_cookie_is_secure_cross_site() {
        let cookie = settings(Environment::Production).issue("tok".into()).unwrap();
        assert_eq!(cookie.name(), "refresh_token");
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
        assert_eq!(cookie.domain(), Some("cinereview.test"));
        assert_eq!(cookie.path(), Some("/"));

        let expires = cookie.expires_datetime().unwrap();
        let in_six_days = OffsetDateTime::now_utc() + TimeDuration::days(6);
        assert!(expires > in_six_days);
    }

    #[test]
    fn development_cookie_is_lax_and_not_secure() {
        let cookie = settings(Environment::Development).issue("tok".into()).unwrap();
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }

    #[test]
    fn out_of_range_ttl_is_an_error_not_a_panic() {
        let cookie = settings_with_ttl(Environment::Production, Duration::from_secs(u64::MAX));
        assert!(cookie.issue("tok".into()).is_err());

        let cookie = settings_with_ttl(
            Environment::Production,
            Duration::from_secs(10_000_000_000 * 86_400),
        );
        assert!(cookie.issue("tok".into()).is_err());
    }

    #[test]
    fn expired_cookie_points_at_epoch() {
        let cookie = settings(Environment::Production).expired();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.domain(), Some("cinereview.test"));
    }

    #[test]
    fn reads_only_non_empty_token() {
        let jar = CookieJar::new();
        assert_eq!(read_refresh_token(&jar), None);

        let jar = jar.add(Cookie::new(REFRESH_COOKIE_NAME, ""));
        assert_eq!(read_refresh_token(&jar), None);

        let jar = jar.add(Cookie::new(REFRESH_COOKIE_NAME, "abc"));
        assert_eq!(read_refresh_token(&jar).as_deref(), Some("abc"));
    }
}
