//! Flash Cookies
//!
//! Flash data lives server-side; the browser only holds a signed token that
//! names it. Reading a flash consumes it.

use axum::http::HeaderMap;
use chrono::Utc;
use platform::cookie::{CookieConfig, extract_cookie};
use platform::crypto::{sign_token, verify_token};
use uuid::Uuid;

use crate::application::config::PagesConfig;
use crate::domain::entities::FlashData;
use crate::domain::repository::FlashRepository;
use crate::error::PageResult;

/// Flash read from a request plus the header that clears its cookie
#[derive(Debug, Default)]
pub struct InboundFlash {
    pub data: FlashData,
    pub clear_cookie: Option<String>,
}

fn flash_cookie(config: &PagesConfig) -> CookieConfig {
    CookieConfig {
        name: config.flash_cookie_name.clone(),
        secure: config.cookie_secure,
        http_only: true,
        same_site: config.cookie_same_site,
        path: "/".to_string(),
        max_age_secs: Some(config.flash_ttl.as_secs() as i64),
    }
}

/// Consume the flash referenced by the request's cookie, if any
///
/// Storage errors are logged and treated as "no flash".
pub async fn take_flash<R>(repo: &R, config: &PagesConfig, headers: &HeaderMap) -> InboundFlash
where
    R: FlashRepository + Sync,
{
    let Some(token) = extract_cookie(headers, &config.flash_cookie_name) else {
        return InboundFlash::default();
    };
    let clear_cookie = Some(flash_cookie(config).build_delete_cookie());

    let Some(flash_id) = verify_token(&token, &config.session_secret) else {
        tracing::debug!("Flash cookie signature mismatch");
        return InboundFlash {
            data: FlashData::default(),
            clear_cookie,
        };
    };

    let data = match repo.take_flash(flash_id).await {
        Ok(data) => data.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, flash_id = %flash_id, "Failed to read flash");
            FlashData::default()
        }
    };

    InboundFlash { data, clear_cookie }
}

/// Store `flash` and return the Set-Cookie value referencing it
pub async fn put_flash<R>(repo: &R, config: &PagesConfig, flash: &FlashData) -> PageResult<String>
where
    R: FlashRepository + Sync,
{
    let flash_id = Uuid::new_v4();
    let expires_at_ms = Utc::now().timestamp_millis() + config.flash_ttl_ms();

    repo.put_flash(flash_id, flash, expires_at_ms).await?;

    let token = sign_token(&flash_id, &config.session_secret);
    Ok(flash_cookie(config).build_set_cookie(&token))
}
