//! Application Configuration
//!
//! Configuration for the page administration layer.

use std::time::Duration;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

use crate::domain::value_objects::PageStatus;

/// Errors while reading configuration from the environment
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Page administration configuration
#[derive(Debug, Clone)]
pub struct PagesConfig {
    /// Back-office directory; no page may use it as slug
    pub admin_dir: String,
    /// Where editors without a session are sent
    pub login_url: String,
    /// Mount point of the page router, used for redirects
    pub base_path: String,
    /// Status given to new pages
    pub default_status: PageStatus,
    /// Filter given to new parts
    pub default_filter_id: String,
    /// Keep HTML in page titles
    pub allow_html_title: bool,
    /// Installed text filters offered in the part editor
    pub filters: Vec<String>,
    /// Installed page behaviors offered in the page editor
    pub behaviors: Vec<String>,
    /// Secret key for HMAC signing of session and flash tokens (32 bytes)
    pub session_secret: [u8; 32],
    /// Cookie carrying the editor session token
    pub session_cookie_name: String,
    /// Cookie carrying the flash token
    pub flash_cookie_name: String,
    /// How long an unread flash survives
    pub flash_ttl: Duration,
    /// Cookie listing expanded tree rows (written by the browser)
    pub expanded_rows_cookie: String,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            admin_dir: "admin".to_string(),
            login_url: "/admin/login".to_string(),
            base_path: "/admin/page".to_string(),
            default_status: PageStatus::Draft,
            default_filter_id: String::new(),
            allow_html_title: false,
            filters: Vec::new(),
            behaviors: Vec::new(),
            session_secret: [0u8; 32],
            session_cookie_name: "editor_session".to_string(),
            flash_cookie_name: "flash".to_string(),
            flash_ttl: Duration::from_secs(300),
            expanded_rows_cookie: "expanded_rows".to_string(),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
        }
    }
}

impl PagesConfig {
    /// Create config with a random session secret (for development)
    pub fn with_random_secret() -> Self {
        Self {
            session_secret: platform::crypto::random_secret(),
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    /// Overlay environment variables on top of `base`
    ///
    /// Unset variables keep the value from `base`.
    pub fn from_env_with(base: Self) -> Result<Self, ConfigError> {
        Self::from_lookup(base, |name| std::env::var(name).ok())
    }

    /// Overlay environment variables on top of [`PagesConfig::default`]
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(Self::default())
    }

    fn from_lookup<F>(base: Self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = base;

        if let Some(value) = lookup("SESSION_SECRET") {
            config.session_secret = platform::crypto::from_base64_standard(value.trim())
                .ok()
                .and_then(|bytes| <[u8; 32]>::try_from(bytes).ok())
                .ok_or(ConfigError::Invalid {
                    name: "SESSION_SECRET",
                    expected: "32 bytes of standard base64",
                    value: "<redacted>".to_string(),
                })?;
        }
        if let Some(value) = lookup("ADMIN_DIR") {
            config.admin_dir = value.trim().trim_matches('/').to_string();
        }
        if let Some(value) = lookup("LOGIN_URL") {
            config.login_url = value;
        }
        if let Some(value) = lookup("PAGES_BASE_PATH") {
            config.base_path = value.trim_end_matches('/').to_string();
        }
        if let Some(value) = lookup("DEFAULT_STATUS_ID") {
            config.default_status = value
                .trim()
                .parse::<i16>()
                .ok()
                .and_then(PageStatus::from_id)
                .ok_or(ConfigError::Invalid {
                    name: "DEFAULT_STATUS_ID",
                    expected: "one of 1, 10, 100, 101, 200",
                    value,
                })?;
        }
        if let Some(value) = lookup("DEFAULT_FILTER_ID") {
            config.default_filter_id = value.trim().to_string();
        }
        if let Some(value) = lookup("ALLOW_HTML_TITLE") {
            config.allow_html_title = match value.trim() {
                "on" => true,
                "off" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "ALLOW_HTML_TITLE",
                        expected: "on or off",
                        value,
                    });
                }
            };
        }
        if let Some(value) = lookup("PAGE_FILTERS") {
            config.filters = split_list(&value);
        }
        if let Some(value) = lookup("PAGE_BEHAVIORS") {
            config.behaviors = split_list(&value);
        }

        Ok(config)
    }

    /// Flash TTL in milliseconds
    pub fn flash_ttl_ms(&self) -> i64 {
        self.flash_ttl.as_millis() as i64
    }

    /// Absolute URL of a page action, e.g. `url("edit/4")`; `""` is the index
    pub fn url(&self, action: &str) -> String {
        match (self.base_path.is_empty(), action.is_empty()) {
            (true, true) => "/".to_string(),
            (false, true) => self.base_path.clone(),
            _ => format!("{}/{}", self.base_path, action),
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_overlay_reads_every_variable() {
        let config = PagesConfig::from_lookup(
            PagesConfig::default(),
            lookup(&[
                ("ADMIN_DIR", "/backstage/"),
                ("DEFAULT_STATUS_ID", "100"),
                ("DEFAULT_FILTER_ID", "markdown"),
                ("ALLOW_HTML_TITLE", "on"),
                ("PAGE_FILTERS", "markdown, textile,"),
                ("PAGE_BEHAVIORS", "archive"),
                ("PAGES_BASE_PATH", "/backstage/page/"),
            ]),
        )
        .unwrap();

        assert_eq!(config.admin_dir, "backstage");
        assert_eq!(config.default_status, PageStatus::Published);
        assert_eq!(config.default_filter_id, "markdown");
        assert!(config.allow_html_title);
        assert_eq!(config.filters, vec!["markdown", "textile"]);
        assert_eq!(config.behaviors, vec!["archive"]);
        assert_eq!(config.url("edit/3"), "/backstage/page/edit/3");
    }

    #[test]
    fn test_unset_variables_keep_base() {
        let base = PagesConfig::development();
        let secret = base.session_secret;
        let config = PagesConfig::from_lookup(base, lookup(&[])).unwrap();
        assert_eq!(config.session_secret, secret);
        assert!(!config.cookie_secure);
        assert_eq!(config.url(""), "/admin/page");
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad_status =
            PagesConfig::from_lookup(PagesConfig::default(), lookup(&[("DEFAULT_STATUS_ID", "7")]));
        assert!(bad_status.is_err());

        let bad_flag = PagesConfig::from_lookup(
            PagesConfig::default(),
            lookup(&[("ALLOW_HTML_TITLE", "yes")]),
        );
        assert!(bad_flag.is_err());

        let short_secret =
            PagesConfig::from_lookup(PagesConfig::default(), lookup(&[("SESSION_SECRET", "AAAA")]));
        assert!(short_secret.is_err());
    }
}
