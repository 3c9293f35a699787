use crate::types::{AlertsError, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable holding a previously encoded credential. When set,
/// the browser cookie store is never touched.
pub const SESSION_ENV_VAR: &str = "ALERTS_SESSION";

/// Session cookies the alerting service requires. All three must be present.
pub const REQUIRED_COOKIES: [&str; 3] = ["SID", "HSID", "SSID"];

/// One browser session cookie, in the shape the service expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookie {
    pub key: String,
    pub value: String,
    pub domain: String,
}

/// Obtain the encoded session credential.
///
/// A value from the environment is used verbatim. Otherwise the local
/// browser's cookie store is read, the required cookies are encoded, and the
/// result is printed so the operator can persist it and skip the cookie jar
/// on future runs.
pub fn resolve(cookie_domain: &str) -> Result<String> {
    if let Ok(stored) = env::var(SESSION_ENV_VAR) {
        if !stored.is_empty() {
            debug!("Using session credential from {}", SESSION_ENV_VAR);
            return Ok(stored);
        }
    }

    warn!("Reading browser cookie store...");
    let store = default_cookie_store().ok_or(AlertsError::NoCookieStore)?;
    let cookies = read_browser_cookies(&store, cookie_domain)?;
    let encoded = encode_cookies(&cookies)?;

    println!(
        "Add this to your .env file to avoid reading the browser's cookie jar\n{}=\"{}\"\n",
        SESSION_ENV_VAR, encoded
    );
    Ok(encoded)
}

/// Locate the Chromium-family cookie database for the default profile.
fn default_cookie_store() -> Option<PathBuf> {
    let config = dirs::config_dir()?;
    let candidates = [
        config.join("google-chrome/Default/Cookies"),
        config.join("chromium/Default/Cookies"),
    ];
    candidates.into_iter().find(|p| p.exists())
}

/// Read the required session cookies for `domain` from a Chromium cookie
/// database. Fails on the first cookie that is absent or unreadable.
pub fn read_browser_cookies(db_path: &Path, domain: &str) -> Result<Vec<SessionCookie>> {
    debug!("Opening cookie store {}", db_path.display());
    let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;

    let mut cookies = Vec::with_capacity(REQUIRED_COOKIES.len());
    for name in REQUIRED_COOKIES {
        // host_key is stored as "domain" or ".domain"; prefer the most
        // specific match the browser kept.
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM cookies \
                 WHERE (host_key = ?1 OR host_key = '.' || ?1 OR host_key LIKE '%.' || ?1) \
                 AND name = ?2 \
                 ORDER BY LENGTH(host_key) DESC LIMIT 1",
                (domain, name),
                |row| row.get(0),
            )
            .optional()?;

        match value {
            Some(v) if !v.is_empty() => cookies.push(SessionCookie {
                key: name.to_string(),
                value: v,
                domain: domain.to_string(),
            }),
            Some(_) => {
                return Err(AlertsError::UnreadableCookie {
                    cookie: name.to_string(),
                    env_var: SESSION_ENV_VAR,
                })
            }
            None => {
                return Err(AlertsError::MissingCookie {
                    cookie: name.to_string(),
                })
            }
        }
    }

    Ok(cookies)
}

/// Encode cookies into the single-string credential format: base64 of the
/// JSON triple list.
pub fn encode_cookies(cookies: &[SessionCookie]) -> Result<String> {
    let json = serde_json::to_string(cookies)?;
    Ok(BASE64.encode(json))
}

/// Decode a credential produced by [`encode_cookies`].
pub fn decode_cookies(encoded: &str) -> Result<Vec<SessionCookie>> {
    let raw = BASE64
        .decode(encoded.trim())
        .map_err(|e| AlertsError::BadCredential(format!("invalid base64: {}", e)))?;
    let json = String::from_utf8(raw)
        .map_err(|e| AlertsError::BadCredential(format!("invalid UTF-8: {}", e)))?;
    let cookies: Vec<SessionCookie> = serde_json::from_str(&json)?;
    if cookies.is_empty() {
        return Err(AlertsError::BadCredential("empty cookie list".to_string()));
    }
    Ok(cookies)
}

/// Render a credential as an HTTP `Cookie` header value.
pub fn cookie_header(encoded: &str) -> Result<String> {
    let cookies = decode_cookies(encoded)?;
    let pairs: Vec<String> = cookies
        .iter()
        .map(|c| format!("{}={}", c.key, c.value))
        .collect();
    Ok(pairs.join("; "))
}
