//! One-shot flash notices carried in a private (encrypted + signed) cookie.
//!
//! `push_flash` queues a notice for the next page render; `take_flash` drains
//! the queue. The cookie key is derived from the configured `SECRET_KEY`.

use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar};
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "rolodex_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    pub fn css_class(self) -> &'static str {
        match self {
            FlashLevel::Success => "flash-success",
            FlashLevel::Error => "flash-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

pub fn push_flash(
    jar: PrivateCookieJar,
    level: FlashLevel,
    message: impl Into<String>,
) -> PrivateCookieJar {
    let mut pending = peek(&jar);
    pending.push(Flash {
        level,
        message: message.into(),
    });
    let payload = serde_json::to_string(&pending).unwrap_or_default();
    jar.add(
        Cookie::build((FLASH_COOKIE, payload))
            .path("/")
            .http_only(true),
    )
}

/// Drain queued notices, clearing the cookie.
pub fn take_flash(jar: PrivateCookieJar) -> (PrivateCookieJar, Vec<Flash>) {
    let flashes = peek(&jar);
    let jar = jar.remove(Cookie::build((FLASH_COOKIE, "")).path("/"));
    (jar, flashes)
}

fn peek(jar: &PrivateCookieJar) -> Vec<Flash> {
    jar.get(FLASH_COOKIE)
        .and_then(|cookie| serde_json::from_str(cookie.value()).ok())
        .unwrap_or_default()
}

/// Derive the cookie key from the configured secret. `Key::derive_from`
/// wants at least 32 bytes of master material, so the secret is cycled to
/// fill 64.
pub fn signing_key(secret: &str) -> Key {
    let secret = if secret.is_empty() {
        "fallback-dev-key"
    } else {
        secret
    };
    let mut material = Vec::with_capacity(64 + secret.len());
    while material.len() < 64 {
        material.extend_from_slice(secret.as_bytes());
    }
    Key::derive_from(&material)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_then_take_round_trips() {
        let jar = PrivateCookieJar::new(signing_key("test-secret-key"));
        let jar = push_flash(jar, FlashLevel::Success, "Contact created successfully!");
        let jar = push_flash(jar, FlashLevel::Error, "Contact not found!");
        let (jar, flashes) = take_flash(jar);
        assert_eq!(flashes.len(), 2);
        assert_eq!(flashes[0].level, FlashLevel::Success);
        assert_eq!(flashes[1].message, "Contact not found!");
        let (_, drained) = take_flash(jar);
        assert!(drained.is_empty());
    }

    #[test]
    fn short_secret_still_yields_a_key() {
        // "fallback-dev-key" is shorter than the cookie key minimum
        let _ = signing_key("fallback-dev-key");
        let _ = signing_key("");
    }
}
