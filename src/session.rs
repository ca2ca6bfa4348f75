use std::collections::HashSet;

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use base64::{STANDARD, STANDARD_NO_PAD, URL_SAFE_NO_PAD, decode_config, encode_config};
use jwt_simple::algorithms::MACLike;
use jwt_simple::prelude::{
    Claims, Duration as JwtDuration, HS256Key, NoCustomClaims, VerificationOptions,
};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::config;

/// The two portals carry separate sessions; a resident cookie never grants
/// admin access. The role is bound into the token audience, not just the
/// cookie name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn cookie_name(&self) -> &'static str {
        match self {
            Role::User => "complaintdesk_user",
            Role::Admin => "complaintdesk_admin",
        }
    }

    fn audience(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionKeys {
    key: HS256Key,
    issuer: String,
    token_ttl: time::Duration,
    cookie_secure: bool,
}

#[derive(Debug)]
pub enum SessionError {
    InvalidKey,
    InvalidToken,
    MissingExpiry,
    MissingSubject,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::InvalidKey => f.write_str("invalid session key"),
            SessionError::InvalidToken => f.write_str("invalid session token"),
            SessionError::MissingExpiry => f.write_str("session token missing expiry"),
            SessionError::MissingSubject => f.write_str("session token missing subject"),
        }
    }
}

impl SessionKeys {
    pub fn from_config(config: &config::AppConfig) -> Result<Self, SessionError> {
        let key_bytes = decode_key(&config.auth.key)?;
        Ok(Self {
            key: HS256Key::from_bytes(&key_bytes),
            issuer: config.app_name.clone(),
            token_ttl: config.auth.token_ttl,
            cookie_secure: config.auth.cookie_secure,
        })
    }

    pub fn issue(&self, role: Role, subject: &str) -> Result<String, SessionError> {
        let ttl_seconds = self.token_ttl.whole_seconds();
        if ttl_seconds <= 0 {
            return Err(SessionError::InvalidToken);
        }
        let claims = Claims::create(JwtDuration::from_secs(ttl_seconds as u64))
            .with_issuer(&self.issuer)
            .with_audience(role.audience())
            .with_subject(subject);
        self.key
            .authenticate(claims)
            .map_err(|_| SessionError::InvalidToken)
    }

    /// Set-Cookie value logging the role in.
    pub fn login_cookie(&self, role: Role, subject: &str) -> Result<String, SessionError> {
        let token = self.issue(role, subject)?;
        let max_age = self.token_ttl.whole_seconds().max(0);
        let mut cookie = format!(
            "{}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}",
            role.cookie_name()
        );
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        Ok(cookie)
    }

    /// Set-Cookie value logging the role out.
    pub fn clear_cookie(&self, role: Role) -> String {
        let mut cookie = format!(
            "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
            role.cookie_name()
        );
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    pub fn verify(&self, role: Role, token: &str) -> Result<String, SessionError> {
        let mut options = VerificationOptions::default();
        let mut issuers = HashSet::new();
        issuers.insert(self.issuer.clone());
        options.allowed_issuers = Some(issuers);
        let mut audiences = HashSet::new();
        audiences.insert(role.audience().to_string());
        options.allowed_audiences = Some(audiences);

        let claims = self
            .key
            .verify_token::<NoCustomClaims>(token, Some(options))
            .map_err(|_| SessionError::InvalidToken)?;

        if claims.expires_at.is_none() {
            return Err(SessionError::MissingExpiry);
        }

        let subject = claims.subject.ok_or(SessionError::MissingSubject)?;
        if subject.trim().is_empty() {
            return Err(SessionError::MissingSubject);
        }

        Ok(subject)
    }

    /// The session context for one request: the verified subject of the
    /// role's cookie, or `None`.
    pub fn current(&self, role: Role, headers: &HeaderMap) -> Option<String> {
        let token = session_cookie(headers, role.cookie_name())?;
        self.verify(role, token).ok()
    }
}

fn session_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    for header in headers.get_all(COOKIE).iter() {
        if let Ok(raw) = header.to_str()
            && let Some(value) = cookie_from_header(raw, name)
        {
            return Some(value);
        }
    }
    None
}

fn cookie_from_header<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    for part in header.split(';') {
        let trimmed = part.trim();
        if let Some((cookie_name, cookie_value)) = trimmed.split_once('=')
            && cookie_name == name
        {
            return Some(cookie_value);
        }
    }
    None
}

fn decode_key(raw: &str) -> Result<Vec<u8>, SessionError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SessionError::InvalidKey);
    }

    let decoded = decode_config(trimmed, URL_SAFE_NO_PAD)
        .or_else(|_| decode_config(trimmed, STANDARD))
        .or_else(|_| decode_config(trimmed, STANDARD_NO_PAD))
        .map_err(|_| SessionError::InvalidKey)?;

    if decoded.is_empty() {
        return Err(SessionError::InvalidKey);
    }

    Ok(decoded)
}

pub fn generate_session_key() -> Result<String, SessionError> {
    let mut rng = OsRng;
    generate_session_key_with_rng(&mut rng)
}

pub(crate) fn generate_session_key_with_rng<R: RngCore + CryptoRng>(
    rng: &mut R,
) -> Result<String, SessionError> {
    let mut bytes = [0u8; 32];
    rng.fill_bytes(&mut bytes);
    let encoded = encode_config(bytes, URL_SAFE_NO_PAD);
    if encoded.is_empty() {
        return Err(SessionError::InvalidKey);
    }
    Ok(encoded)
}
