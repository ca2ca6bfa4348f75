use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub app_name: String,
    pub auth: AuthConfig,
    pub admin: AdminConfig,
    /// Artificial latency before a complaint submission is written.
    pub submit_delay: Duration,
    /// Artificial latency before a chat message is written.
    pub message_delay: Duration,
}

#[derive(Clone)]
pub struct AuthConfig {
    /// URL-safe base64 HS256 key for session tokens.
    pub key: String,
    pub token_ttl: time::Duration,
    pub cookie_secure: bool,
}

#[derive(Clone)]
pub struct AdminConfig {
    pub name: String,
    /// Argon2 PHC string; an empty value rejects every login attempt.
    pub password_hash: String,
}

#[cfg(test)]
impl Default for AppConfig {
    fn default() -> Self {
        let key = base64::encode_config(b"complaintdesk-tests", base64::URL_SAFE_NO_PAD);
        Self {
            data_dir: "/".into(),
            app_name: "Complaints Desk".to_string(),
            auth: AuthConfig {
                key,
                token_ttl: time::Duration::days(1),
                cookie_secure: false,
            },
            admin: AdminConfig {
                name: "admin".to_string(),
                password_hash: String::new(),
            },
            submit_delay: Duration::ZERO,
            message_delay: Duration::ZERO,
        }
    }
}
