use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration as StdDuration;
use time::Duration;

#[allow(clippy::large_enum_variant)]
pub(crate) enum RunOutcome {
    Serve {
        addr: SocketAddr,
        config: complaintdesk::config::AppConfig,
    },
    Exit(i32),
}

pub(crate) fn run() -> RunOutcome {
    let cli = Cli::parse();
    if let Some(Command::SessionKey) = cli.command {
        let code = run_session_key();
        return RunOutcome::Exit(code);
    }
    if let Some(Command::HashPassword(args)) = cli.command {
        let code = run_hash_password(args);
        return RunOutcome::Exit(code);
    }

    let data_dir = match cli.data_dir.as_ref() {
        Some(data_dir) => data_dir.clone(),
        None => {
            eprintln!("error: --data-dir is required unless using a subcommand");
            return RunOutcome::Exit(2);
        }
    };

    let admin = match resolve_admin_config(&cli) {
        Ok(admin) => admin,
        Err(err) => {
            eprintln!("error: {err}");
            return RunOutcome::Exit(2);
        }
    };

    let auth = match resolve_auth_config(&cli) {
        Ok(auth) => auth,
        Err(err) => {
            eprintln!("error: {err}");
            return RunOutcome::Exit(2);
        }
    };

    RunOutcome::Serve {
        addr: cli.listen,
        config: complaintdesk::config::AppConfig {
            data_dir,
            app_name: cli.app_name,
            auth,
            admin,
            submit_delay: StdDuration::from_millis(cli.submit_delay_ms),
            message_delay: StdDuration::from_millis(cli.message_delay_ms),
        },
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "complaintdesk",
    version,
    about = "Complaint intake and triage server for building residents"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    /// Directory holding the persisted collections (created if missing).
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[arg(long, default_value = "Complaints Desk")]
    app_name: String,
    #[arg(long, default_value = "127.0.0.1:8080")]
    listen: SocketAddr,
    #[arg(long, env = "COMPLAINTDESK_ADMIN_NAME", default_value = "admin")]
    admin_name: String,
    /// Argon2 hash from `complaintdesk hash-password`.
    #[arg(long, env = "COMPLAINTDESK_ADMIN_PASSWORD_HASH")]
    admin_password_hash: Option<String>,
    /// URL-safe base64 key from `complaintdesk session-key`. Generated per
    /// run when omitted, so sessions then end with the process.
    #[arg(long, env = "COMPLAINTDESK_SESSION_KEY")]
    session_key: Option<String>,
    #[arg(long, env = "COMPLAINTDESK_SESSION_TTL")]
    session_ttl: Option<String>,
    #[arg(long, env = "COMPLAINTDESK_COOKIE_SECURE")]
    cookie_secure: bool,
    #[arg(long, default_value_t = 1500)]
    submit_delay_ms: u64,
    #[arg(long, default_value_t = 1000)]
    message_delay_ms: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a fresh session signing key.
    SessionKey,
    /// Print the argon2 hash for an admin password.
    HashPassword(HashPasswordArgs),
}

#[derive(Args, Debug)]
struct HashPasswordArgs {
    password: String,
}

fn run_session_key() -> i32 {
    let key = match complaintdesk::session::generate_session_key() {
        Ok(key) => key,
        Err(err) => {
            eprintln!("failed to generate session key: {err}");
            return 1;
        }
    };
    println!("{key}");
    0
}

fn run_hash_password(args: HashPasswordArgs) -> i32 {
    if args.password.trim().is_empty() {
        eprintln!("error: password cannot be empty");
        return 2;
    }
    println!("{}", complaintdesk::repositories::hash_password(&args.password));
    0
}

fn resolve_admin_config(cli: &Cli) -> Result<complaintdesk::config::AdminConfig, String> {
    let name = cli.admin_name.trim();
    if name.is_empty() {
        return Err("admin name cannot be empty".to_string());
    }
    let password_hash = cli
        .admin_password_hash
        .as_deref()
        .ok_or("--admin-password-hash is required; generate one with `complaintdesk hash-password <password>`")?
        .trim();
    if password_hash.is_empty() {
        return Err("admin password hash cannot be empty".to_string());
    }

    Ok(complaintdesk::config::AdminConfig {
        name: name.to_string(),
        password_hash: password_hash.to_string(),
    })
}

fn resolve_auth_config(cli: &Cli) -> Result<complaintdesk::config::AuthConfig, String> {
    let key = match cli.session_key.as_deref() {
        Some(key) => {
            let key = key.trim();
            if key.is_empty() {
                return Err("session key cannot be empty".to_string());
            }
            key.to_string()
        }
        None => {
            let key = complaintdesk::session::generate_session_key()
                .map_err(|err| format!("failed to generate session key: {err}"))?;
            eprintln!("note: generated an ephemeral session key; sessions will not survive a restart");
            key
        }
    };

    let token_ttl = match cli.session_ttl.as_deref() {
        Some(raw) => parse_session_ttl(raw)?,
        None => default_session_ttl(),
    };

    Ok(complaintdesk::config::AuthConfig {
        key,
        token_ttl,
        cookie_secure: cli.cookie_secure,
    })
}

fn default_session_ttl() -> Duration {
    Duration::days(14)
}

fn parse_session_ttl(raw: &str) -> Result<Duration, String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err("session ttl cannot be empty".to_string());
    }

    let (amount, unit) = match value.chars().last() {
        Some(ch) if ch.is_ascii_alphabetic() => {
            (&value[..value.len() - 1], ch.to_ascii_lowercase())
        }
        _ => (value, 's'),
    };

    let amount: i64 = amount
        .parse()
        .map_err(|_| format!("invalid session ttl '{value}'; expected <number>[s|m|h|d]"))?;

    if amount <= 0 {
        return Err("session ttl must be greater than 0".to_string());
    }

    match unit {
        's' => Ok(Duration::seconds(amount)),
        'm' => Ok(Duration::minutes(amount)),
        'h' => Ok(Duration::hours(amount)),
        'd' => Ok(Duration::days(amount)),
        _ => Err(format!(
            "invalid session ttl '{value}'; expected <number>[s|m|h|d]"
        )),
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;

    fn base_cli() -> Cli {
        Cli {
            command: None,
            data_dir: Some(PathBuf::from("/")),
            app_name: "Complaints Desk".to_string(),
            listen: "127.0.0.1:8080".parse().expect("addr"),
            admin_name: "admin".to_string(),
            admin_password_hash: None,
            session_key: None,
            session_ttl: None,
            cookie_secure: false,
            submit_delay_ms: 1500,
            message_delay_ms: 1000,
        }
    }

    #[test]
    fn parse_session_ttl__should_parse_seconds_when_unit_missing() {
        // When
        let duration = parse_session_ttl("30").expect("parse ttl");

        // Then
        assert_eq!(duration, Duration::seconds(30));
    }

    #[test]
    fn parse_session_ttl__should_parse_units() {
        // When
        let duration = parse_session_ttl("15m").expect("parse ttl");

        // Then
        assert_eq!(duration, Duration::minutes(15));
    }

    #[test]
    fn parse_session_ttl__should_reject_invalid_values() {
        // Then
        assert!(parse_session_ttl("").is_err());
        assert!(parse_session_ttl("0").is_err());
        assert!(parse_session_ttl("abc").is_err());
    }

    #[test]
    fn resolve_admin_config__should_require_password_hash() {
        // Given
        let cli = base_cli();

        // When
        let result = resolve_admin_config(&cli);

        // Then
        assert!(result.is_err());
    }

    #[test]
    fn resolve_admin_config__should_accept_hash_and_trim() {
        // Given
        let mut cli = base_cli();
        cli.admin_password_hash = Some("  $argon2id$v=19$stub  ".to_string());

        // When
        let admin = resolve_admin_config(&cli).expect("admin config");

        // Then
        assert_eq!(admin.name, "admin");
        assert_eq!(admin.password_hash, "$argon2id$v=19$stub");
    }

    #[test]
    fn resolve_auth_config__should_generate_key_when_missing() {
        // Given
        let cli = base_cli();

        // When
        let auth = resolve_auth_config(&cli).expect("auth config");

        // Then
        assert!(!auth.key.is_empty());
        assert_eq!(auth.token_ttl, default_session_ttl());
        assert!(!auth.cookie_secure);
    }

    #[test]
    fn resolve_auth_config__should_reject_blank_key() {
        // Given
        let mut cli = base_cli();
        cli.session_key = Some("   ".to_string());

        // When
        let result = resolve_auth_config(&cli);

        // Then
        assert!(result.is_err());
    }
}
