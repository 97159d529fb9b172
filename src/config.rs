use std::{env, fmt, fs, str::FromStr};

use chrono::Duration;
use jsonwebtoken::Algorithm;

const DEFAULT_TOKEN_DURATION: &str = "1d";

/// Runtime settings, read once at startup.
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub server_port: u16,
    pub server_host: String,
    /// RSA private key (PEM) used to sign access tokens.
    pub private_key: String,
    /// RSA public key (PEM) used to verify access tokens.
    pub public_key: String,
    pub token_algorithm: Algorithm,
    pub token_duration: Duration,
    pub bcrypt_cost: u32,
}

/// Why the configuration could not be loaded.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, reason } => write!(f, "{} is invalid: {}", key, reason),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let database_max_connections =
            parse_or("DATABASE_MAX_CONNECTIONS", lookup("DATABASE_MAX_CONNECTIONS"), 5)?;
        let server_port = parse_or("SERVER_PORT", lookup("SERVER_PORT"), 8080)?;
        let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let private_key = key_material(&lookup, "PRIVATE_KEY", "PRIVATE_KEY_FILE")?;
        let public_key = key_material(&lookup, "PUBLIC_KEY", "PUBLIC_KEY_FILE")?;

        let token_algorithm = match lookup("JWT_ALGORITHM") {
            Some(raw) => parse_algorithm(&raw).map_err(|reason| ConfigError::Invalid {
                key: "JWT_ALGORITHM",
                reason,
            })?,
            None => Algorithm::RS512,
        };

        let raw_duration = lookup("ACCESS_TOKEN_EXPIRE_DURATION")
            .unwrap_or_else(|| DEFAULT_TOKEN_DURATION.to_string());
        let token_duration =
            parse_duration(&raw_duration).map_err(|reason| ConfigError::Invalid {
                key: "ACCESS_TOKEN_EXPIRE_DURATION",
                reason,
            })?;

        let bcrypt_cost = parse_or("BCRYPT_COST", lookup("BCRYPT_COST"), bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                reason: format!("{} is outside 4..=31", bcrypt_cost),
            });
        }

        Ok(Self {
            database_url,
            database_max_connections,
            server_port,
            server_host,
            private_key,
            public_key,
            token_algorithm,
            token_duration,
            bcrypt_cost,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<T: FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            reason: format!("'{}' is not a number", raw),
        }),
        None => Ok(default),
    }
}

/// Reads a PEM either inline from `inline_key` or from the file named by `file_key`.
fn key_material<F>(
    lookup: &F,
    inline_key: &'static str,
    file_key: &'static str,
) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let pem = match (lookup(inline_key), lookup(file_key)) {
        (Some(inline), _) => unescape_pem(&inline),
        (None, Some(path)) => fs::read_to_string(&path).map_err(|e| ConfigError::Invalid {
            key: file_key,
            reason: format!("cannot read {}: {}", path, e),
        })?,
        (None, None) => return Err(ConfigError::Missing(inline_key)),
    };

    if pem.trim().is_empty() {
        return Err(ConfigError::Missing(inline_key));
    }
    Ok(pem)
}

/// Single-line env vars carry PEM newlines as a literal `\n`.
pub fn unescape_pem(raw: &str) -> String {
    raw.replace("\\n", "\n")
}

/// Only RSA-keyed algorithms are accepted since the key pair is RSA.
pub fn parse_algorithm(raw: &str) -> Result<Algorithm, String> {
    let algorithm = Algorithm::from_str(raw.trim()).map_err(|e| e.to_string())?;
    match algorithm {
        Algorithm::RS256
        | Algorithm::RS384
        | Algorithm::RS512
        | Algorithm::PS256
        | Algorithm::PS384
        | Algorithm::PS512 => Ok(algorithm),
        other => Err(format!("{:?} does not use an RSA key pair", other)),
    }
}

/// Parses `3600`, `30s`, `15m`, `12h`, `1d` or `2w` into a positive duration.
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);

    let amount: i64 = digits
        .parse()
        .map_err(|_| format!("'{}' does not start with a number", raw))?;
    if amount <= 0 {
        return Err(format!("'{}' must be greater than zero", raw));
    }

    let duration = match unit.trim() {
        "" | "s" => Duration::try_seconds(amount),
        "m" => Duration::try_minutes(amount),
        "h" => Duration::try_hours(amount),
        "d" => Duration::try_days(amount),
        "w" => Duration::try_weeks(amount),
        other => return Err(format!("unknown unit '{}'", other)),
    };
    duration.ok_or_else(|| format!("'{}' is out of range", raw))
}
