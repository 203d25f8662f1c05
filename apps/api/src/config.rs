use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Default for drawing debug cell outlines on exported sheets.
    pub show_borders: bool,
    /// Upper bound on labels accepted by a single pack or export request.
    pub max_labels: usize,
    /// Upper bound on partial sheets per request. Leftovers are echoed back in a
    /// response header, so this keeps that header small.
    pub max_partials: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            show_borders: match std::env::var("SHOW_BORDERS") {
                Ok(value) => parse_flag(&value)
                    .with_context(|| format!("SHOW_BORDERS must be true or false (got '{value}')"))?,
                Err(_) => false,
            },
            max_labels: std::env::var("MAX_LABELS")
                .unwrap_or_else(|_| "10000".to_string())
                .parse::<usize>()
                .context("MAX_LABELS must be a non-negative integer")?,
            max_partials: std::env::var("MAX_PARTIALS")
                .unwrap_or_else(|_| "32".to_string())
                .parse::<usize>()
                .context("MAX_PARTIALS must be a non-negative integer")?,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("true"), Some(true));
        assert_eq!(parse_flag(" ON "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag(""), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
