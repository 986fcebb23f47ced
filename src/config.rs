use std::env;

use reqwest::Url;
use serenity::model::id::UserId;

use crate::error::ConfigError;

pub(crate) const DEFAULT_PREFIX: &str = "!";

pub(crate) struct Config {
    pub discord_token: String,
    pub storage: StorageConfig,
    pub prefix: String,
    pub owner: Option<UserId>,
}

#[derive(Clone, Debug)]
pub(crate) struct StorageConfig {
    pub endpoint: Url,
    pub token: Option<String>,
}

impl Config {
    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let discord_token = get("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let endpoint = match (get("STORAGE_URL"), get("STORAGE_HOST")) {
            (Some(url), _) => parse_endpoint("STORAGE_URL", &url)?,
            (None, Some(host)) => {
                let address = match get("STORAGE_PORT") {
                    Some(port) => {
                        let port: u16 = port.trim().parse().map_err(|_| ConfigError::Invalid {
                            name: "STORAGE_PORT",
                            reason: format!("{port:?} is not a port number"),
                        })?;
                        format!("{}:{port}", host.trim())
                    }
                    None => host,
                };
                parse_endpoint("STORAGE_HOST", &address)?
            }
            (None, None) => return Err(ConfigError::Missing("STORAGE_URL")),
        };

        let owner = match get("OWNER_ID") {
            Some(id) => match id.trim().parse::<u64>() {
                Ok(id) if id != 0 => Some(UserId::new(id)),
                _ => return Err(ConfigError::Invalid { name: "OWNER_ID", reason: format!("{id:?} is not a user id") }),
            },
            None => None,
        };

        Ok(Self {
            discord_token,
            storage: StorageConfig { endpoint, token: get("STORAGE_TOKEN") },
            prefix: get("COMMAND_PREFIX").unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            owner,
        })
    }
}

/// Accepts a full URL or a bare `host[:port][/path]`, which is assumed to be plain http.
fn parse_endpoint(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    let candidate = if raw.contains("://") { raw.to_string() } else { format!("http://{raw}") };
    let url = Url::parse(&candidate).map_err(|e| ConfigError::Invalid { name, reason: e.to_string() })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ConfigError::Invalid { name, reason: format!("unsupported scheme {scheme}") }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn minimal_configuration() {
        let config = load(&[("DISCORD_TOKEN", "abc"), ("STORAGE_URL", "https://photos.example.com/upload")]).unwrap();
        assert_eq!(config.discord_token, "abc");
        assert_eq!(config.storage.endpoint.as_str(), "https://photos.example.com/upload");
        assert_eq!(config.storage.token, None);
        assert_eq!(config.prefix, "!");
        assert_eq!(config.owner, None);
    }

    #[test]
    fn token_is_required() {
        let err = load(&[("STORAGE_URL", "http://localhost")]).err();
        assert_eq!(err, Some(ConfigError::Missing("DISCORD_TOKEN")));
    }

    #[test]
    fn storage_is_required() {
        let err = load(&[("DISCORD_TOKEN", "abc")]).err();
        assert_eq!(err, Some(ConfigError::Missing("STORAGE_URL")));
    }

    #[test]
    fn bare_host_and_port() {
        let config =
            load(&[("DISCORD_TOKEN", "abc"), ("STORAGE_HOST", "192.168.1.20"), ("STORAGE_PORT", "8000")]).unwrap();
        assert_eq!(config.storage.endpoint.as_str(), "http://192.168.1.20:8000/");
    }

    #[test]
    fn url_takes_precedence_over_host() {
        let config = load(&[
            ("DISCORD_TOKEN", "abc"),
            ("STORAGE_URL", "storage.local:9000/images"),
            ("STORAGE_HOST", "ignored"),
        ])
        .unwrap();
        assert_eq!(config.storage.endpoint.as_str(), "http://storage.local:9000/images");
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = load(&[("DISCORD_TOKEN", "abc"), ("STORAGE_HOST", "localhost"), ("STORAGE_PORT", "http")]).err();
        assert!(matches!(err, Some(ConfigError::Invalid { name: "STORAGE_PORT", .. })));
    }

    #[test]
    fn unsupported_scheme_is_rejected() {
        let err = load(&[("DISCORD_TOKEN", "abc"), ("STORAGE_URL", "ftp://files.example.com")]).err();
        assert!(matches!(err, Some(ConfigError::Invalid { name: "STORAGE_URL", .. })));
    }

    #[test]
    fn optional_values() {
        let config = load(&[
            ("DISCORD_TOKEN", "abc"),
            ("STORAGE_URL", "http://localhost"),
            ("STORAGE_TOKEN", "secret"),
            ("COMMAND_PREFIX", "?"),
            ("OWNER_ID", "80351110224678912"),
        ])
        .unwrap();
        assert_eq!(config.storage.token.as_deref(), Some("secret"));
        assert_eq!(config.prefix, "?");
        assert_eq!(config.owner, Some(UserId::new(80351110224678912)));
    }

    #[test]
    fn zero_owner_is_rejected() {
        let err = load(&[("DISCORD_TOKEN", "abc"), ("STORAGE_URL", "http://localhost"), ("OWNER_ID", "0")]).err();
        assert!(matches!(err, Some(ConfigError::Invalid { name: "OWNER_ID", .. })));
    }
}
