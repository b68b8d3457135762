use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
    /// Allowed CORS origins. `*` allows any origin.
    /// Set COFFEE_SHOP__API__CORS_ALLOWED_ORIGINS in production.
    #[serde(default = "default_cors_allowed_origins")]
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
    /// Drops every drink and seeds the demo drink on startup.
    #[serde(default)]
    pub reset_on_start: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Identity provider domain, e.g. `tenant.us.auth0.com`.
    pub domain: String,
    #[serde(default = "default_audience")]
    pub audience: String,
    /// Overrides `https://{domain}/.well-known/jwks.json`.
    #[serde(default)]
    pub jwks_url: Option<String>,
    #[serde(default = "default_jwks_timeout")]
    pub jwks_timeout_secs: u64,
}

impl AuthConfig {
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.domain)
    }

    pub fn jwks_url(&self) -> String {
        match &self.jwks_url {
            Some(url) if !url.trim().is_empty() => url.clone(),
            _ => format!("https://{}/.well-known/jwks.json", self.domain),
        }
    }
}

fn default_bind() -> String { "0.0.0.0".to_string() }
fn default_api_port() -> u16 { 5000 }
fn default_db_path() -> String { "./coffee_shop.db".to_string() }
fn default_audience() -> String { "coffee_shop".to_string() }
fn default_jwks_timeout() -> u64 { 5 }
fn default_cors_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

pub fn validate(cfg: &Config) -> Result<()> {
    let domain = cfg.auth.domain.as_str();
    if domain.trim().is_empty() {
        anyhow::bail!(
            "CONFIG ERROR: auth.domain is required. \
            Set COFFEE_SHOP__AUTH__DOMAIN to the identity provider domain."
        );
    }
    if domain.contains("://") || domain.contains('/') {
        anyhow::bail!(
            "CONFIG ERROR: auth.domain must be a bare host name without scheme or path (got '{}')",
            cfg.auth.domain
        );
    }
    // The issuer is compared byte for byte against the token's `iss`.
    if domain.chars().any(char::is_whitespace) {
        anyhow::bail!(
            "CONFIG ERROR: auth.domain must not contain whitespace (got '{}')",
            cfg.auth.domain
        );
    }

    if cfg.auth.audience.trim().is_empty() {
        anyhow::bail!("CONFIG ERROR: auth.audience cannot be empty");
    }

    if cfg.database.path != ":memory:" {
        if let Some(parent) = std::path::Path::new(&cfg.database.path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                anyhow::bail!(
                    "CONFIG ERROR: Database directory does not exist: {}",
                    parent.display()
                );
            }
        }
    }

    tracing::info!("Configuration validation passed");
    Ok(())
}

pub fn load() -> Result<Config> {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name("config").required(false))
        .add_source(
            config::Environment::with_prefix("COFFEE_SHOP")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("api.cors_allowed_origins")
                .try_parsing(true),
        )
        .set_default("api.bind", "0.0.0.0")?
        .set_default("api.port", 5000)?
        .set_default("api.cors_allowed_origins", vec!["*"])?
        .set_default("database.path", "./coffee_shop.db")?
        .set_default("database.reset_on_start", false)?
        .set_default("auth.domain", "")?
        .set_default("auth.audience", "coffee_shop")?
        .set_default("auth.jwks_timeout_secs", 5)?
        .build()?
        .try_deserialize()?;

    validate(&cfg)?;

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            api: ApiConfig {
                bind: "127.0.0.1".to_string(),
                port: 5000,
                cors_allowed_origins: default_cors_allowed_origins(),
            },
            database: DatabaseConfig {
                path: ":memory:".to_string(),
                reset_on_start: false,
            },
            auth: AuthConfig {
                domain: "tenant.us.auth0.com".to_string(),
                audience: "coffee_shop".to_string(),
                jwks_url: None,
                jwks_timeout_secs: 5,
            },
        }
    }

    #[test]
    fn test_issuer_and_jwks_url_derive_from_domain() {
        let cfg = sample();
        assert_eq!(cfg.auth.issuer(), "https://tenant.us.auth0.com/");
        assert_eq!(
            cfg.auth.jwks_url(),
            "https://tenant.us.auth0.com/.well-known/jwks.json"
        );
    }

    #[test]
    fn test_jwks_url_override() {
        let mut cfg = sample();
        cfg.auth.jwks_url = Some("http://127.0.0.1:9999/jwks.json".to_string());
        assert_eq!(cfg.auth.jwks_url(), "http://127.0.0.1:9999/jwks.json");
    }

    #[test]
    fn test_validate_accepts_sample() {
        assert!(validate(&sample()).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_domain() {
        let mut cfg = sample();
        cfg.auth.domain = "  ".to_string();
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn test_validate_rejects_domain_with_scheme() {
        let mut cfg = sample();
        cfg.auth.domain = "https://tenant.us.auth0.com".to_string();
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn test_validate_rejects_domain_with_surrounding_whitespace() {
        let mut cfg = sample();
        cfg.auth.domain = " tenant.us.auth0.com".to_string();
        assert!(validate(&cfg).is_err());
        cfg.auth.domain = "tenant.us.auth0.com\n".to_string();
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_audience() {
        let mut cfg = sample();
        cfg.auth.audience = String::new();
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn test_validate_rejects_missing_db_directory() {
        let mut cfg = sample();
        cfg.database.path = "/definitely/not/here/coffee.db".to_string();
        assert!(validate(&cfg).is_err());
    }
}
