use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_PONTOMAIS_BASE_URL: &str = "https://api.pontomais.com.br/external_api/v1";
const DEFAULT_IMPORT_ROW_DELAY_MS: u64 = 500;

#[derive(Clone)]
pub struct AppConfig {
    pub pontomais_token: String,
    pub pontomais_base_url: String,
    pub telegram_bot_token: String,

    /// Chat IDs allowed to talk to the bot (`TELEGRAM_HOSTS`, comma-separated)
    pub telegram_hosts: Vec<i64>,
    pub debug: bool,

    /// Pause between spreadsheet rows during a batch import
    pub import_row_delay: Duration,
}

// Tokens are kept out of Debug output so the config can be logged safely.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("pontomais_base_url", &self.pontomais_base_url)
            .field("telegram_hosts", &self.telegram_hosts)
            .field("debug", &self.debug)
            .field("import_row_delay", &self.import_row_delay)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let pontomais_token = var("PONTOMAIS_TOKEN").ok_or(ConfigError::Missing("PONTOMAIS_TOKEN"))?;
        let telegram_bot_token =
            var("TELEGRAM_BOT_TOKEN").ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;

        let hosts_str = var("TELEGRAM_HOSTS").ok_or(ConfigError::Missing("TELEGRAM_HOSTS"))?;
        let telegram_hosts = parse_hosts(&hosts_str)?;

        let pontomais_base_url = var("PONTOMAIS_BASE_URL")
            .unwrap_or_else(|| DEFAULT_PONTOMAIS_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let debug = var("DEBUG").and_then(|v| parse_bool(&v)).unwrap_or(false);

        let import_row_delay = match var("IMPORT_ROW_DELAY_MS") {
            Some(v) => v.parse::<u64>().map_err(|_| ConfigError::Invalid {
                key: "IMPORT_ROW_DELAY_MS",
                value: v.clone(),
            })?,
            None => DEFAULT_IMPORT_ROW_DELAY_MS,
        };

        Ok(Self {
            pontomais_token,
            pontomais_base_url,
            telegram_bot_token,
            telegram_hosts,
            debug,
            import_row_delay: Duration::from_millis(import_row_delay),
        })
    }

    pub fn is_authorized(&self, chat_id: i64) -> bool {
        self.telegram_hosts.contains(&chat_id)
    }
}

fn parse_hosts(raw: &str) -> Result<Vec<i64>, ConfigError> {
    let hosts = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>().map_err(|_| ConfigError::Invalid {
                key: "TELEGRAM_HOSTS",
                value: s.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if hosts.is_empty() {
        return Err(ConfigError::Missing("TELEGRAM_HOSTS"));
    }
    Ok(hosts)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Some(true),
        "0" | "f" | "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    const BASE: &[(&str, &str)] = &[
        ("PONTOMAIS_TOKEN", "pm-token"),
        ("TELEGRAM_BOT_TOKEN", "tg-token"),
        ("TELEGRAM_HOSTS", "111, -222"),
    ];

    #[test]
    fn loads_required_values_and_defaults() {
        let cfg = load(BASE).unwrap();
        assert_eq!(cfg.pontomais_token, "pm-token");
        assert_eq!(cfg.telegram_hosts, vec![111, -222]);
        assert_eq!(cfg.pontomais_base_url, DEFAULT_PONTOMAIS_BASE_URL);
        assert!(!cfg.debug);
        assert_eq!(cfg.import_row_delay, Duration::from_millis(500));
    }

    #[test]
    fn missing_token_prevents_startup() {
        let err = load(&[("TELEGRAM_BOT_TOKEN", "x"), ("TELEGRAM_HOSTS", "1")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("PONTOMAIS_TOKEN")));

        let err = load(&[("PONTOMAIS_TOKEN", "x"), ("TELEGRAM_HOSTS", "1")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TELEGRAM_BOT_TOKEN")));
    }

    #[test]
    fn hosts_must_be_present_and_numeric() {
        let err = load(&[("PONTOMAIS_TOKEN", "x"), ("TELEGRAM_BOT_TOKEN", "y")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TELEGRAM_HOSTS")));

        let err = load(&[
            ("PONTOMAIS_TOKEN", "x"),
            ("TELEGRAM_BOT_TOKEN", "y"),
            ("TELEGRAM_HOSTS", "12,abc"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "TELEGRAM_HOSTS", .. }));

        let err = load(&[
            ("PONTOMAIS_TOKEN", "x"),
            ("TELEGRAM_BOT_TOKEN", "y"),
            ("TELEGRAM_HOSTS", " , "),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TELEGRAM_HOSTS")));
    }

    #[test]
    fn optional_values_are_honoured() {
        let mut vars = BASE.to_vec();
        vars.push(("PONTOMAIS_BASE_URL", "http://localhost:9000/api/"));
        vars.push(("DEBUG", "TRUE"));
        vars.push(("IMPORT_ROW_DELAY_MS", "0"));
        let cfg = load(&vars).unwrap();
        assert_eq!(cfg.pontomais_base_url, "http://localhost:9000/api");
        assert!(cfg.debug);
        assert_eq!(cfg.import_row_delay, Duration::ZERO);
    }

    #[test]
    fn unparseable_debug_falls_back_to_false() {
        let mut vars = BASE.to_vec();
        vars.push(("DEBUG", "maybe"));
        assert!(!load(&vars).unwrap().debug);
    }

    #[test]
    fn authorization_uses_host_list() {
        let cfg = load(BASE).unwrap();
        assert!(cfg.is_authorized(111));
        assert!(cfg.is_authorized(-222));
        assert!(!cfg.is_authorized(333));
    }

    #[test]
    fn debug_output_hides_tokens() {
        let cfg = load(BASE).unwrap();
        let out = format!("{:?}", cfg);
        assert!(!out.contains("pm-token"));
        assert!(!out.contains("tg-token"));
    }
}
