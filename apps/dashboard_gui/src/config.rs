use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use clap::Parser;
use serde::Deserialize;

use crate::ui::navigation::Route;

const CONFIG_FILE_NAME: &str = "dashboard.toml";
const CONFIG_DIR_NAME: &str = "9volt-dashboard";

#[derive(Parser, Debug, Default)]
#[command(name = "ninevolt-dashboard", about = "Desktop dashboard for a 9volt cluster")]
pub struct CliArgs {
    /// Path to a TOML settings file.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Base URL of the 9volt API, e.g. http://127.0.0.1:8080
    #[arg(long)]
    pub api_url: Option<String>,
    /// Value sent as X-Access-Token on /api routes.
    #[arg(long)]
    pub access_token: Option<String>,
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,
    /// Route shown at startup (/ui, /ui/Status, /ui/Cluster, /ui/Events).
    #[arg(long = "route")]
    pub start_route: Option<String>,
    #[arg(long)]
    pub log_filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_url: String,
    pub access_token: Option<String>,
    pub request_timeout_secs: u64,
    pub start_route: String,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8080".into(),
            access_token: None,
            request_timeout_secs: 0,
            start_route: "/ui".into(),
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    /// A zero timeout disables the per-request deadline.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    pub fn start_route(&self) -> Route {
        self.start_route.parse().unwrap_or(Route::Home)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid api base url '{url}': {source}")]
    InvalidApiUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error(transparent)]
    InvalidRoute(#[from] crate::ui::navigation::UnknownRoute),
    #[error("{name} must be a whole number of seconds, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

pub fn load_settings(cli: &CliArgs) -> Result<Settings, ConfigError> {
    load_settings_from(cli, &|name| std::env::var(name).ok())
}

/// Layers defaults, the settings file, environment and CLI flags, in that
/// order of increasing precedence.
pub fn load_settings_from(
    cli: &CliArgs,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<Settings, ConfigError> {
    let mut settings = match config_file_path(cli.config.as_deref()) {
        Some(path) => read_settings_file(&path)?,
        None => Settings::default(),
    };

    if let Some(v) = env("NINEV_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = env("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = env("NINEV_ACCESS_TOKEN") {
        settings.access_token = Some(v);
    }
    if let Some(v) = env("APP__ACCESS_TOKEN") {
        settings.access_token = Some(v);
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs =
            v.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber {
                    name: "APP__REQUEST_TIMEOUT_SECS",
                    value: v.clone(),
                })?;
    }
    if let Some(v) = env("APP__START_ROUTE") {
        settings.start_route = v;
    }
    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    if let Some(v) = &cli.api_url {
        settings.api_url = v.clone();
    }
    if let Some(v) = &cli.access_token {
        settings.access_token = Some(v.clone());
    }
    if let Some(v) = cli.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = &cli.start_route {
        settings.start_route = v.clone();
    }
    if let Some(v) = &cli.log_filter {
        settings.log_filter = v.clone();
    }

    settings.access_token = settings
        .access_token
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());
    validate(&settings)?;
    Ok(settings)
}

fn validate(settings: &Settings) -> Result<(), ConfigError> {
    url::Url::parse(settings.api_url.trim()).map_err(|source| ConfigError::InvalidApiUrl {
        url: settings.api_url.clone(),
        source,
    })?;
    settings.start_route.parse::<Route>()?;
    Ok(())
}

fn config_file_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file())
}

fn read_settings_file(path: &Path) -> Result<Settings, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    fn temp_config(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "ninevolt-dashboard-{}-{name}.toml",
            std::process::id()
        ));
        fs::write(&path, body).expect("write temp config");
        path
    }

    #[test]
    fn file_env_and_cli_layer_in_order() {
        let path = temp_config(
            "layers",
            "api_url = \"http://file:8080\"\naccess_token = \"from-file\"\nstart_route = \"/ui/Events\"\n",
        );
        let cli = CliArgs {
            config: Some(path.clone()),
            api_url: Some("http://cli:9000".into()),
            ..CliArgs::default()
        };
        let env = env_of(&[
            ("NINEV_API_URL", "http://env:8080"),
            ("NINEV_ACCESS_TOKEN", "from-env"),
            ("APP__ACCESS_TOKEN", "from-app-env"),
        ]);

        let settings = load_settings_from(&cli, &env).expect("settings");
        fs::remove_file(path).ok();

        assert_eq!(settings.api_url, "http://cli:9000");
        assert_eq!(settings.access_token.as_deref(), Some("from-app-env"));
        assert_eq!(settings.start_route(), Route::Events);
        assert_eq!(settings.log_filter, "info");
    }

    #[test]
    fn blank_token_means_no_token() {
        let path = temp_config("blank", "");
        let cli = CliArgs {
            config: Some(path.clone()),
            access_token: Some("   ".into()),
            ..CliArgs::default()
        };
        let settings = load_settings_from(&cli, &env_of(&[])).expect("settings");
        fs::remove_file(path).ok();
        assert_eq!(settings.access_token, None);
    }

    #[test]
    fn requests_have_no_deadline_unless_configured() {
        let path = temp_config("timeout", "");
        let cli = CliArgs {
            config: Some(path.clone()),
            ..CliArgs::default()
        };
        let settings = load_settings_from(&cli, &env_of(&[])).expect("settings");
        assert_eq!(settings.request_timeout(), None);

        let settings = load_settings_from(&cli, &env_of(&[("APP__REQUEST_TIMEOUT_SECS", "15")]))
            .expect("settings");
        fs::remove_file(path).ok();
        assert_eq!(settings.request_timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn rejects_bad_values() {
        let path = temp_config("bad", "");
        let cli = CliArgs {
            config: Some(path.clone()),
            ..CliArgs::default()
        };

        let err = load_settings_from(&cli, &env_of(&[("APP__API_URL", "not a url")]))
            .expect_err("bad url");
        assert!(matches!(err, ConfigError::InvalidApiUrl { .. }));

        let err = load_settings_from(&cli, &env_of(&[("APP__START_ROUTE", "/ui/Alerts")]))
            .expect_err("bad route");
        assert!(matches!(err, ConfigError::InvalidRoute(_)));

        let err = load_settings_from(&cli, &env_of(&[("APP__REQUEST_TIMEOUT_SECS", "soon")]))
            .expect_err("bad timeout");
        fs::remove_file(path).ok();
        assert!(matches!(err, ConfigError::InvalidNumber { .. }));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let cli = CliArgs {
            config: Some(PathBuf::from("/definitely/not/here/dashboard.toml")),
            ..CliArgs::default()
        };
        let err = load_settings_from(&cli, &env_of(&[])).expect_err("missing file");
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
