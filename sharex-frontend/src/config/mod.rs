use serde::Deserialize;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Browser-facing origin used to build share links (e.g. http://localhost:3000).
    pub public_url: String,
    /// Inactivity window for browser sessions and their API client contexts.
    #[serde(default = "default_session_idle_minutes")]
    pub session_idle_minutes: i64,
}

fn default_session_idle_minutes() -> i64 {
    24 * 60
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApiSettings {
    /// Origin of the ShareX REST API.
    #[serde(default = "default_api_url")]
    pub url: String,
    #[serde(default = "default_api_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            timeout_seconds: default_api_timeout_seconds(),
        }
    }
}

fn default_api_url() -> String {
    "http://localhost:8081".to_string()
}

fn default_api_timeout_seconds() -> u64 {
    120
}

#[derive(Deserialize, Clone, Debug)]
pub struct TelemetrySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP gRPC endpoint; spans are only exported when set.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Failed to determine the current directory: {}", e))
    })?;

    // Support running from the workspace root or from the crate directory
    let configuration_directory = if base_path.ends_with("sharex-frontend") {
        base_path.join("config")
    } else {
        base_path.join("sharex-frontend").join("config")
    };

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_yaml_fills_defaults() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                "server:\n  host: 127.0.0.1\n  port: 3000\n  public_url: http://localhost:3000\n",
                config::FileFormat::Yaml,
            ))
            .build()
            .unwrap()
            .try_deserialize::<Settings>()
            .unwrap();

        assert_eq!(settings.api.url, "http://localhost:8081");
        assert_eq!(settings.api.timeout_seconds, 120);
        assert_eq!(settings.server.session_idle_minutes, 1440);
        assert_eq!(settings.telemetry.log_level, "info");
        assert!(settings.telemetry.otlp_endpoint.is_none());
    }
}
