//! # Player configuration
//!
//! Configuration is built in layers:
//! 1. the embedded default document (`kidupnp.yaml`)
//! 2. an optional YAML file (explicit path, or the `KIDUPNP_CONFIG` variable)
//! 3. `KIDUPNP_CONFIG__<SECTION>__<KEY>` environment overrides
//!
//! ```no_run
//! use kidupnp::PlayerConfig;
//!
//! let config = PlayerConfig::load(None)?;
//! println!("polling every {:?}", config.poll_interval());
//! # Ok::<(), kidupnp::ControlPointError>(())
//! ```

use std::{env, fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use tracing::info;

use crate::errors::ControlPointError;

const DEFAULT_CONFIG: &str = include_str!("kidupnp.yaml");

const ENV_CONFIG_FILE: &str = "KIDUPNP_CONFIG";
const ENV_PREFIX: &str = "KIDUPNP_CONFIG__";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Delay between two polling ticks.
    pub interval_ms: u64,
    /// GetMediaInfo is issued once every `media_info_every` ticks.
    pub media_info_every: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpnpConfig {
    pub instance_id: u32,
    pub channel: String,
    pub play_speed: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub polling: PollingConfig,
    pub upnp: UpnpConfig,
    pub http: HttpConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            polling: PollingConfig {
                interval_ms: 1000,
                media_info_every: 6,
            },
            upnp: UpnpConfig {
                instance_id: 0,
                channel: "Master".to_string(),
                play_speed: "1".to_string(),
            },
            http: HttpConfig { timeout_secs: 10 },
        }
    }
}

impl PlayerConfig {
    /// Loads the configuration from `path`, or from the file named by
    /// `KIDUPNP_CONFIG`, falling back to the embedded defaults, then applies
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ControlPointError> {
        let file = path
            .map(|p| p.to_string_lossy().to_string())
            .or_else(|| env::var(ENV_CONFIG_FILE).ok());

        let external = match file {
            Some(file) => {
                let data = fs::read_to_string(&file).map_err(|e| {
                    ControlPointError::Config(format!("Cannot read {}: {}", file, e))
                })?;
                info!(config_file = %file, "Loaded config file");
                Some(data)
            }
            None => {
                info!("No config file given, using default embedded config");
                None
            }
        };

        Self::build(external.as_deref(), env::vars())
    }

    /// Parses a YAML document merged over the defaults, without environment overrides.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ControlPointError> {
        Self::build(Some(yaml), std::iter::empty())
    }

    fn build(
        external: Option<&str>,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, ControlPointError> {
        let mut value: Value = serde_yaml::from_str(DEFAULT_CONFIG)
            .map_err(|e| ControlPointError::Config(format!("Embedded config: {}", e)))?;

        if let Some(yaml) = external {
            let external_value: Value = serde_yaml::from_str(yaml)
                .map_err(|e| ControlPointError::Config(format!("Invalid YAML: {}", e)))?;
            merge_yaml(&mut value, &lower_keys_value(external_value));
        }

        apply_env_overrides(&mut value, vars);

        let config: PlayerConfig = serde_yaml::from_value(value)
            .map_err(|e| ControlPointError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ControlPointError> {
        if self.polling.interval_ms == 0 {
            return Err(ControlPointError::Config(
                "polling.interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.polling.media_info_every == 0 {
            return Err(ControlPointError::Config(
                "polling.media_info_every must be greater than 0".to_string(),
            ));
        }
        if self.http.timeout_secs == 0 {
            return Err(ControlPointError::Config(
                "http.timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.polling.interval_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    pub fn to_yaml(&self) -> Result<String, ControlPointError> {
        serde_yaml::to_string(self).map_err(|e| ControlPointError::Config(e.to_string()))
    }
}

fn apply_env_overrides(config: &mut Value, vars: impl IntoIterator<Item = (String, String)>) {
    for (key, value) in vars {
        if let Some(path) = key.strip_prefix(ENV_PREFIX) {
            let key_path = path.split("__").collect::<Vec<_>>();
            let _ = set_value(config, &key_path, convert_env_value(&value));
        }
    }
}

fn convert_env_value(value: &str) -> Value {
    serde_yaml::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

fn set_value(data: &mut Value, path: &[&str], value: Value) -> Result<(), ControlPointError> {
    if path.is_empty() {
        *data = value;
        return Ok(());
    }
    if let Value::Mapping(map) = data {
        let key_value = Value::String(path[0].to_lowercase());
        if path.len() == 1 {
            map.insert(key_value, value);
        } else {
            let entry = map
                .entry(key_value)
                .or_insert(Value::Mapping(Mapping::new()));
            set_value(entry, &path[1..], value)?;
        }
        Ok(())
    } else {
        Err(ControlPointError::Config("Current node is not a map".to_string()))
    }
}

fn lower_keys_value(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut new_map = Mapping::new();
            for (k, v) in map {
                let k = match k {
                    Value::String(s) => Value::String(s.to_lowercase()),
                    other => other,
                };
                new_map.insert(k, lower_keys_value(v));
            }
            Value::Mapping(new_map)
        }
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys_value).collect()),
        _ => value,
    }
}

fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_embedded_defaults_match_default_impl() {
        let config = PlayerConfig::build(None, Vec::new()).unwrap();
        assert_eq!(config, PlayerConfig::default());
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_file_is_merged_over_defaults() {
        let config = PlayerConfig::from_yaml_str("Polling:\n  Interval_MS: 250\n").unwrap();
        assert_eq!(config.polling.interval_ms, 250);
        assert_eq!(config.polling.media_info_every, 6);
        assert_eq!(config.upnp.channel, "Master");
    }

    #[test]
    fn test_env_overrides() {
        let config = PlayerConfig::build(
            None,
            vars(&[
                ("KIDUPNP_CONFIG__UPNP__CHANNEL", "LF"),
                ("KIDUPNP_CONFIG__HTTP__TIMEOUT_SECS", "3"),
                ("UNRELATED", "1"),
            ]),
        )
        .unwrap();
        assert_eq!(config.upnp.channel, "LF");
        assert_eq!(config.http_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_dumped_yaml_loads_back() {
        let mut config = PlayerConfig::default();
        config.polling.interval_ms = 500;
        config.upnp.channel = "LF".to_string();

        let yaml = config.to_yaml().unwrap();
        assert_eq!(PlayerConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            PlayerConfig::from_yaml_str("polling:\n  interval_ms: 0\n"),
            Err(ControlPointError::Config(_))
        ));
        assert!(matches!(
            PlayerConfig::from_yaml_str("polling:\n  media_info_every: 0\n"),
            Err(ControlPointError::Config(_))
        ));
        assert!(PlayerConfig::from_yaml_str("polling: [").is_err());
    }
}
