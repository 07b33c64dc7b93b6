use config::{ConfigError, Map, Source, Value, ValueKind};
use std::{collections::HashMap, env};

pub const DEFAULT_ENV_PREFIX: &str = "webapp--";
pub const DEFAULT_ENV_SEPARATOR: &str = "--";

/// Environment layer of the configuration.
///
/// Similar to the `Environment` source of config-rs, but the keys are converted to the camelCase
/// naming of the configuration files: `WEBAPP--SERVICE--ALLOWED_ORIGINS` is read as `service.allowedOrigins`.
/// Segments that cannot be derived from the snake case naming (ex. `b2c` -> `B2C`) are listed in the
/// conversion table.
#[derive(Debug, Clone)]
pub struct Environment {
    prefix: String,
    separator: String,
    extra_conversion: HashMap<String, String>,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_ENV_PREFIX.to_string(),
            separator: DEFAULT_ENV_SEPARATOR.to_string(),
            extra_conversion: HashMap::from([("b2c".to_string(), "B2C".to_string())]),
        }
    }
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the (case insensitive) prefix of the variables to read.
    pub fn with_prefix<S: Into<String>>(self, prefix: S) -> Self {
        Self {
            prefix: prefix.into().to_lowercase(),
            ..self
        }
    }

    pub fn with_conversion<K: Into<String>, V: Into<String>>(mut self, segment: K, key: V) -> Self {
        self.extra_conversion.insert(segment.into().to_lowercase(), key.into());
        self
    }

    fn convert_key_case(&self, key: &str) -> String {
        key.split('_')
            .enumerate()
            .map(|(i, s)| {
                if let Some(key) = self.extra_conversion.get(s) {
                    key.to_string()
                } else if i == 0 {
                    s.to_string()
                } else {
                    let mut chars = s.chars();
                    chars
                        .next()
                        .map(|c| c.to_uppercase().collect::<String>())
                        .unwrap_or_default()
                        + chars.as_str()
                }
            })
            .collect()
    }

    /// Convert an environment variable name into a configuration path, `None` if the prefix does not match.
    pub fn config_key(&self, env_key: &str) -> Option<String> {
        let key = env_key.to_lowercase();
        let key = key.strip_prefix(&self.prefix)?;
        let path = key
            .split(self.separator.as_str())
            .map(|k| self.convert_key_case(k))
            .collect::<Vec<_>>()
            .join(".");
        Some(path)
    }
}

impl Source for Environment {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new((*self).clone())
    }

    fn collect(&self) -> Result<Map<String, Value>, ConfigError> {
        let uri: String = "environment".into();

        let mut m = Map::new();
        for (env_key, value) in env::vars() {
            if let Some(key) = self.config_key(&env_key) {
                log::debug!("Reading env {} as {}...", env_key, key);
                m.insert(key, Value::new(Some(&uri), ValueKind::String(value)));
            }
        }

        log::trace!("Environment: {:#?}", m);
        Ok(m)
    }
}
