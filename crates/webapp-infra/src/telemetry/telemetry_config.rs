use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConsoleFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryConfig {
    pub enable_console_log: bool,
    /// Filter directives in the `RUST_LOG` syntax, ex: `info,tower_http=debug`
    pub default_level: Option<String>,
    #[serde(default)]
    pub format: ConsoleFormat,
}
