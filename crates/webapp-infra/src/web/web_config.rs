use crate::telemetry::TelemetryConfig;
use anyhow::{anyhow, Error as AnyError};
use serde::{
    de::{DeserializeOwned, Error as SerdeError, IgnoredAny, MapAccess, Visitor},
    Deserialize, Deserializer,
};
use std::{
    fmt::{self, Debug},
    marker::PhantomData,
    path::PathBuf,
};

use super::{CoreConfig, ServiceConfig};

/// The application specific section of the configuration, stored under the [FeatureConfig::NAME] key.
pub trait FeatureConfig: Debug {
    const NAME: &'static str;
}

#[derive(Debug, Clone)]
pub struct WebAppConfig<F>
where
    F: FeatureConfig,
{
    pub core: CoreConfig,
    pub service: ServiceConfig,
    pub telemetry: TelemetryConfig,
    pub feature: F,
}

fn next_once<'de, V, T>(map: &mut V, slot: &mut Option<T>, field: &'static str) -> Result<(), V::Error>
where
    V: MapAccess<'de>,
    T: Deserialize<'de>,
{
    if slot.is_some() {
        return Err(SerdeError::duplicate_field(field));
    }
    *slot = Some(map.next_value()?);
    Ok(())
}

fn required<T, E: SerdeError>(slot: Option<T>, field: &'static str) -> Result<T, E> {
    slot.ok_or_else(|| SerdeError::missing_field(field))
}

// Core fields are flattened into the root and the feature key is only known at runtime.
// Values must reach the config deserializer unbuffered to keep its string conversions.
impl<'de, F> Deserialize<'de> for WebAppConfig<F>
where
    F: FeatureConfig + Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct WebAppConfigVisitor<F> {
            marker: PhantomData<F>,
        }

        impl<'de, F> Visitor<'de> for WebAppConfigVisitor<F>
        where
            F: FeatureConfig + Deserialize<'de>,
        {
            type Value = WebAppConfig<F>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("struct WebAppConfig")
            }

            fn visit_map<V>(self, mut map: V) -> Result<WebAppConfig<F>, V::Error>
            where
                V: MapAccess<'de>,
            {
                let mut stage = None;
                let mut version = None;
                let mut root_file = None;
                let mut before_layers = None;
                let mut after_layers = None;
                let mut service = None;
                let mut telemetry = None;
                let mut feature = None;

                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "stage" => next_once(&mut map, &mut stage, "stage")?,
                        "version" => next_once(&mut map, &mut version, "version")?,
                        "rootFile" => next_once(&mut map, &mut root_file, "rootFile")?,
                        "beforeLayers" => next_once(&mut map, &mut before_layers, "beforeLayers")?,
                        "afterLayers" => next_once(&mut map, &mut after_layers, "afterLayers")?,
                        "service" => next_once(&mut map, &mut service, "service")?,
                        "telemetry" => next_once(&mut map, &mut telemetry, "telemetry")?,
                        _ if key == F::NAME => next_once(&mut map, &mut feature, F::NAME)?,
                        _ => {
                            let _: IgnoredAny = map.next_value()?;
                        }
                    }
                }

                Ok(WebAppConfig {
                    core: CoreConfig {
                        stage: required(stage, "stage")?,
                        version: required(version, "version")?,
                        root_file: required(root_file, "rootFile")?,
                        before_layers: required(before_layers, "beforeLayers")?,
                        after_layers: required(after_layers, "afterLayers")?,
                    },
                    service: required(service, "service")?,
                    telemetry: required(telemetry, "telemetry")?,
                    feature: required(feature, F::NAME)?,
                })
            }
        }

        deserializer.deserialize_map(WebAppConfigVisitor { marker: PhantomData })
    }
}

impl<F> WebAppConfig<F>
where
    F: FeatureConfig + DeserializeOwned + Debug,
{
    /// Load the configuration of the given stage. By default the root file is `server_config.{stage}.json`.
    pub async fn load(stage: &str, config_file: Option<PathBuf>) -> Result<Self, AnyError> {
        let pre_init = CoreConfig::new(stage, config_file)?;
        let builder = pre_init.create_config_builder()?;
        let config = builder.build().await?;

        let cfg: Self = config.try_deserialize()?;
        log::info!("Config loaded [{}]: {:#?}", cfg.core.root_file, cfg);

        if pre_init != cfg.core {
            Err(anyhow!("Core config mismatch"))
        } else {
            Ok(cfg)
        }
    }
}
