use serde::de::DeserializeOwned;
use serde::Serialize;

pub use config::ConfigError;

/// Parses configuration from the type's defaults, an optional config file and
/// `TRADE`-prefixed environment variables, in increasing priority.
pub fn parse<C: Serialize + DeserializeOwned + Default>(config_file: &str) -> Result<C, ConfigError> {
    let defaults = config::Config::try_from(&C::default())?;

    config::Config::builder()
        .add_source(defaults)
        .add_source(config::File::with_name(config_file).required(false))
        .add_source(config::Environment::with_prefix("TRADE"))
        .build()?
        .try_deserialize()
}
