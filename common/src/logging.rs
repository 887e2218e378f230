use std::str::FromStr;

use anyhow::Result;
use once_cell::sync::OnceCell;
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry};

static RELOAD_HANDLE: OnceCell<reload::Handle<EnvFilter, Registry>> = OnceCell::new();

/// Installs the global tracing subscriber, or reloads its filter if it is
/// already installed. Safe to call more than once.
pub fn init(level: &str) -> Result<()> {
    let reload = RELOAD_HANDLE.get_or_try_init(|| {
        let env_filter = EnvFilter::from_str(level)?;

        let (filter, handle) = reload::Layer::new(env_filter);

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init()?;

        Ok::<_, anyhow::Error>(handle)
    })?;

    reload.reload(EnvFilter::from_str(level)?)?;

    Ok(())
}
