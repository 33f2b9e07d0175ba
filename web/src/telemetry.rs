//! Tracing subscriber setup.

use tracing_subscriber::{prelude::*, EnvFilter, Registry};

/// Install a global fmt subscriber filtered by `RUST_LOG` (default `info`).
pub fn init() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = Registry::default()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer());
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_an_error() {
        init().unwrap();
        assert!(init().is_err());
    }
}
