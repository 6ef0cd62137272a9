use std::io::IsTerminal as _;

use anyhow::Context as _;

/// Which binary is logging; picks the default filter when `RUST_LOG` is unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogProfile {
    /// One-shot commands: only warnings, so stdout output stays the focus.
    Cli,
    /// Long-running app: request traces included.
    App,
}

impl LogProfile {
    fn default_directive(self) -> &'static str {
        match self {
            Self::Cli => "warn",
            Self::App => "info,tower_http=debug",
        }
    }
}

pub fn init(profile: LogProfile) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(profile.default_directive()))
        .context("build log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(profile == LogProfile::App)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    Ok(())
}
