//! Observability utilities for the capability runtime.

#![warn(missing_docs, clippy::pedantic)]

pub mod tracing_support {
    //! Structured tracing helpers.

    use anyhow::Context;
    use tracing_subscriber::EnvFilter;

    /// Installs a global fmt subscriber writing to stderr.
    ///
    /// `RUST_LOG` takes precedence over `default_filter` when set. Calling this
    /// more than once is harmless; later calls leave the first subscriber in
    /// place and return `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Fails when `default_filter` is not a valid filter directive.
    pub fn init(default_filter: &str) -> anyhow::Result<bool> {
        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(default_filter)
                .with_context(|| format!("invalid log filter `{default_filter}`"))?,
        };

        let installed = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .try_init()
            .is_ok();
        Ok(installed)
    }

}
