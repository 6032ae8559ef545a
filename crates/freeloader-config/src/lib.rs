// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the Freeloader request router.
//!
//! Settings are layered with figment (compiled defaults, TOML files,
//! `FREELOADER_*` env vars), deserialized strictly, and validated. Every
//! failure comes back as a [`ConfigError`] diagnostic so a caller can show
//! all problems at once:
//!
//! ```no_run
//! let config = match freeloader_config::load_and_validate() {
//!     Ok(config) => config,
//!     Err(errors) => {
//!         freeloader_config::render_errors(&errors);
//!         std::process::exit(2);
//!     }
//! };
//! println!("default strategy: {}", config.routing.strategy);
//! ```

use std::path::{Path, PathBuf};

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    BackendConfig, BudgetConfig, BudgetLimits, FreeloaderConfig, LoggingConfig, RoutingConfig,
    StorageConfig,
};

/// Load from the file hierarchy plus environment, then validate.
pub fn load_and_validate() -> Result<FreeloaderConfig, Vec<ConfigError>> {
    checked(loader::load_config(), hierarchy_sources)
}

/// Load one TOML file plus environment, then validate.
pub fn load_and_validate_path(path: &Path) -> Result<FreeloaderConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_path(path), || {
        read_sources([path.to_path_buf()])
    })
}

/// Parse an in-memory TOML document, then validate. No env overrides.
pub fn load_and_validate_str(toml_content: &str) -> Result<FreeloaderConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Turn a figment result into diagnostics or a validated config. File
/// contents are only read when there is an error to point into.
fn checked(
    loaded: Result<FreeloaderConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<FreeloaderConfig, Vec<ConfigError>> {
    let config =
        loaded.map_err(|err| diagnostic::figment_to_config_errors(err, &sources()))?;
    validation::validate_config(&config)?;
    tracing::debug!(
        strategy = %config.routing.strategy,
        database = %config.storage.database_path,
        backend = %config.backend.base_url,
        "configuration loaded"
    );
    Ok(config)
}

fn hierarchy_sources() -> Vec<(String, String)> {
    let local = std::env::current_dir()
        .map(|dir| dir.join(loader::LOCAL_CONFIG))
        .unwrap_or_else(|_| PathBuf::from(loader::LOCAL_CONFIG));
    read_sources(
        [Some(local), loader::user_config_path(), Some(PathBuf::from(loader::SYSTEM_CONFIG))]
            .into_iter()
            .flatten(),
    )
}

/// `(display path, content)` for each file that exists and is readable.
fn read_sources(paths: impl IntoIterator<Item = PathBuf>) -> Vec<(String, String)> {
    paths
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            Some((path.display().to_string(), content))
        })
        .collect()
}
