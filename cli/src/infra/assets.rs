//! Embedded assets compiled into the binary, plus template loading.
//!
//! At compile time, `include_dir!` embeds everything under `assets/`:
//!   - `fortunes.txt`: entries for the `fortune` action
//!
//! The default Caddyfile template lives in `domain::render`.

use std::path::Path;

use anyhow::{Context, Result};
use include_dir::{Dir, include_dir};

use crate::domain::render::DEFAULT_TEMPLATE;

static EMBEDDED_ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets");

pub const FORTUNES: &str = "fortunes.txt";

/// Return a single embedded asset as UTF-8 text.
///
/// # Errors
///
/// Returns an error if no asset with the given `name` exists or it is not
/// valid UTF-8.
pub fn get_text(name: &str) -> Result<&'static str> {
    EMBEDDED_ASSETS
        .get_file(name)
        .ok_or_else(|| anyhow::anyhow!("embedded asset not found: {name}"))?
        .contents_utf8()
        .ok_or_else(|| anyhow::anyhow!("embedded asset is not UTF-8: {name}"))
}

/// Load the Caddyfile template: `override_path` if given, else the embedded one.
///
/// # Errors
///
/// Returns an error if the override cannot be read.
pub fn load_template(override_path: Option<&Path>) -> Result<String> {
    match override_path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("cannot read template {}", path.display())),
        None => Ok(DEFAULT_TEMPLATE.to_string()),
    }
}
