//! Section options from a TOML file, with command-line overrides.
//!
//! ```toml
//! fill = true
//! triangulate = false
//! plane_epsilon = 1e-6
//! weld_tolerance = 1e-4
//! coplanar_edges = "collapse"   # or "emit"
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use vcad_kernel_section::SectionOptions;

/// Flags that override the config file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub no_fill: bool,
    pub triangulate: bool,
}

/// Parse options from TOML text. Missing keys keep their defaults.
pub fn parse(text: &str) -> Result<SectionOptions> {
    toml::from_str(text).context("invalid section config")
}

/// Load options from `path` (or defaults), apply overrides and validate.
pub fn load(path: Option<&Path>, overrides: Overrides) -> Result<SectionOptions> {
    let mut options = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            parse(&text).with_context(|| format!("in {}", path.display()))?
        }
        None => SectionOptions::default(),
    };

    if overrides.no_fill {
        options.fill = false;
    }
    if overrides.triangulate {
        options.triangulate = true;
    }

    options.validate()?;
    tracing::debug!(?options, "section options");
    Ok(options)
}
