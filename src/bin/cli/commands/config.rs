//! `print-default-config` and `validate-config` subcommands.
//!
//! Operational scaffolding, not a classifier feature: a rubric-driven
//! tool needs a way to inspect and lint its rubric offline.

use std::path::Path;

use zonerisk::core::catalog::{PatternCatalog, DEFAULT_CATALOG_YAML};

/// Print the embedded default pattern catalog to stdout.
pub fn print_default_config() {
    print!("{DEFAULT_CATALOG_YAML}");
}

/// Load and validate a catalog file. Prints a one-line confirmation or
/// error and returns whether validation succeeded.
pub fn validate_config(path: &Path) -> bool {
    match PatternCatalog::from_file(path) {
        Ok(catalog) => {
            println!(
                "catalog '{}' is valid (version {})",
                path.display(),
                catalog.version()
            );
            true
        }
        Err(err) => {
            eprintln!("catalog '{}' is invalid: {err}", path.display());
            false
        }
    }
}
