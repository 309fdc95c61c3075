//! Error types for theme loading.

use std::path::PathBuf;

/// Errors that can occur when loading a theme file.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    /// The theme file could not be read.
    #[error("Failed to read theme file {path}: {source}")]
    Io {
        /// Path of the theme file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The theme file is not valid YAML for a theme document.
    #[error("Failed to parse theme: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The requested view/element pair is not defined.
    #[error("Theme has no element '{element}' in view '{view}'")]
    MissingElement {
        /// View name.
        view: String,
        /// Element name.
        element: String,
    },
}
