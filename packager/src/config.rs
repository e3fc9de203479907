//! Packager configuration file.
//!
//! Settings live in an optional TOML file. Every key may be omitted, in
//! which case the built-in bliss-analyser catalogue applies:
//!
//! ```toml
//! repository = "CDrummond/bliss-analyser"
//! executable = "bliss-analyser"
//! token_file = "/home/me/.config/github-token"
//! scratch_dir = "/var/tmp"
//!
//! [artifacts]
//! linux_arm = ["bliss-analyser-linux-arm-ffmpeg"]
//! linux_x86 = ["bliss-analyser-linux-x86-ffmpeg"]
//! mac = ["bliss-analyser-mac-ffmpeg"]
//! windows = ["bliss-analyser-windows-libav"]
//! ```
//!
//! When the `[artifacts]` table is present it replaces the built-in lists
//! wholesale; groups missing from the table are empty.

use crate::catalogue::{
    ArtifactCatalogue, CatalogueError, DEFAULT_EXECUTABLE, PlatformGroup, RepoSlug,
};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

/// Errors arising from loading the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or has unknown keys.
    #[error("invalid config {path}: {source}")]
    Parse {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// The underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// The settings do not describe a usable catalogue.
    #[error("invalid config: {0}")]
    Invalid(#[from] CatalogueError),
}

/// Raw settings as written in the configuration file.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PackagerConfig {
    /// Upstream `<owner>/<repo>` whose CI artifacts are fetched.
    pub repository: Option<String>,
    /// Executable inside each archive that must be marked executable.
    pub executable: Option<String>,
    /// Location of the bearer token file.
    pub token_file: Option<Utf8PathBuf>,
    /// Parent directory for extraction scratch space; the system temporary
    /// directory when unset.
    pub scratch_dir: Option<Utf8PathBuf>,
    /// Artifact names per platform group.
    pub artifacts: Option<ArtifactGroups>,
}

/// The `[artifacts]` table.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ArtifactGroups {
    /// Linux ARM artifacts.
    pub linux_arm: Vec<String>,
    /// Linux x86 artifacts.
    pub linux_x86: Vec<String>,
    /// macOS artifacts.
    pub mac: Vec<String>,
    /// Windows artifacts; these are downloaded but never repackaged.
    pub windows: Vec<String>,
}

impl ArtifactGroups {
    fn names(&self, group: PlatformGroup) -> Vec<&str> {
        let names = match group {
            PlatformGroup::LinuxArm => &self.linux_arm,
            PlatformGroup::LinuxX86 => &self.linux_x86,
            PlatformGroup::Mac => &self.mac,
            PlatformGroup::Windows => &self.windows,
        };
        names.iter().map(String::as_str).collect()
    }
}

impl PackagerConfig {
    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use bliss_packager::config::PackagerConfig;
    ///
    /// let config = PackagerConfig::from_toml_str("executable = \"tool\"", "inline".into())
    ///     .expect("valid config");
    /// assert_eq!(config.executable.as_deref(), Some("tool"));
    /// ```
    pub fn from_toml_str(contents: &str, path: Utf8PathBuf) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Load configuration from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not valid.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        log::debug!("loaded packager config from {path}");
        Self::from_toml_str(&contents, path.to_owned())
    }

    /// Resolve the catalogue described by these settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the repository, executable, or
    /// artifact names are unusable.
    pub fn catalogue(&self) -> Result<ArtifactCatalogue, ConfigError> {
        let defaults = ArtifactCatalogue::default();
        let repository = match self.repository.as_deref() {
            Some(slug) => RepoSlug::try_from(slug)?,
            None => defaults.repository().clone(),
        };
        let executable = self.executable.as_deref().unwrap_or(DEFAULT_EXECUTABLE);
        if executable.is_empty() || executable.contains(['/', '\\']) {
            return Err(CatalogueError::InvalidArtifactName {
                value: executable.to_owned(),
            }
            .into());
        }

        let catalogue = match &self.artifacts {
            Some(groups) => ArtifactCatalogue::from_groups(
                repository,
                executable,
                PlatformGroup::ALL.map(|group| (group, groups.names(group))),
            )?,
            None => ArtifactCatalogue::new(repository, executable, defaults.entries().to_vec())?,
        };
        Ok(catalogue)
    }
}
