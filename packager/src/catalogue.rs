//! Artifact catalogue for the bliss-analyser release.
//!
//! The catalogue is the single table of artifact names the packager
//! manages, grouped by platform. Every group except [`PlatformGroup::Windows`]
//! is a Unix family whose archives get their executable bits restored
//! after download.

use std::collections::HashSet;
use std::fmt;

/// Upstream repository producing the artifacts.
pub const DEFAULT_REPOSITORY: &str = "CDrummond/bliss-analyser";

/// Name of the executable at the root of every artifact archive.
pub const DEFAULT_EXECUTABLE: &str = "bliss-analyser";

const LINUX_ARM_ARTIFACTS: &[&str] = &[
    "bliss-analyser-linux-arm-ffmpeg",
    "bliss-analyser-linux-arm-static",
    "bliss-analyser-debian-bullseye-arm-libav",
    "bliss-analyser-debian-bookworm-arm-libav",
];

const LINUX_X86_ARTIFACTS: &[&str] = &[
    "bliss-analyser-linux-x86-ffmpeg",
    "bliss-analyser-linux-x86-static",
    "bliss-analyser-ubuntu-22.04-x86-libav",
    "bliss-analyser-ubuntu-24.04-x86-libav",
];

const MAC_ARTIFACTS: &[&str] = &["bliss-analyser-mac-ffmpeg"];

const WINDOWS_ARTIFACTS: &[&str] = &["bliss-analyser-windows-libav"];

/// Errors arising from an inconsistent catalogue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogueError {
    /// The repository is not of the form `<owner>/<repo>`.
    #[error("invalid repository \"{value}\": expected <owner>/<repo>")]
    InvalidRepository {
        /// The rejected repository string.
        value: String,
    },

    /// An artifact name is empty or contains path separators.
    #[error("invalid artifact name \"{value}\"")]
    InvalidArtifactName {
        /// The rejected name.
        value: String,
    },

    /// The same artifact name appears more than once.
    #[error("artifact \"{name}\" is listed more than once")]
    DuplicateArtifact {
        /// The repeated name.
        name: String,
    },

    /// The catalogue lists no artifacts at all.
    #[error("artifact catalogue is empty")]
    Empty,
}

/// Platform family an artifact is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PlatformGroup {
    /// Linux on ARM.
    LinuxArm,
    /// Linux on x86.
    LinuxX86,
    /// macOS.
    Mac,
    /// Windows.
    Windows,
}

impl PlatformGroup {
    /// All groups in catalogue order.
    pub const ALL: [Self; 4] = [Self::LinuxArm, Self::LinuxX86, Self::Mac, Self::Windows];

    /// Return true when archives for this group need execute bits restored.
    #[must_use]
    pub const fn is_unix(self) -> bool {
        !matches!(self, Self::Windows)
    }

    /// Key used for this group in configuration files.
    #[must_use]
    pub const fn config_key(self) -> &'static str {
        match self {
            Self::LinuxArm => "linux_arm",
            Self::LinuxX86 => "linux_x86",
            Self::Mac => "mac",
            Self::Windows => "windows",
        }
    }

    const fn default_artifacts(self) -> &'static [&'static str] {
        match self {
            Self::LinuxArm => LINUX_ARM_ARTIFACTS,
            Self::LinuxX86 => LINUX_X86_ARTIFACTS,
            Self::Mac => MAC_ARTIFACTS,
            Self::Windows => WINDOWS_ARTIFACTS,
        }
    }
}

impl fmt::Display for PlatformGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_key())
    }
}

/// Name of one build variant published by CI.
///
/// # Examples
///
/// ```
/// use bliss_packager::catalogue::ArtifactName;
///
/// let name = ArtifactName::try_from("bliss-analyser-mac-ffmpeg").expect("valid name");
/// assert_eq!(name.as_str(), "bliss-analyser-mac-ffmpeg");
/// assert!(ArtifactName::try_from("../escape").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactName(String);

impl ArtifactName {
    /// Return the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ArtifactName {
    type Error = CatalogueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // Names become file names in the work directory.
        let is_valid = !value.is_empty()
            && value != "."
            && value != ".."
            && !value.contains(['/', '\\']);
        if !is_valid {
            return Err(CatalogueError::InvalidArtifactName {
                value: value.to_owned(),
            });
        }
        Ok(Self(value.to_owned()))
    }
}

impl AsRef<str> for ArtifactName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A GitHub `<owner>/<repo>` slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoSlug(String);

impl RepoSlug {
    /// Return the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for RepoSlug {
    type Error = CatalogueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut parts = value.split('/');
        let well_formed = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty()
        );
        if !well_formed {
            return Err(CatalogueError::InvalidRepository {
                value: value.to_owned(),
            });
        }
        Ok(Self(value.to_owned()))
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One catalogue row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogueEntry {
    /// The artifact name.
    pub name: ArtifactName,
    /// The platform group it belongs to.
    pub group: PlatformGroup,
}

/// The complete set of artifacts managed for one release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCatalogue {
    repository: RepoSlug,
    executable: String,
    entries: Vec<CatalogueEntry>,
}

impl ArtifactCatalogue {
    /// Build a catalogue, rejecting empty or duplicated entries.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::Empty`] when `entries` is empty and
    /// [`CatalogueError::DuplicateArtifact`] when a name repeats.
    pub fn new(
        repository: RepoSlug,
        executable: impl Into<String>,
        entries: Vec<CatalogueEntry>,
    ) -> Result<Self, CatalogueError> {
        if entries.is_empty() {
            return Err(CatalogueError::Empty);
        }
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.name.as_str()) {
                return Err(CatalogueError::DuplicateArtifact {
                    name: entry.name.to_string(),
                });
            }
        }
        Ok(Self {
            repository,
            executable: executable.into(),
            entries,
        })
    }

    /// Build the catalogue for `repository` from per-group name lists.
    ///
    /// Groups are laid out in [`PlatformGroup::ALL`] order.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogueError`] if any name is invalid, a name
    /// repeats, or no names are given.
    pub fn from_groups<'a, I>(
        repository: RepoSlug,
        executable: impl Into<String>,
        groups: I,
    ) -> Result<Self, CatalogueError>
    where
        I: IntoIterator<Item = (PlatformGroup, Vec<&'a str>)>,
    {
        let mut entries = Vec::new();
        for (group, names) in groups {
            for name in names {
                entries.push(CatalogueEntry {
                    name: ArtifactName::try_from(name)?,
                    group,
                });
            }
        }
        entries.sort_by_key(|entry| entry.group);
        Self::new(repository, executable, entries)
    }

    /// The upstream repository.
    #[must_use]
    pub const fn repository(&self) -> &RepoSlug {
        &self.repository
    }

    /// Name of the executable inside each archive.
    #[must_use]
    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// All rows in catalogue order.
    #[must_use]
    pub fn entries(&self) -> &[CatalogueEntry] {
        &self.entries
    }

    /// Every managed artifact name, in catalogue order.
    #[must_use]
    pub fn allow_list(&self) -> Vec<ArtifactName> {
        self.entries.iter().map(|entry| entry.name.clone()).collect()
    }

    /// The Unix-family artifact names, in catalogue order.
    #[must_use]
    pub fn unix_artifacts(&self) -> Vec<ArtifactName> {
        self.entries
            .iter()
            .filter(|entry| entry.group.is_unix())
            .map(|entry| entry.name.clone())
            .collect()
    }

    /// Names belonging to `group`.
    #[must_use]
    pub fn group(&self, group: PlatformGroup) -> Vec<&ArtifactName> {
        self.entries
            .iter()
            .filter(|entry| entry.group == group)
            .map(|entry| &entry.name)
            .collect()
    }
}

impl Default for ArtifactCatalogue {
    /// The bliss-analyser release catalogue.
    fn default() -> Self {
        let entries = PlatformGroup::ALL
            .iter()
            .flat_map(|&group| {
                group
                    .default_artifacts()
                    .iter()
                    .map(move |name| CatalogueEntry {
                        name: ArtifactName((*name).to_owned()),
                        group,
                    })
            })
            .collect();
        Self {
            repository: RepoSlug(DEFAULT_REPOSITORY.to_owned()),
            executable: DEFAULT_EXECUTABLE.to_owned(),
            entries,
        }
    }
}
