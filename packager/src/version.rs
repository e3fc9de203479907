//! Release version argument.
//!
//! The version only names the output archives; it is never compared with
//! anything upstream. Accepted forms are `<major>.<minor>.<patch>` with
//! unsigned integer components, or the literal `test` used for dry
//! packaging runs. Components must be written canonically (plain digits,
//! no sign, no leading zeros) so the archive names carry exactly the text
//! given on the command line.

use std::fmt;
use std::str::FromStr;

/// The sentinel accepted in place of a numeric version.
pub const TEST_VERSION: &str = "test";

/// Errors arising from an unparseable version argument.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    /// The argument does not have exactly three dot-separated components.
    #[error("invalid version number \"{value}\": expected <major>.<minor>.<patch> or \"test\"")]
    WrongShape {
        /// The rejected argument.
        value: String,
    },

    /// One of the components is not an unsigned integer.
    #[error("invalid version number \"{value}\": {component} component \"{part}\" is not a number")]
    NotANumber {
        /// The rejected argument.
        value: String,
        /// Which component failed (`major`, `minor` or `patch`).
        component: &'static str,
        /// The offending text.
        part: String,
    },

    /// A numeric component is written with a leading zero.
    #[error("invalid version number \"{value}\": {component} component \"{part}\" has a leading zero")]
    LeadingZero {
        /// The rejected argument.
        value: String,
        /// Which component failed (`major`, `minor` or `patch`).
        component: &'static str,
        /// The offending text.
        part: String,
    },
}

/// A validated release version.
///
/// # Examples
///
/// ```
/// use bliss_packager::version::ReleaseVersion;
///
/// let version: ReleaseVersion = "2.1.0".parse().expect("valid version");
/// assert_eq!(version.to_string(), "2.1.0");
///
/// let test: ReleaseVersion = "test".parse().expect("sentinel");
/// assert!(test.is_test());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseVersion {
    /// A numbered release.
    Release {
        /// Major component.
        major: u32,
        /// Minor component.
        minor: u32,
        /// Patch component.
        patch: u32,
    },
    /// The `test` sentinel.
    Test,
}

impl ReleaseVersion {
    /// Construct a numbered release version.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self::Release {
            major,
            minor,
            patch,
        }
    }

    /// Return true for the `test` sentinel.
    #[must_use]
    pub const fn is_test(&self) -> bool {
        matches!(self, Self::Test)
    }

    /// File name of the archive for `artifact` at this version.
    ///
    /// ```
    /// use bliss_packager::version::ReleaseVersion;
    ///
    /// let version = ReleaseVersion::new(2, 1, 0);
    /// assert_eq!(
    ///     version.archive_file_name("bliss-analyser-mac-ffmpeg"),
    ///     "bliss-analyser-mac-ffmpeg-2.1.0.zip"
    /// );
    /// ```
    #[must_use]
    pub fn archive_file_name(&self, artifact: &str) -> String {
        format!("{artifact}-{self}.zip")
    }
}

impl FromStr for ReleaseVersion {
    type Err = VersionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value == TEST_VERSION {
            return Ok(Self::Test);
        }

        let parts: Vec<&str> = value.split('.').collect();
        let [major, minor, patch] = parts.as_slice() else {
            return Err(VersionError::WrongShape {
                value: value.to_owned(),
            });
        };

        Ok(Self::Release {
            major: parse_component(value, "major", major)?,
            minor: parse_component(value, "minor", minor)?,
            patch: parse_component(value, "patch", patch)?,
        })
    }
}

fn parse_component(value: &str, component: &'static str, part: &str) -> Result<u32, VersionError> {
    let not_a_number = || VersionError::NotANumber {
        value: value.to_owned(),
        component,
        part: part.to_owned(),
    };
    // `u32::from_str` also takes a leading `+`.
    if part.is_empty() || !part.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(not_a_number());
    }
    if part.len() > 1 && part.starts_with('0') {
        return Err(VersionError::LeadingZero {
            value: value.to_owned(),
            component,
            part: part.to_owned(),
        });
    }
    part.parse().map_err(|_| not_a_number())
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Release {
                major,
                minor,
                patch,
            } => write!(f, "{major}.{minor}.{patch}"),
            Self::Test => f.write_str(TEST_VERSION),
        }
    }
}
