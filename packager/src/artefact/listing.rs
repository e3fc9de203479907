//! Selection of the newest artifact per catalogue name.
//!
//! Parses the body of the GitHub `actions/artifacts` endpoint. The
//! payload must be a JSON object carrying an `artifacts` array; only
//! elements whose `name` is allow-listed are inspected further, and for
//! each such name the element with the latest `created_at` wins.

use crate::catalogue::ArtifactName;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Timestamp format used by the artifacts endpoint.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// The newest record for every matched artifact name.
pub type ArtifactRecords = BTreeMap<ArtifactName, ArtifactRecord>;

/// Errors arising from interpreting the artifact listing.
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    /// The response is empty, not an object, or has no `artifacts` array.
    #[error("failed to list artifacts: response has no \"artifacts\" array")]
    MissingArtifacts,

    /// The response is not valid JSON, or an element is not an object
    /// with a string `name`.
    #[error("failed to list artifacts: {reason}")]
    Malformed {
        /// Description of the parse failure.
        reason: String,
    },

    /// An allow-listed element lacks a field or has an unparseable timestamp.
    #[error("artifact {name} has an invalid record: {reason}")]
    InvalidRecord {
        /// The artifact name.
        name: String,
        /// Description of the problem.
        reason: String,
    },

    /// Not every allow-listed artifact was found.
    #[error("failed to determine all artifacts; missing: {}", join_names(.missing))]
    Incomplete {
        /// The names with no record, in allow-list order.
        missing: Vec<ArtifactName>,
    },
}

fn join_names(names: &[ArtifactName]) -> String {
    names
        .iter()
        .map(ArtifactName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// The latest known build of one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRecord {
    /// When CI created the artifact.
    pub created_at: DateTime<Utc>,
    /// Authenticated download URL of the artifact archive.
    pub download_url: String,
}

/// One element of the `artifacts` array. Only `name` is checked up
/// front; the remaining fields are read for allow-listed entries alone.
#[derive(Debug)]
struct ListedArtifact {
    name: String,
    fields: Map<String, Value>,
}

/// Parse a `created_at` timestamp.
///
/// # Errors
///
/// Returns the chrono parse error if `value` does not match
/// [`CREATED_AT_FORMAT`].
///
/// # Examples
///
/// ```
/// use bliss_packager::artefact::listing::parse_created_at;
///
/// let ts = parse_created_at("2025-03-01T12:30:00Z").expect("valid timestamp");
/// assert_eq!(ts.to_rfc3339(), "2025-03-01T12:30:00+00:00");
/// ```
pub fn parse_created_at(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, CREATED_AT_FORMAT).map(|naive| naive.and_utc())
}

/// Pick the newest record per allow-listed name from a listing payload.
///
/// Names outside `allow_list` are ignored. When two elements share a name
/// the later `created_at` wins; equal timestamps keep the first seen.
///
/// # Errors
///
/// Returns [`ListingError::MissingArtifacts`] when the payload lacks the
/// `artifacts` array, [`ListingError::Malformed`] when it is not JSON of
/// the expected shape, and [`ListingError::InvalidRecord`] when a matched
/// element is incomplete.
///
/// # Examples
///
/// ```
/// use bliss_packager::artefact::listing::select_latest;
/// use bliss_packager::catalogue::ArtifactName;
///
/// let payload = r#"{"artifacts": [
///     {"name": "a", "created_at": "2025-01-01T00:00:00Z", "archive_download_url": "https://x/1"},
///     {"name": "a", "created_at": "2025-02-01T00:00:00Z", "archive_download_url": "https://x/2"},
///     {"name": "b", "created_at": "2025-02-01T00:00:00Z", "archive_download_url": "https://x/3"}
/// ]}"#;
/// let allow = [ArtifactName::try_from("a").expect("valid name")];
/// let records = select_latest(payload, &allow).expect("valid payload");
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[&allow[0]].download_url, "https://x/2");
/// ```
pub fn select_latest(
    payload: &str,
    allow_list: &[ArtifactName],
) -> Result<ArtifactRecords, ListingError> {
    let listed = parse_listing(payload)?;
    let mut records = ArtifactRecords::new();

    for artifact in listed {
        let Some(name) = allow_list.iter().find(|name| name.as_str() == artifact.name) else {
            continue;
        };
        let record = to_record(&artifact)?;
        let is_newer = records
            .get(name)
            .is_none_or(|current| record.created_at > current.created_at);
        if is_newer {
            log::trace!("selected {name} created at {}", record.created_at);
            records.insert(name.clone(), record);
        }
    }

    Ok(records)
}

/// Confirm that every allow-listed name has a record.
///
/// # Errors
///
/// Returns [`ListingError::Incomplete`] naming the missing artifacts.
pub fn ensure_complete(
    records: &ArtifactRecords,
    allow_list: &[ArtifactName],
) -> Result<(), ListingError> {
    let missing: Vec<ArtifactName> = allow_list
        .iter()
        .filter(|name| !records.contains_key(*name))
        .cloned()
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ListingError::Incomplete { missing })
    }
}

fn parse_listing(payload: &str) -> Result<Vec<ListedArtifact>, ListingError> {
    let value: Value = serde_json::from_str(payload).map_err(|e| ListingError::Malformed {
        reason: e.to_string(),
    })?;
    let artifacts = match value {
        Value::Object(mut body) => body.remove("artifacts"),
        _ => None,
    };
    match artifacts {
        Some(Value::Array(elements)) => elements.into_iter().map(to_listed).collect(),
        _ => Err(ListingError::MissingArtifacts),
    }
}

fn to_listed(element: Value) -> Result<ListedArtifact, ListingError> {
    let fields = match element {
        Value::Object(fields) => fields,
        other => {
            return Err(ListingError::Malformed {
                reason: format!("artifact entry is not an object: {other}"),
            });
        }
    };
    let Some(Value::String(name)) = fields.get("name") else {
        return Err(ListingError::Malformed {
            reason: "artifact entry has no string \"name\"".to_owned(),
        });
    };
    Ok(ListedArtifact {
        name: name.clone(),
        fields,
    })
}

fn to_record(artifact: &ListedArtifact) -> Result<ArtifactRecord, ListingError> {
    let raw_created_at = string_field(artifact, "created_at")?;
    let created_at = parse_created_at(raw_created_at).map_err(|e| {
        invalid_record(artifact, format!("created_at \"{raw_created_at}\": {e}"))
    })?;
    let download_url = string_field(artifact, "archive_download_url")?.to_owned();
    Ok(ArtifactRecord {
        created_at,
        download_url,
    })
}

fn string_field<'a>(artifact: &'a ListedArtifact, field: &str) -> Result<&'a str, ListingError> {
    match artifact.fields.get(field) {
        Some(Value::String(value)) => Ok(value.as_str()),
        Some(other) => Err(invalid_record(artifact, format!("{field} is not a string: {other}"))),
        None => Err(invalid_record(artifact, format!("missing {field}"))),
    }
}

fn invalid_record(artifact: &ListedArtifact, reason: String) -> ListingError {
    ListingError::InvalidRecord {
        name: artifact.name.clone(),
        reason,
    }
}

#[cfg(test)]
#[path = "listing_tests.rs"]
mod tests;
