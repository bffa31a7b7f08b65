use std::fmt::{Display, Formatter, Result as FmtResult};
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

//////////////////////////////////////////////// BugId ////////////////////////////////////////////////

/// Error returned when parsing an invalid bug identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BugIdParseError {
    /// The identifier was not exactly 24 characters long.
    InvalidLength,
    /// The identifier contained a character outside `[0-9a-f]`.
    InvalidCharacter,
}

impl Display for BugIdParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::InvalidLength => {
                write!(f, "bug IDs must be exactly 24 hexadecimal characters")
            }
            Self::InvalidCharacter => {
                write!(f, "bug IDs may only contain lowercase hexadecimal characters")
            }
        }
    }
}

impl std::error::Error for BugIdParseError {}

/// A bug record identifier.
///
/// Identifiers are opaque 12-byte values assigned by the record store at
/// creation time and rendered as 24 lowercase hexadecimal characters, the
/// native identifier format of the underlying document store. The encoded
/// layout is 4 bytes of unix seconds, 5 bytes of per-process randomness, and
/// a 3-byte big-endian counter, so identifiers generated later compare
/// greater within the same second.
///
/// # Examples
///
/// ```rust
/// use bugtrack::BugId;
///
/// let id: BugId = "64a1f2c3d4e5f60718293a4b".parse().unwrap();
/// assert_eq!(id.to_string(), "64a1f2c3d4e5f60718293a4b");
///
/// // Anything that is not 24 hex characters is malformed.
/// assert!("not-a-bug-id".parse::<BugId>().is_err());
/// assert!("64a1f2c3".parse::<BugId>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BugId([u8; 12]);

impl BugId {
    /// Creates a BugId from raw bytes.
    pub fn new(bytes: [u8; 12]) -> Self {
        BugId(bytes)
    }

    /// Returns the raw bytes of the identifier.
    pub fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }

    /// Creates a BugId from a byte slice, if it is exactly 12 bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; 12] = bytes.try_into().ok()?;
        Some(BugId(bytes))
    }

    /// Generates a fresh identifier.
    ///
    /// Used by record stores that assign identifiers themselves (the
    /// in-memory backend); the Postgres backend generates the same layout.
    pub fn generate() -> Self {
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        static PROCESS_BYTES: OnceLock<[u8; 5]> = OnceLock::new();

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let secs = now.as_secs() as u32;
        let process = PROCESS_BYTES.get_or_init(|| {
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            std::process::id().hash(&mut hasher);
            now.subsec_nanos().hash(&mut hasher);
            let h = hasher.finish().to_be_bytes();
            [h[0], h[1], h[2], h[3], h[4]]
        });
        let count = COUNTER.fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff;

        let mut bytes = [0u8; 12];
        bytes[0..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(process);
        bytes[9] = (count >> 16) as u8;
        bytes[10] = (count >> 8) as u8;
        bytes[11] = count as u8;
        BugId(bytes)
    }
}

const HEX_CHARS: &[u8] = b"0123456789abcdef";

fn hex_value(c: char) -> Result<u8, BugIdParseError> {
    match c {
        '0'..='9' => Ok(c as u8 - b'0'),
        'a'..='f' => Ok(c as u8 - b'a' + 10),
        _ => Err(BugIdParseError::InvalidCharacter),
    }
}

impl Display for BugId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for byte in &self.0 {
            write!(
                f,
                "{}{}",
                HEX_CHARS[(byte >> 4) as usize] as char,
                HEX_CHARS[(byte & 0x0f) as usize] as char
            )?;
        }
        Ok(())
    }
}

impl FromStr for BugId {
    type Err = BugIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.chars().count() != 24 {
            return Err(BugIdParseError::InvalidLength);
        }
        let mut bytes = [0u8; 12];
        let mut chars = s.chars();
        for byte in bytes.iter_mut() {
            let hi = hex_value(chars.next().ok_or(BugIdParseError::InvalidLength)?)?;
            let lo = hex_value(chars.next().ok_or(BugIdParseError::InvalidLength)?)?;
            *byte = (hi << 4) | lo;
        }
        Ok(BugId(bytes))
    }
}

impl Serialize for BugId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for BugId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/////////////////////////////////////////////// Status ////////////////////////////////////////////////

/// Workflow status of a bug record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BugStatus {
    /// The bug has been reported and not yet picked up.
    Open,
    /// Someone is working on the bug.
    InProgress,
    /// The bug has been fixed or closed out.
    Resolved,
}

/// The accepted wire spellings for status, in display order.
pub const STATUS_VALUES: [&str; 3] = ["open", "in-progress", "resolved"];

impl BugStatus {
    /// Returns the wire spelling of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in-progress",
            Self::Resolved => "resolved",
        }
    }
}

impl Default for BugStatus {
    fn default() -> Self {
        Self::Open
    }
}

impl Display for BugStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BugStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "in-progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            _ => Err(()),
        }
    }
}

////////////////////////////////////////////// Priority ///////////////////////////////////////////////

/// Priority of a bug record. Optional; absence means unprioritized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BugPriority {
    /// Cosmetic or minor.
    Low,
    /// Worth fixing soon.
    Medium,
    /// Significant user impact.
    High,
    /// Drop everything.
    Critical,
}

/// The accepted wire spellings for priority, in display order.
pub const PRIORITY_VALUES: [&str; 4] = ["low", "medium", "high", "critical"];

impl BugPriority {
    /// Returns the wire spelling of the priority.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl Display for BugPriority {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BugPriority {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(()),
        }
    }
}

//////////////////////////////////////////////// Bug //////////////////////////////////////////////////

/// A stored bug record.
///
/// The store exclusively owns persisted records: `id`, `created_at`, and
/// `updated_at` are assigned by the store, never by callers. Wire field
/// names are camelCase for the timestamp fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bug {
    /// Store-assigned identifier. Immutable.
    pub id: BugId,
    /// Short summary, trimmed, 1-200 characters.
    pub title: String,
    /// Full description, trimmed, 1-2000 characters.
    pub description: String,
    /// Workflow status.
    pub status: BugStatus,
    /// Optional priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<BugPriority>,
    /// Optional reporter name, trimmed, at most 100 characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter: Option<String>,
    /// When the record was created. Immutable.
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    /// When the record was last written.
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Deserializes a wire field as text. Non-string values count as absent and
/// fall to the same validation path as a missing key.
fn text_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

/// Raw candidate fields for creating a bug, exactly as supplied on the wire.
///
/// Nothing here is trusted: every field is optional and unvalidated, and a
/// non-string value deserializes as absent. Pass a draft through
/// [`crate::validate::clean_draft`] to obtain a [`NewBug`] the store will
/// accept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BugDraft {
    /// Candidate title.
    #[serde(
        default,
        deserialize_with = "text_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    /// Candidate description.
    #[serde(
        default,
        deserialize_with = "text_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    /// Candidate status spelling; defaults to "open" at the create boundary.
    #[serde(
        default,
        deserialize_with = "text_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<String>,
    /// Candidate priority spelling.
    #[serde(
        default,
        deserialize_with = "text_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub priority: Option<String>,
    /// Candidate reporter name.
    #[serde(
        default,
        deserialize_with = "text_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub reporter: Option<String>,
}

/// Raw partial-update fields, exactly as supplied on the wire.
///
/// Absent keys mean "leave the stored value unchanged"; there are no
/// sentinel defaults, and a non-string value deserializes as absent. Pass a
/// patch through [`crate::validate::clean_patch`] to obtain [`BugChanges`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BugPatch {
    /// Replacement title, if supplied.
    #[serde(
        default,
        deserialize_with = "text_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    /// Replacement description, if supplied.
    #[serde(
        default,
        deserialize_with = "text_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    /// Replacement status spelling, if supplied.
    #[serde(
        default,
        deserialize_with = "text_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<String>,
    /// Replacement priority spelling, if supplied.
    #[serde(
        default,
        deserialize_with = "text_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub priority: Option<String>,
    /// Replacement reporter name, if supplied.
    #[serde(
        default,
        deserialize_with = "text_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub reporter: Option<String>,
}

impl BugPatch {
    /// Returns true when the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.reporter.is_none()
    }
}

/// A validated, trimmed candidate record ready for the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBug {
    /// Trimmed, non-empty title.
    pub title: String,
    /// Trimmed, non-empty description.
    pub description: String,
    /// Status; `Open` when omitted at the create boundary.
    pub status: BugStatus,
    /// Priority, if one was supplied.
    pub priority: Option<BugPriority>,
    /// Trimmed reporter name, if one was supplied and non-empty.
    pub reporter: Option<String>,
}

/// A validated partial update. `None` fields are left untouched by the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BugChanges {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement status.
    pub status: Option<BugStatus>,
    /// Replacement priority.
    pub priority: Option<BugPriority>,
    /// Replacement reporter name.
    pub reporter: Option<String>,
}

impl BugChanges {
    /// Applies the changes to a record in place and bumps `updated_at`.
    pub fn apply_to(&self, bug: &mut Bug) {
        if let Some(title) = &self.title {
            bug.title = title.clone();
        }
        if let Some(description) = &self.description {
            bug.description = description.clone();
        }
        if let Some(status) = self.status {
            bug.status = status;
        }
        if let Some(priority) = self.priority {
            bug.priority = Some(priority);
        }
        if let Some(reporter) = &self.reporter {
            bug.reporter = Some(reporter.clone());
        }
        bug.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bug_id_round_trips_through_string() {
        let id = BugId::new([
            0x64, 0xa1, 0xf2, 0xc3, 0xd4, 0xe5, 0xf6, 0x07, 0x18, 0x29, 0x3a, 0x4b,
        ]);
        let encoded = id.to_string();
        assert_eq!(encoded, "64a1f2c3d4e5f60718293a4b");
        assert_eq!(encoded.parse::<BugId>().unwrap(), id);
    }

    #[test]
    fn bug_id_rejects_bad_lengths() {
        assert_eq!(
            "64a1f2c3".parse::<BugId>().unwrap_err(),
            BugIdParseError::InvalidLength
        );
        assert_eq!(
            "64a1f2c3d4e5f60718293a4b00".parse::<BugId>().unwrap_err(),
            BugIdParseError::InvalidLength
        );
        assert_eq!("".parse::<BugId>().unwrap_err(), BugIdParseError::InvalidLength);
    }

    #[test]
    fn bug_id_rejects_bad_characters() {
        assert_eq!(
            "zzzzzzzzzzzzzzzzzzzzzzzz".parse::<BugId>().unwrap_err(),
            BugIdParseError::InvalidCharacter
        );
        // Uppercase hex is not the store's native spelling.
        assert_eq!(
            "64A1F2C3D4E5F60718293A4B".parse::<BugId>().unwrap_err(),
            BugIdParseError::InvalidCharacter
        );
    }

    #[test]
    fn generated_ids_are_unique_and_well_formed() {
        let a = BugId::generate();
        let b = BugId::generate();
        assert_ne!(a, b);
        assert_eq!(a.to_string().len(), 24);
        assert_eq!(a.to_string().parse::<BugId>().unwrap(), a);
    }

    #[test]
    fn generated_ids_increase_within_a_second() {
        let a = BugId::generate();
        let b = BugId::generate();
        assert!(b > a);
    }

    #[test]
    fn bug_id_serde_uses_hex_string() {
        let id: BugId = "64a1f2c3d4e5f60718293a4b".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"64a1f2c3d4e5f60718293a4b\"");
        let back: BugId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn status_wire_spellings() {
        assert_eq!(
            serde_json::to_string(&BugStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!(
            serde_json::from_str::<BugStatus>("\"resolved\"").unwrap(),
            BugStatus::Resolved
        );
        assert_eq!("open".parse::<BugStatus>().unwrap(), BugStatus::Open);
        assert!("Open".parse::<BugStatus>().is_err());
    }

    #[test]
    fn priority_wire_spellings() {
        assert_eq!(
            serde_json::to_string(&BugPriority::Critical).unwrap(),
            "\"critical\""
        );
        assert_eq!(
            serde_json::from_str::<BugPriority>("\"low\"").unwrap(),
            BugPriority::Low
        );
        assert!("CRITICAL".parse::<BugPriority>().is_err());
    }

    #[test]
    fn bug_serializes_camel_case_timestamps() {
        let bug = Bug {
            id: BugId::generate(),
            title: "Bug A".to_string(),
            description: "Desc".to_string(),
            status: BugStatus::Open,
            priority: None,
            reporter: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&bug).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("priority").is_none());
        assert!(value.get("reporter").is_none());
    }

    #[test]
    fn patch_apply_touches_only_supplied_fields() {
        let mut bug = Bug {
            id: BugId::generate(),
            title: "Bug A".to_string(),
            description: "Desc".to_string(),
            status: BugStatus::Open,
            priority: Some(BugPriority::Low),
            reporter: Some("alice".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let changes = BugChanges {
            status: Some(BugStatus::Resolved),
            ..BugChanges::default()
        };
        changes.apply_to(&mut bug);
        assert_eq!(bug.title, "Bug A");
        assert_eq!(bug.description, "Desc");
        assert_eq!(bug.status, BugStatus::Resolved);
        assert_eq!(bug.priority, Some(BugPriority::Low));
        assert_eq!(bug.reporter, Some("alice".to_string()));
    }

    #[test]
    fn non_text_wire_values_deserialize_as_absent() {
        let draft: BugDraft =
            serde_json::from_str(r#"{"title": 123, "description": "Desc", "priority": ["high"]}"#)
                .unwrap();
        assert_eq!(draft.title, None);
        assert_eq!(draft.description, Some("Desc".to_string()));
        assert_eq!(draft.priority, None);

        let patch: BugPatch =
            serde_json::from_str(r#"{"status": {"value": "open"}, "reporter": null}"#).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn empty_patch_is_empty() {
        assert!(BugPatch::default().is_empty());
        let patch = BugPatch {
            status: Some("resolved".to_string()),
            ..BugPatch::default()
        };
        assert!(!patch.is_empty());
    }
}
