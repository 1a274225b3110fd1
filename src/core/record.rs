//! The canonical DNS record model every provider adapter normalises into.

use serde::{Deserialize, Serialize};

/// A single normalised DNS zone-export row.
///
/// `name` and `type_` are required; every other field is provider-dependent
/// and may be absent. Equality on `name` is case-insensitive and ignores a
/// trailing dot — adapters are responsible for stripping the trailing dot
/// and lower-casing is applied by the classifier, not at construction time,
/// so the original casing is preserved for display in reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// DNS name with any trailing dot stripped.
    pub name: String,
    /// Record type.
    #[serde(rename = "type")]
    pub type_: RecordType,
    /// Format-dependent value. MX carries a priority-prefixed host
    /// (`"10 mail.example.com"`); SRV carries
    /// `"priority weight port target"`.
    pub content: String,
    /// TTL in seconds. Defaults to 300 when the source column was blank.
    pub ttl: u32,
    /// Cloudflare-style proxy flag, when the provider exposes one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxied: Option<bool>,
    /// Creation timestamp, ISO-8601, when the provider exposes one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    /// Last-modified timestamp, ISO-8601, when the provider exposes one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    /// Identifier of the provider format this record was decoded from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl Record {
    /// Strip a trailing dot from a DNS name, leaving `"@"` untouched.
    pub fn normalize_name(name: &str) -> String {
        if name == "@" {
            return name.to_string();
        }
        name.strip_suffix('.').unwrap_or(name).to_string()
    }

    /// Case-insensitive, trailing-dot-insensitive name comparison.
    pub fn names_equal(&self, other: &str) -> bool {
        Self::normalize_name(&self.name).eq_ignore_ascii_case(&Self::normalize_name(other))
    }
}

/// The DNS record types the analyzer understands. Any other value causes
/// the owning row to be rejected (non-fatally) during normalisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// IPv4 address record.
    A,
    /// IPv6 address record.
    Aaaa,
    /// Canonical name record.
    Cname,
    /// Mail exchange record.
    Mx,
    /// Text record.
    Txt,
    /// Service record.
    Srv,
    /// Pointer record.
    Ptr,
    /// Name server record.
    Ns,
}

impl RecordType {
    /// Parse a record type from its upstream textual form, tolerating
    /// case differences (`"a"`, `"A"`, `"cname"`, `"CNAME"`, ...).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "A" => Some(Self::A),
            "AAAA" => Some(Self::Aaaa),
            "CNAME" => Some(Self::Cname),
            "MX" => Some(Self::Mx),
            "TXT" => Some(Self::Txt),
            "SRV" => Some(Self::Srv),
            "PTR" => Some(Self::Ptr),
            "NS" => Some(Self::Ns),
            _ => None,
        }
    }

    /// The canonical uppercase textual representation, used in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
            Self::Mx => "MX",
            Self::Txt => "TXT",
            Self::Srv => "SRV",
            Self::Ptr => "PTR",
            Self::Ns => "NS",
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The default TTL applied when a provider's TTL column is blank or absent.
pub const DEFAULT_TTL: u32 = 300;
