//! Strong type definitions for claim identifiers and references.
//!
//! Identifiers are newtypes so a claim name can never be passed where a
//! claim ID is expected.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// A 20-byte claim identifier, shown as 40 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClaimId(pub [u8; 20]);

impl ClaimId {
    /// Length of the hex form.
    pub const HEX_LEN: usize = 40;

    /// Create a new ClaimId from raw bytes.
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string. Upper-case input is accepted.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        if s.len() != Self::HEX_LEN {
            return Err(CoreError::InvalidClaimId(s.to_string()));
        }
        let bytes = hex::decode(s).map_err(|_| CoreError::InvalidClaimId(s.to_string()))?;
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Check whether a string looks like a claim ID without allocating.
    pub fn is_claim_id(s: &str) -> bool {
        s.len() == Self::HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
    }
}

impl fmt::Debug for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClaimId({})", &self.to_hex()[..12])
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ClaimId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; 20]> for ClaimId {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl Serialize for ClaimId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ClaimId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Check that a claim name can be used as a search filter.
///
/// Names are the last segment of a URI; the URI separators are not allowed.
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.is_empty() || name.contains(['#', ':', '@']) {
        return Err(CoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Which kind of reference a [`ClaimRef`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    Uri,
    ClaimId,
    Name,
}

/// A reference that locates one claim.
///
/// ```text
/// Uri      lbry://@MyChannel#3/some-video-name#2
/// ClaimId  b7c7082fd52a5b932b6f08c83645ac808b6ba801
/// Name     some-video-name
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ClaimRef {
    Uri(String),
    ClaimId(ClaimId),
    Name(String),
}

impl ClaimRef {
    /// A URI reference, full or partial.
    pub fn uri(uri: impl Into<String>) -> Result<Self, CoreError> {
        let uri = uri.into();
        if uri.trim().is_empty() {
            return Err(CoreError::InvalidUri(uri));
        }
        Ok(Self::Uri(uri))
    }

    /// A claim ID reference.
    pub fn claim_id(id: &str) -> Result<Self, CoreError> {
        Ok(Self::ClaimId(ClaimId::from_hex(id)?))
    }

    /// A bare claim name reference.
    pub fn name(name: impl Into<String>) -> Result<Self, CoreError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self::Name(name))
    }

    /// The kind of this reference.
    pub fn kind(&self) -> RefKind {
        match self {
            Self::Uri(_) => RefKind::Uri,
            Self::ClaimId(_) => RefKind::ClaimId,
            Self::Name(_) => RefKind::Name,
        }
    }

    /// The reference as the user typed it (claim IDs in lowercase hex).
    pub fn raw(&self) -> String {
        match self {
            Self::Uri(s) | Self::Name(s) => s.clone(),
            Self::ClaimId(id) => id.to_hex(),
        }
    }
}

impl fmt::Display for ClaimRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uri(s) => write!(f, "uri={s}"),
            Self::ClaimId(id) => write!(f, "claim_id={id}"),
            Self::Name(s) => write!(f, "name={s}"),
        }
    }
}

/// Parses mixed-format input: 40 hex characters become a claim ID,
/// everything else is treated as a URI.
impl FromStr for ClaimRef {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if ClaimId::is_claim_id(s) {
            Self::claim_id(s)
        } else {
            Self::uri(s)
        }
    }
}

impl From<ClaimId> for ClaimRef {
    fn from(id: ClaimId) -> Self {
        Self::ClaimId(id)
    }
}

/// A query that may carry several references at once.
///
/// Only one of them is effective: URI over claim ID over name on the
/// network, claim ID over name over URI among local files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimQuery {
    pub uri: Option<String>,
    pub claim_id: Option<String>,
    pub name: Option<String>,
}

impl ClaimQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn with_claim_id(mut self, claim_id: impl Into<String>) -> Self {
        self.claim_id = Some(claim_id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Pick the effective reference and validate it.
    pub fn effective(&self) -> Result<ClaimRef, CoreError> {
        let present =
            |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_string);

        if let Some(uri) = present(&self.uri) {
            ClaimRef::uri(uri)
        } else if let Some(id) = present(&self.claim_id) {
            ClaimRef::claim_id(&id)
        } else if let Some(name) = present(&self.name) {
            ClaimRef::name(name)
        } else {
            Err(CoreError::EmptyQuery)
        }
    }

    /// Pick the reference for a lookup among downloaded files.
    ///
    /// The claim ID wins when given. Otherwise the name filters by claim
    /// name, and the URI stands in for a missing name.
    pub fn local(&self) -> Result<ClaimRef, CoreError> {
        let present =
            |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_string);

        if let Some(id) = present(&self.claim_id) {
            ClaimRef::claim_id(&id)
        } else if let Some(name) = present(&self.name) {
            Ok(ClaimRef::Name(name))
        } else if let Some(uri) = present(&self.uri) {
            ClaimRef::uri(uri)
        } else {
            Err(CoreError::EmptyQuery)
        }
    }
}
