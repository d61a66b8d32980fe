//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers exchanged with the Raw Data API.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque handle of an asynchronous job on the Raw Data API
///
/// The server may hand it out as a string or as an integer; both are kept as
/// their textual form.
///
/// # Examples
///
/// ```
/// use hdxctl::domain::ids::TaskId;
///
/// let task_id: TaskId = serde_json::from_str("\"4d3c-aa\"").unwrap();
/// assert_eq!(task_id.as_str(), "4d3c-aa");
///
/// let numeric: TaskId = serde_json::from_str("42").unwrap();
/// assert_eq!(numeric.as_str(), "42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a new TaskId, rejecting blank values
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Task ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the task ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        let id = match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s,
            Raw::Number(n) => n.to_string(),
        };
        TaskId::new(id).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// ISO 3166-1 alpha-3 country code
///
/// Always stored upper-case, which is how the API keys country exports.
///
/// ```
/// use hdxctl::domain::ids::Iso3Code;
/// use std::str::FromStr;
///
/// let code = Iso3Code::from_str("npl").unwrap();
/// assert_eq!(code.as_str(), "NPL");
/// assert!(Iso3Code::from_str("NP").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Iso3Code(String);

impl Iso3Code {
    /// Creates a new Iso3Code, upper-casing the input
    pub fn new(code: impl AsRef<str>) -> Result<Self, String> {
        let code = code.as_ref().trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(format!(
                "Invalid ISO3 code '{code}'. Expected three ASCII letters"
            ));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    /// Returns the code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Iso3Code {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Iso3Code> for String {
    fn from(code: Iso3Code) -> Self {
        code.0
    }
}

impl fmt::Display for Iso3Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Iso3Code {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Numeric identifier of an HDX export record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExportId(u64);

impl ExportId {
    /// Wraps a raw export id
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ExportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ExportId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|e| format!("Invalid export id '{s}': {e}"))
    }
}
