use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Platform that produced a normalized event.
///
/// Purely informational: no accessor on the event changes behaviour based on it.
///
/// ```
/// use mcf_event::Source;
///
/// let source: Source = "Knative".parse().unwrap();
/// assert_eq!(source, Source::Knative);
/// assert_eq!(source.as_str(), "knative");
/// assert_eq!(Source::default().as_str(), "unknown");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Source {
    Knative,
    Aws,
    Azure,
    Gcp,
    #[default]
    Unknown,
    /// Any platform tag this crate does not know yet, stored lowercased.
    Other(String),
}

impl Source {
    /// Returns the lowercase identifier used in logs and serialized events.
    pub fn as_str(&self) -> &str {
        match self {
            Source::Knative => "knative",
            Source::Aws => "aws",
            Source::Azure => "azure",
            Source::Gcp => "gcp",
            Source::Unknown => "unknown",
            Source::Other(tag) => tag.as_str(),
        }
    }
}

impl Display for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        Ok(match tag.as_str() {
            "knative" => Source::Knative,
            "aws" => Source::Aws,
            "azure" => Source::Azure,
            "gcp" => Source::Gcp,
            "" | "unknown" => Source::Unknown,
            _ => Source::Other(tag),
        })
    }
}

impl From<&str> for Source {
    fn from(value: &str) -> Self {
        match value.parse() {
            Ok(source) => source,
            Err(never) => match never {},
        }
    }
}

impl From<String> for Source {
    fn from(value: String) -> Self {
        Source::from(value.as_str())
    }
}

impl From<Source> for String {
    fn from(value: Source) -> Self {
        match value {
            Source::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}
