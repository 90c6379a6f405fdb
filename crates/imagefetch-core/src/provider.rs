use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Canonical image provider identifiers stamped on every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Unsplash,
    Pexels,
    Pixabay,
}

impl ProviderId {
    pub const ALL: [Self; 3] = [Self::Unsplash, Self::Pexels, Self::Pixabay];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unsplash => "unsplash",
            Self::Pexels => "pexels",
            Self::Pixabay => "pixabay",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "unsplash" => Ok(Self::Unsplash),
            "pexels" => Ok(Self::Pexels),
            "pixabay" => Ok(Self::Pixabay),
            other => Err(ValidationError::InvalidProvider {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_names_case_insensitively() {
        assert_eq!("Pexels".parse::<ProviderId>(), Ok(ProviderId::Pexels));
        assert_eq!(" PIXABAY ".parse::<ProviderId>(), Ok(ProviderId::Pixabay));
    }

    #[test]
    fn rejects_unknown_provider() {
        let error = "flickr".parse::<ProviderId>().expect_err("unknown provider");
        assert_eq!(
            error,
            ValidationError::InvalidProvider {
                value: String::from("flickr")
            }
        );
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&ProviderId::Unsplash).expect("serializable");
        assert_eq!(json, "\"unsplash\"");
    }
}
