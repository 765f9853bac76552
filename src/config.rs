//! Parser configuration.
//!
//! Flang exists in two grammar dialects. The canonical one names structs with
//! type identifiers, requires `let` initializers and has no lambdas. The
//! extended one relaxes all three.

use std::{env, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

/// Environment variable consulted by [`ParseOptions::from_env`].
pub const DIALECT_ENV: &str = "FLANG_DIALECT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Canonical,
    Extended,
}

impl Dialect {
    /// `let x: T` with no `= value`.
    pub fn allows_uninitialized_let(&self) -> bool {
        matches!(self, Dialect::Extended)
    }

    /// `fn(params) [Type] { ... }` in expression position.
    pub fn allows_lambdas(&self) -> bool {
        matches!(self, Dialect::Extended)
    }

    /// `struct point { ... }` and `point { x = 1 }`.
    pub fn allows_identifier_struct_names(&self) -> bool {
        matches!(self, Dialect::Extended)
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "canonical" => Ok(Dialect::Canonical),
            "extended" => Ok(Dialect::Extended),
            other => Err(format!(
                "unknown dialect `{}`, expected `canonical` or `extended`",
                other
            )),
        }
    }
}

impl Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::Canonical => write!(f, "canonical"),
            Dialect::Extended => write!(f, "extended"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParseOptions {
    #[serde(default)]
    pub dialect: Dialect,
}

impl ParseOptions {
    pub fn new(dialect: Dialect) -> Self {
        ParseOptions { dialect }
    }

    /// Reads the dialect from `FLANG_DIALECT`, falling back to the canonical
    /// dialect when it is unset or unparsable.
    pub fn from_env() -> Self {
        let dialect = match env::var(DIALECT_ENV) {
            Ok(value) => value.parse().unwrap_or_else(|error| {
                tracing::warn!("ignoring {}: {}", DIALECT_ENV, error);
                Dialect::default()
            }),
            Err(_) => Dialect::default(),
        };

        ParseOptions { dialect }
    }
}

#[cfg(test)]
mod tests {
    use super::{Dialect, ParseOptions};

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("canonical".parse::<Dialect>(), Ok(Dialect::Canonical));
        assert_eq!(" Extended ".parse::<Dialect>(), Ok(Dialect::Extended));
        assert!("tree-sitter".parse::<Dialect>().is_err());
    }

    #[test]
    fn test_dialect_features() {
        assert!(!Dialect::Canonical.allows_lambdas());
        assert!(!Dialect::Canonical.allows_uninitialized_let());
        assert!(Dialect::Extended.allows_identifier_struct_names());
    }

    #[test]
    fn test_options_serde() {
        let options = ParseOptions::new(Dialect::Extended);
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(json, r#"{"dialect":"extended"}"#);

        let parsed: ParseOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, ParseOptions::default());
    }
}
