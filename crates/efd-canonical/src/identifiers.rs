use crate::validation::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! newtype {
    ($name:ident, $doc:expr, $pattern:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parses a validated identifier from a string.
            pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
                let s = value.into();
                if !Regex::new($pattern).expect("invalid regex").is_match(&s) {
                    return Err(ValidationError::PatternMismatch {
                        field: stringify!($name),
                        value: s,
                    });
                }
                Ok(Self(s))
            }

            /// Returns the identifier text.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

newtype!(
    RecordTag,
    "Register code such as `C100` or `0000` (pattern: `[0-9A-Z]{4}`).",
    r"^[0-9A-Z]{4}$"
);
newtype!(
    FieldName,
    "Upper-case field identifier such as `VL_DOC`.",
    r"^[A-Z][A-Z0-9_]*$"
);

impl RecordTag {
    /// Block the register belongs to (first character of the tag).
    pub fn block(&self) -> BlockId {
        // The pattern guarantees four ASCII characters.
        BlockId(self.0.as_bytes()[0] as char)
    }
}

impl FieldName {
    /// Case-insensitive comparison against raw input keys.
    pub fn matches_key(&self, key: &str) -> bool {
        self.0.eq_ignore_ascii_case(key.trim())
    }
}

/// Block identifier: `0`, `A`, `B`, `C`, `D`, `E`, `K`, `M`, `1`, `9`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockId(char);

impl BlockId {
    /// Creates a block identifier from an upper-case alphanumeric character.
    pub fn new(id: char) -> Result<Self, ValidationError> {
        if !(id.is_ascii_digit() || id.is_ascii_uppercase()) {
            return Err(ValidationError::PatternMismatch {
                field: "BlockId",
                value: id.to_string(),
            });
        }
        Ok(Self(id))
    }

    /// Returns the block character.
    pub fn as_char(self) -> char {
        self.0
    }

    /// Tag of the register that opens this block (`X001`).
    pub fn opener(self) -> String {
        format!("{}001", self.0)
    }

    /// Tag of the register that closes this block (`X990`).
    pub fn closer(self) -> String {
        format!("{}990", self.0)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
