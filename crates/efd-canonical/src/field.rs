use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identifiers::FieldName;
use crate::scale::Scale;
use crate::validation::ValidationError;
use crate::value::ValueKind;

/// Compiled field pattern that remembers its source text.
#[derive(Clone)]
pub struct FieldPattern {
    source: String,
    regex: Regex,
}

impl FieldPattern {
    /// Compiles a pattern.
    pub fn new(source: impl Into<String>) -> Result<Self, ValidationError> {
        let source = source.into();
        let regex = Regex::new(&source).map_err(|err| ValidationError::InvalidPattern {
            pattern: source.clone(),
            reason: err.to_string(),
        })?;
        Ok(Self { source, regex })
    }

    /// Pattern source text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `text` matches.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for FieldPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for FieldPattern {}

impl fmt::Debug for FieldPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FieldPattern").field(&self.source).finish()
    }
}

impl fmt::Display for FieldPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Declarative description of one field of a register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FieldSpecDef", into = "FieldSpecDef")]
pub struct FieldSpec {
    /// Field name, unique within the register.
    pub name: FieldName,
    /// Value kind.
    pub kind: ValueKind,
    /// Whether the field must be supplied.
    pub required: bool,
    /// Fixed-point scale for decimal fields.
    pub scale: Option<Scale>,
    /// Pattern the canonical text must match.
    pub pattern: FieldPattern,
    /// Human-readable description.
    pub description: String,
}

impl FieldSpec {
    /// Builds a field spec, defaulting the pattern from the kind.
    pub fn new(
        name: &str,
        kind: ValueKind,
        required: bool,
        scale: Option<&str>,
        pattern: Option<&str>,
    ) -> Result<Self, ValidationError> {
        Self::try_from(FieldSpecDef {
            name: name.to_string(),
            kind,
            required,
            scale: scale.map(str::to_string),
            pattern: pattern.map(str::to_string),
            description: String::new(),
        })
    }
}

/// Wire shape of a field spec inside schema tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldSpecDef {
    name: String,
    kind: ValueKind,
    #[serde(default)]
    required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pattern: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    description: String,
}

impl TryFrom<FieldSpecDef> for FieldSpec {
    type Error = ValidationError;

    fn try_from(def: FieldSpecDef) -> Result<Self, Self::Error> {
        let name = FieldName::parse(def.name)?;
        let scale = match def.scale {
            Some(descriptor) if def.kind == ValueKind::Decimal => Some(Scale::parse(&descriptor)?),
            Some(descriptor) => {
                return Err(ValidationError::PatternMismatch {
                    field: "scale",
                    value: format!("{name}: {descriptor} on a {} field", def.kind),
                })
            }
            None => None,
        };
        let pattern = FieldPattern::new(
            def.pattern
                .unwrap_or_else(|| def.kind.default_pattern().to_string()),
        )?;
        Ok(Self {
            name,
            kind: def.kind,
            required: def.required,
            scale,
            pattern,
            description: def.description,
        })
    }
}

impl From<FieldSpec> for FieldSpecDef {
    fn from(spec: FieldSpec) -> Self {
        Self {
            name: spec.name.into(),
            kind: spec.kind,
            required: spec.required,
            scale: spec.scale.map(String::from),
            pattern: Some(spec.pattern.as_str().to_string()),
            description: spec.description,
        }
    }
}
