//! Register schemas.

use crate::rule::BusinessRule;
use efd_canonical::{BlockId, FieldName, FieldSpec, RecordTag};
use serde::{Deserialize, Serialize};

/// Count a closing register declares about the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CountDeclaration {
    /// `field` holds the number of lines of the register's block.
    BlockLines {
        /// Integer field with the declared count.
        field: FieldName,
    },
    /// One record per register type: `count_field` lines of `register_field`.
    RegisterCount {
        /// Text field naming the counted register.
        register_field: FieldName,
        /// Integer field with the declared count.
        count_field: FieldName,
    },
    /// `field` holds the number of lines of the whole file.
    FileLines {
        /// Integer field with the declared count.
        field: FieldName,
    },
}

impl CountDeclaration {
    /// Fields the declaration reads.
    pub fn fields(&self) -> Vec<&FieldName> {
        match self {
            CountDeclaration::BlockLines { field } | CountDeclaration::FileLines { field } => {
                vec![field]
            }
            CountDeclaration::RegisterCount {
                register_field,
                count_field,
            } => vec![register_field, count_field],
        }
    }
}

/// Layout of one register: fields, hierarchy position and rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordSchema {
    /// Register tag.
    pub tag: RecordTag,
    /// Hierarchy level: 0 for the file envelope, 1 for block openers and closers.
    pub level: u8,
    /// Required immediate parent, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<RecordTag>,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Ordered field specs; order is the serialized field order.
    pub fields: Vec<FieldSpec>,
    /// Business rules evaluated after field checks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<BusinessRule>,
    /// Count declaration of closing registers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<CountDeclaration>,
}

impl RecordSchema {
    /// Block the register belongs to.
    pub fn block(&self) -> BlockId {
        self.tag.block()
    }

    /// Position of a field in the ordered field list.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name.as_str() == name)
    }

    /// Field spec by exact name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name.as_str() == name)
    }

    /// Whether this register opens its block (`X001`).
    pub fn is_block_opener(&self) -> bool {
        self.tag.as_str().ends_with("001") && self.level == 1
    }

    /// Whether this register closes its block (`X990`).
    pub fn is_block_closer(&self) -> bool {
        self.tag.as_str().ends_with("990") && self.level == 1
    }
}
