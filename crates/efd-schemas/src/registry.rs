//! Layout registries.

use crate::error::SchemaError;
use crate::schema::{CountDeclaration, RecordSchema};
use efd_canonical::{RecordTag, ValueKind};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};
use tracing::info;

const ICMS_IPI_TABLE: &str = include_str!("../data/icms_ipi.yaml");
const CONTRIBUICOES_TABLE: &str = include_str!("../data/contribuicoes.yaml");

/// EFD layout family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// EFD ICMS/IPI.
    IcmsIpi,
    /// EFD Contribuições.
    Contribuicoes,
}

impl Layout {
    /// Every supported layout.
    pub const ALL: [Layout; 2] = [Layout::IcmsIpi, Layout::Contribuicoes];

    /// Layout name as accepted on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Layout::IcmsIpi => "icms-ipi",
            Layout::Contribuicoes => "contribuicoes",
        }
    }

    fn table(self) -> &'static str {
        match self {
            Layout::IcmsIpi => ICMS_IPI_TABLE,
            Layout::Contribuicoes => CONTRIBUICOES_TABLE,
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "icms-ipi" | "icms_ipi" | "icms" => Ok(Layout::IcmsIpi),
            "contribuicoes" | "contribuições" | "pis-cofins" => Ok(Layout::Contribuicoes),
            other => Err(SchemaError::UnknownLayout(other.to_string())),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct LayoutTable {
    registers: Vec<RecordSchema>,
}

/// Read-only collection of register schemas for one layout.
#[derive(Debug)]
pub struct SchemaRegistry {
    layout: Layout,
    schemas: Vec<Arc<RecordSchema>>,
    by_tag: HashMap<RecordTag, usize>,
}

impl SchemaRegistry {
    /// Parses and validates a layout table.
    pub fn from_yaml(layout: Layout, text: &str) -> Result<Self, SchemaError> {
        let table: LayoutTable = serde_yaml::from_str(text)?;
        Self::from_schemas(layout, table.registers)
    }

    /// Validates a list of schemas and builds a registry from it.
    pub fn from_schemas(layout: Layout, schemas: Vec<RecordSchema>) -> Result<Self, SchemaError> {
        let mut by_tag = HashMap::with_capacity(schemas.len());
        for (index, schema) in schemas.iter().enumerate() {
            if by_tag.insert(schema.tag.clone(), index).is_some() {
                return Err(SchemaError::DuplicateTag(schema.tag.to_string()));
            }
        }
        for schema in &schemas {
            check_fields(schema)?;
            check_hierarchy(schema, &schemas, &by_tag)?;
        }

        info!(layout = %layout, registers = schemas.len(), "layout registry loaded");
        Ok(Self {
            layout,
            schemas: schemas.into_iter().map(Arc::new).collect(),
            by_tag,
        })
    }

    /// Process-wide registry built from the embedded table of `layout`.
    pub fn builtin(layout: Layout) -> Arc<SchemaRegistry> {
        static ICMS_IPI: OnceLock<Arc<SchemaRegistry>> = OnceLock::new();
        static CONTRIBUICOES: OnceLock<Arc<SchemaRegistry>> = OnceLock::new();

        let cell = match layout {
            Layout::IcmsIpi => &ICMS_IPI,
            Layout::Contribuicoes => &CONTRIBUICOES,
        };
        cell.get_or_init(|| {
            Arc::new(
                SchemaRegistry::from_yaml(layout, layout.table())
                    .expect("embedded layout table is valid"),
            )
        })
        .clone()
    }

    /// Layout this registry describes.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Schema of a register.
    pub fn get(&self, tag: &str) -> Result<Arc<RecordSchema>, SchemaError> {
        RecordTag::parse(tag)
            .ok()
            .and_then(|tag| self.by_tag.get(&tag))
            .map(|&index| Arc::clone(&self.schemas[index]))
            .ok_or_else(|| SchemaError::UnknownRecordType(tag.to_string()))
    }

    /// Registered tags in table order.
    pub fn tags(&self) -> impl Iterator<Item = &RecordTag> {
        self.schemas.iter().map(|schema| &schema.tag)
    }

    /// Schemas in table order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<RecordSchema>> {
        self.schemas.iter()
    }

    /// Number of registers.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

fn check_fields(schema: &RecordSchema) -> Result<(), SchemaError> {
    let tag = schema.tag.to_string();
    let mut seen = HashSet::new();
    for field in &schema.fields {
        if !seen.insert(field.name.as_str()) {
            return Err(SchemaError::DuplicateField {
                tag,
                field: field.name.to_string(),
            });
        }
    }

    for rule in &schema.rules {
        for name in rule.referenced_fields() {
            if schema.field(name.as_str()).is_none() {
                return Err(SchemaError::UnknownFieldReference {
                    tag,
                    context: rule.kind().to_string(),
                    field: name.to_string(),
                });
            }
        }
        rule.check_shape().map_err(|reason| SchemaError::InvalidRule {
            tag: tag.clone(),
            context: rule.kind().to_string(),
            reason,
        })?;
    }

    if let Some(count) = &schema.count {
        check_count(schema, count)?;
    }
    Ok(())
}

fn check_count(schema: &RecordSchema, count: &CountDeclaration) -> Result<(), SchemaError> {
    let tag = schema.tag.to_string();
    for name in count.fields() {
        if schema.field(name.as_str()).is_none() {
            return Err(SchemaError::UnknownFieldReference {
                tag: tag.clone(),
                context: "count".into(),
                field: name.to_string(),
            });
        }
    }

    let expect_kind = |name: &str, kind: ValueKind| -> Result<(), SchemaError> {
        match schema.field(name) {
            Some(spec) if spec.kind == kind => Ok(()),
            _ => Err(SchemaError::InvalidRule {
                tag: tag.clone(),
                context: "count".into(),
                reason: format!("{name} must be a {kind} field"),
            }),
        }
    };
    match count {
        CountDeclaration::BlockLines { field } => {
            expect_kind(field.as_str(), ValueKind::Integer)?;
            if !schema.is_block_closer() {
                return Err(SchemaError::InvalidRule {
                    tag: schema.tag.to_string(),
                    context: "count".into(),
                    reason: "block_lines belongs on a block closing register".into(),
                });
            }
        }
        CountDeclaration::FileLines { field } => expect_kind(field.as_str(), ValueKind::Integer)?,
        CountDeclaration::RegisterCount {
            register_field,
            count_field,
        } => {
            expect_kind(register_field.as_str(), ValueKind::Text)?;
            expect_kind(count_field.as_str(), ValueKind::Integer)?;
        }
    }
    Ok(())
}

fn check_hierarchy(
    schema: &RecordSchema,
    schemas: &[RecordSchema],
    by_tag: &HashMap<RecordTag, usize>,
) -> Result<(), SchemaError> {
    let tag = schema.tag.to_string();
    match (&schema.parent, schema.level) {
        (Some(_), 0 | 1) => Err(SchemaError::BadHierarchy {
            tag,
            reason: format!("level {} registers take no parent", schema.level),
        }),
        (None, 0 | 1) => Ok(()),
        (None, level) => Err(SchemaError::BadHierarchy {
            tag,
            reason: format!("level {level} register needs a parent"),
        }),
        (Some(parent), level) => {
            let Some(&index) = by_tag.get(parent) else {
                return Err(SchemaError::MissingParent {
                    tag,
                    parent: parent.to_string(),
                });
            };
            let parent_schema = &schemas[index];
            if parent_schema.level + 1 != level {
                return Err(SchemaError::BadHierarchy {
                    tag,
                    reason: format!(
                        "level {level} under {parent} at level {}",
                        parent_schema.level
                    ),
                });
            }
            if parent_schema.block() != schema.block() {
                return Err(SchemaError::BadHierarchy {
                    tag,
                    reason: format!("parent {parent} belongs to another block"),
                });
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_tables_load() {
        for layout in Layout::ALL {
            let registry = SchemaRegistry::from_yaml(layout, layout.table()).unwrap();
            assert!(registry.len() > 30, "{layout} has {} registers", registry.len());
        }
    }

    #[test]
    fn builtin_is_shared() {
        let first = SchemaRegistry::builtin(Layout::IcmsIpi);
        let second = SchemaRegistry::builtin(Layout::IcmsIpi);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn layout_names_round_trip() {
        for layout in Layout::ALL {
            assert_eq!(layout.as_str().parse::<Layout>().unwrap(), layout);
        }
        assert!("ecd".parse::<Layout>().is_err());
    }

    #[test]
    fn lookup_of_unknown_tag_fails() {
        let registry = SchemaRegistry::builtin(Layout::Contribuicoes);
        assert!(matches!(
            registry.get("Z999"),
            Err(SchemaError::UnknownRecordType(tag)) if tag == "Z999"
        ));
        assert!(registry.get("c100").is_err());
        assert_eq!(registry.get("C100").unwrap().level, 3);
    }
}
