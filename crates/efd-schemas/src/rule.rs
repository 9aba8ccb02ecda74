//! Business rule descriptors.
//!
//! Rules are data: a closed set of kinds parameterized by field names and
//! numeric constants. Evaluation lives in `efd-core`; this module only
//! describes rules and checks their shape when a table is loaded.

use efd_canonical::FieldName;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

fn default_precision() -> u32 {
    2
}

fn default_divisor() -> Decimal {
    Decimal::ONE
}

/// One per-register semantic or arithmetic rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BusinessRule {
    /// `target ≈ expr` within a tolerance.
    Equality(EqualityRule),
    /// A field must be present, absent or in a set when a condition holds.
    ConditionalPresence(ConditionalPresenceRule),
    /// Exactly one of two fields is present.
    ExclusivePresence(ExclusivePresenceRule),
    /// Listed fields must be positive, unless exempted.
    Sign(SignRule),
    /// `field <op> operand`.
    Compare(CompareRule),
    /// Delegated check-digit validation.
    Checksum(ChecksumRule),
}

/// Arithmetic expression over record fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Expr {
    /// Product of the factors divided by `divisor`.
    Product {
        /// Factor fields.
        factors: Vec<FieldName>,
        /// Divisor, `1` or `100` in practice.
        #[serde(default = "default_divisor")]
        divisor: Decimal,
    },
    /// Sum of `plus` minus sum of `minus`.
    Sum {
        /// Added fields.
        #[serde(default)]
        plus: Vec<FieldName>,
        /// Subtracted fields.
        #[serde(default)]
        minus: Vec<FieldName>,
    },
}

impl Expr {
    /// Fields the expression reads.
    pub fn fields(&self) -> Vec<&FieldName> {
        match self {
            Expr::Product { factors, .. } => factors.iter().collect(),
            Expr::Sum { plus, minus } => plus.iter().chain(minus).collect(),
        }
    }

    fn check(&self) -> Result<(), String> {
        match self {
            Expr::Product { factors, divisor } => {
                if factors.is_empty() {
                    return Err("product needs at least one factor".into());
                }
                if divisor.is_zero() {
                    return Err("product divisor must not be zero".into());
                }
            }
            Expr::Sum { plus, minus } => {
                if plus.is_empty() && minus.is_empty() {
                    return Err("sum needs at least one operand".into());
                }
            }
        }
        Ok(())
    }
}

/// Part of the computed value that is kept before comparing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Clamp {
    /// `max(expr, 0)`.
    PositivePart,
    /// `max(-expr, 0)`.
    NegativePart,
}

/// Alternate expression used when a switch field is greater than zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Alternate {
    /// Field whose positive value selects the alternate expression.
    pub switch: FieldName,
    /// Expression used instead of the main one.
    pub expr: Expr,
}

/// Equality-with-tolerance rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EqualityRule {
    /// Declared field.
    pub target: FieldName,
    /// Expected value.
    pub expr: Expr,
    /// Decimal places both sides are rounded to.
    #[serde(default = "default_precision")]
    pub precision: u32,
    /// Largest accepted absolute difference.
    #[serde(default)]
    pub tolerance: Decimal,
    /// Optional clamp applied to the computed value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clamp: Option<Clamp>,
    /// Optional alternate expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate: Option<Alternate>,
    /// Compare the unrounded values.
    #[serde(default)]
    pub compare_raw: bool,
    /// Message reported on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Condition on the canonical text of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Condition {
    /// Discriminant field.
    pub field: FieldName,
    /// Accepted values.
    pub values: Vec<String>,
    /// Compare only the last `suffix` characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<usize>,
}

impl Condition {
    /// Whether the condition holds for the given canonical text.
    pub fn holds(&self, text: Option<&str>) -> bool {
        match text {
            Some(text) => {
                let probe = suffix_of(text, self.suffix);
                self.values.iter().any(|value| value == probe)
            }
            None => false,
        }
    }
}

/// Last `suffix` characters of `text`, or the whole text.
pub fn suffix_of(text: &str, suffix: Option<usize>) -> &str {
    match suffix {
        Some(n) => {
            let count = text.chars().count();
            if count <= n {
                text
            } else {
                let start = text
                    .char_indices()
                    .nth(count - n)
                    .map_or(0, |(index, _)| index);
                &text[start..]
            }
        }
        None => text,
    }
}

/// What a conditional-presence rule demands of the dependent field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    /// The field must be supplied.
    Present,
    /// The field must be absent or zero.
    Absent,
    /// The field text must be one of `allowed`.
    OneOf,
}

/// Conditional-presence rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConditionalPresenceRule {
    /// Condition; the rule always applies when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<Condition>,
    /// Dependent field.
    pub field: FieldName,
    /// Requirement on the dependent field.
    pub require: Requirement,
    /// Allowed values for [`Requirement::OneOf`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<String>,
    /// Message reported on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Exclusive-presence rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExclusivePresenceRule {
    /// The two mutually exclusive fields.
    pub fields: Vec<FieldName>,
    /// Condition; the rule always applies when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<Condition>,
    /// Message reported on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Discriminant that relaxes a sign rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Exemption {
    /// Discriminant field.
    pub field: FieldName,
    /// Compare only the last `suffix` characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<usize>,
    /// Values for which the fields must be exactly zero.
    #[serde(default)]
    pub zero_values: Vec<String>,
    /// Values for which no check applies.
    #[serde(default)]
    pub unchecked_values: Vec<String>,
}

/// Range/sign rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignRule {
    /// Fields that must be greater than zero; absent counts as zero.
    pub fields: Vec<FieldName>,
    /// Optional exemption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exempt: Option<Exemption>,
    /// Message reported on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `==`
    Eq,
    /// `>=`
    Ge,
    /// `>`
    Gt,
    /// `!=`
    Ne,
}

impl CompareOp {
    /// Applies the operator.
    pub fn holds(self, left: Decimal, right: Decimal) -> bool {
        match self {
            CompareOp::Lt => left < right,
            CompareOp::Le => left <= right,
            CompareOp::Eq => left == right,
            CompareOp::Ge => left >= right,
            CompareOp::Gt => left > right,
            CompareOp::Ne => left != right,
        }
    }

    /// Operator symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Eq => "=",
            CompareOp::Ge => ">=",
            CompareOp::Gt => ">",
            CompareOp::Ne => "<>",
        }
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "from", rename_all = "snake_case")]
pub enum Operand {
    /// Another field of the record.
    Field {
        /// Field name.
        name: FieldName,
    },
    /// A constant.
    Constant {
        /// Constant value.
        value: Decimal,
    },
    /// An expression over the record.
    Expr {
        /// Expression.
        expr: Expr,
    },
}

/// Comparison rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompareRule {
    /// Left-hand field.
    pub field: FieldName,
    /// Operator.
    pub op: CompareOp,
    /// Right-hand side.
    pub operand: Operand,
    /// Message reported on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Kind of structured identifier checked by a delegated validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecksumKind {
    /// 44-digit electronic document access key.
    AccessKey,
    /// 11-digit natural-person tax id (CPF).
    PersonId,
}

/// Delegated checksum rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChecksumRule {
    /// Checked field.
    pub field: FieldName,
    /// Identifier kind.
    pub check: ChecksumKind,
    /// Message reported on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl BusinessRule {
    /// Rule kind as written in schema tables.
    pub fn kind(&self) -> &'static str {
        match self {
            BusinessRule::Equality(_) => "equality",
            BusinessRule::ConditionalPresence(_) => "conditional_presence",
            BusinessRule::ExclusivePresence(_) => "exclusive_presence",
            BusinessRule::Sign(_) => "sign",
            BusinessRule::Compare(_) => "compare",
            BusinessRule::Checksum(_) => "checksum",
        }
    }

    /// Every field name the rule reads.
    pub fn referenced_fields(&self) -> Vec<&FieldName> {
        let mut fields = Vec::new();
        match self {
            BusinessRule::Equality(rule) => {
                fields.push(&rule.target);
                fields.extend(rule.expr.fields());
                if let Some(alternate) = &rule.alternate {
                    fields.push(&alternate.switch);
                    fields.extend(alternate.expr.fields());
                }
            }
            BusinessRule::ConditionalPresence(rule) => {
                fields.extend(rule.when.as_ref().map(|c| &c.field));
                fields.push(&rule.field);
            }
            BusinessRule::ExclusivePresence(rule) => {
                fields.extend(rule.fields.iter());
                fields.extend(rule.when.as_ref().map(|c| &c.field));
            }
            BusinessRule::Sign(rule) => {
                fields.extend(rule.fields.iter());
                fields.extend(rule.exempt.as_ref().map(|e| &e.field));
            }
            BusinessRule::Compare(rule) => {
                fields.push(&rule.field);
                match &rule.operand {
                    Operand::Field { name } => fields.push(name),
                    Operand::Constant { .. } => {}
                    Operand::Expr { expr } => fields.extend(expr.fields()),
                }
            }
            BusinessRule::Checksum(rule) => fields.push(&rule.field),
        }
        fields
    }

    /// Checks parameters that field references alone cannot catch.
    pub fn check_shape(&self) -> Result<(), String> {
        match self {
            BusinessRule::Equality(rule) => {
                rule.expr.check()?;
                if let Some(alternate) = &rule.alternate {
                    alternate.expr.check()?;
                }
                if rule.precision > 28 {
                    return Err(format!("precision {} exceeds 28", rule.precision));
                }
                if rule.tolerance.is_sign_negative() {
                    return Err("tolerance must not be negative".into());
                }
            }
            BusinessRule::ConditionalPresence(rule) => {
                if rule.require == Requirement::OneOf && rule.allowed.is_empty() {
                    return Err("one_of requires a non-empty allowed list".into());
                }
            }
            BusinessRule::ExclusivePresence(rule) => {
                if rule.fields.len() != 2 {
                    return Err("exclusive_presence takes exactly two fields".into());
                }
            }
            BusinessRule::Sign(rule) => {
                if rule.fields.is_empty() {
                    return Err("sign needs at least one field".into());
                }
            }
            BusinessRule::Compare(rule) => {
                if let Operand::Expr { expr } = &rule.operand {
                    expr.check()?;
                }
            }
            BusinessRule::Checksum(_) => {}
        }
        Ok(())
    }
}
