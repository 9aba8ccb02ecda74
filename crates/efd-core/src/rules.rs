//! Business rule evaluation over one record's canonical values.
//!
//! Absent numeric operands count as zero. A failing rule yields one
//! [`RecordError`], except sign rules, which report each offending field;
//! evaluation never stops early.

use crate::checksum::ChecksumValidator;
use efd_canonical::{FieldName, FieldValue, RecordError};
use efd_schemas::{
    suffix_of, BusinessRule, ChecksumKind, ChecksumRule, Clamp, CompareRule, Condition,
    ConditionalPresenceRule, EqualityRule, ExclusivePresenceRule, Expr, Operand, RecordSchema,
    Requirement, SignRule,
};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

static ABSENT: FieldValue = FieldValue::Absent;

/// Evaluates the rules of a schema against values in schema order.
pub struct RuleEvaluator<'a> {
    schema: &'a RecordSchema,
    values: &'a [FieldValue],
    checksum: &'a dyn ChecksumValidator,
}

impl<'a> RuleEvaluator<'a> {
    /// Creates an evaluator.
    pub fn new(
        schema: &'a RecordSchema,
        values: &'a [FieldValue],
        checksum: &'a dyn ChecksumValidator,
    ) -> Self {
        Self {
            schema,
            values,
            checksum,
        }
    }

    /// Runs every rule of the schema and returns the failures in rule order.
    pub fn evaluate(&self) -> Vec<RecordError> {
        self.schema
            .rules
            .iter()
            .flat_map(|rule| self.check(rule))
            .collect()
    }

    /// Runs a single rule and returns its failures.
    pub fn check(&self, rule: &BusinessRule) -> Vec<RecordError> {
        let single = match rule {
            BusinessRule::Equality(rule) => self.equality(rule),
            BusinessRule::ConditionalPresence(rule) => self.conditional_presence(rule),
            BusinessRule::ExclusivePresence(rule) => self.exclusive_presence(rule),
            BusinessRule::Sign(rule) => return self.sign(rule),
            BusinessRule::Compare(rule) => self.compare(rule),
            BusinessRule::Checksum(rule) => self.checksum(rule),
        };
        single.into_iter().collect()
    }

    fn value(&self, name: &FieldName) -> &FieldValue {
        self.schema
            .field_index(name.as_str())
            .and_then(|i| self.values.get(i))
            .unwrap_or(&ABSENT)
    }

    fn text(&self, name: &FieldName) -> Option<String> {
        self.value(name).canonical_text()
    }

    /// Numeric view of a field; absent counts as zero.
    fn number(&self, name: &FieldName) -> Decimal {
        match self.value(name) {
            FieldValue::Text(text) => Decimal::from_str(text).unwrap_or(Decimal::ZERO),
            other => other.as_decimal().unwrap_or(Decimal::ZERO),
        }
    }

    fn eval(&self, expr: &Expr) -> Option<Decimal> {
        match expr {
            Expr::Product { factors, divisor } => {
                let mut product = Decimal::ONE;
                for factor in factors {
                    product = product.checked_mul(self.number(factor))?;
                }
                product.checked_div(*divisor)
            }
            Expr::Sum { plus, minus } => {
                let mut total = Decimal::ZERO;
                for name in plus {
                    total = total.checked_add(self.number(name))?;
                }
                for name in minus {
                    total = total.checked_sub(self.number(name))?;
                }
                Some(total)
            }
        }
    }

    fn condition_holds(&self, condition: Option<&Condition>) -> bool {
        match condition {
            Some(condition) => condition.holds(self.text(&condition.field).as_deref()),
            None => true,
        }
    }

    fn violation(
        &self,
        field: &FieldName,
        rule: &str,
        message: Option<&String>,
        default: impl FnOnce() -> String,
    ) -> RecordError {
        RecordError::BusinessRuleViolation {
            tag: self.schema.tag.clone(),
            field: field.to_string(),
            rule: rule.to_string(),
            message: message.cloned().unwrap_or_else(default),
        }
    }

    fn equality(&self, rule: &EqualityRule) -> Option<RecordError> {
        let expr = match &rule.alternate {
            Some(alternate) if self.number(&alternate.switch) > Decimal::ZERO => &alternate.expr,
            _ => &rule.expr,
        };
        let Some(mut expected) = self.eval(expr) else {
            return Some(self.violation(&rule.target, "equality", None, || {
                format!("{} cannot be computed: arithmetic overflow", rule.target)
            }));
        };
        expected = match rule.clamp {
            Some(Clamp::PositivePart) => expected.max(Decimal::ZERO),
            Some(Clamp::NegativePart) => (-expected).max(Decimal::ZERO),
            None => expected,
        };
        let mut declared = self.number(&rule.target);
        if !rule.compare_raw {
            expected =
                expected.round_dp_with_strategy(rule.precision, RoundingStrategy::MidpointAwayFromZero);
            declared =
                declared.round_dp_with_strategy(rule.precision, RoundingStrategy::MidpointAwayFromZero);
        }
        if (declared - expected).abs() <= rule.tolerance {
            return None;
        }

        let detail = format!("declared {declared}, expected {expected}");
        Some(RecordError::BusinessRuleViolation {
            tag: self.schema.tag.clone(),
            field: rule.target.to_string(),
            rule: "equality".into(),
            message: match &rule.message {
                Some(message) => format!("{message} ({detail})"),
                None => format!("{} does not match its computed value ({detail})", rule.target),
            },
        })
    }

    fn conditional_presence(&self, rule: &ConditionalPresenceRule) -> Option<RecordError> {
        if !self.condition_holds(rule.when.as_ref()) {
            return None;
        }
        let value = self.value(&rule.field);
        let ok = match rule.require {
            Requirement::Present => value.is_present(),
            Requirement::Absent => value.is_absent_or_zero(),
            Requirement::OneOf => value
                .canonical_text()
                .is_some_and(|text| rule.allowed.iter().any(|allowed| *allowed == text)),
        };
        if ok {
            return None;
        }
        Some(self.violation(&rule.field, "conditional_presence", rule.message.as_ref(), || {
            match rule.require {
                Requirement::Present => format!("{} must be supplied", rule.field),
                Requirement::Absent => format!("{} must be empty or zero", rule.field),
                Requirement::OneOf => {
                    format!("{} must be one of {}", rule.field, rule.allowed.join(", "))
                }
            }
        }))
    }

    fn exclusive_presence(&self, rule: &ExclusivePresenceRule) -> Option<RecordError> {
        if !self.condition_holds(rule.when.as_ref()) {
            return None;
        }
        let present = rule
            .fields
            .iter()
            .filter(|name| self.value(name).is_present())
            .count();
        if present == 1 {
            return None;
        }
        let names: Vec<&str> = rule.fields.iter().map(|f| f.as_str()).collect();
        Some(self.violation(&rule.fields[0], "exclusive_presence", rule.message.as_ref(), || {
            format!("exactly one of {} must be supplied", names.join(", "))
        }))
    }

    fn sign(&self, rule: &SignRule) -> Vec<RecordError> {
        let must_be_zero = match &rule.exempt {
            Some(exempt) => {
                let text = self.text(&exempt.field).unwrap_or_default();
                let discriminant = suffix_of(&text, exempt.suffix);
                if exempt.unchecked_values.iter().any(|v| v == discriminant) {
                    return Vec::new();
                }
                exempt.zero_values.iter().any(|v| v == discriminant)
            }
            None => false,
        };

        rule.fields
            .iter()
            .filter(|name| {
                if must_be_zero {
                    !self.value(name).is_absent_or_zero()
                } else {
                    self.number(name) <= Decimal::ZERO
                }
            })
            .map(|offending| {
                self.violation(offending, "sign", rule.message.as_ref(), || {
                    if must_be_zero {
                        format!("{offending} must be zero")
                    } else {
                        format!("{offending} must be greater than zero")
                    }
                })
            })
            .collect()
    }

    fn compare(&self, rule: &CompareRule) -> Option<RecordError> {
        let left = self.number(&rule.field);
        let right = match &rule.operand {
            Operand::Field { name } => Some(self.number(name)),
            Operand::Constant { value } => Some(*value),
            Operand::Expr { expr } => self.eval(expr),
        };
        let holds = right.is_some_and(|right| rule.op.holds(left, right));
        if holds {
            return None;
        }
        Some(self.violation(&rule.field, "compare", rule.message.as_ref(), || {
            let rhs = match &rule.operand {
                Operand::Field { name } => name.to_string(),
                Operand::Constant { value } => value.to_string(),
                Operand::Expr { .. } => right.map_or_else(|| "overflow".into(), |r| r.to_string()),
            };
            format!("{} must be {} {rhs}", rule.field, rule.op.symbol())
        }))
    }

    fn checksum(&self, rule: &ChecksumRule) -> Option<RecordError> {
        let text = self.text(&rule.field)?;
        let valid = match rule.check {
            ChecksumKind::AccessKey => self.checksum.access_key_valid(&text),
            ChecksumKind::PersonId => self.checksum.person_id_valid(&text),
        };
        if valid {
            return None;
        }
        Some(RecordError::ChecksumFailure {
            tag: self.schema.tag.clone(),
            field: rule.field.to_string(),
            value: text,
            message: rule
                .message
                .clone()
                .unwrap_or_else(|| "invalid check digit".to_string()),
        })
    }
}
