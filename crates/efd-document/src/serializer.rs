use crate::format::LineFormat;
use efd_canonical::FieldValue;
use efd_core::CanonicalRecord;
use rust_decimal::Decimal;

/// Renders one record as a delimited line, without the terminator.
///
/// Fields follow schema order. Decimals keep the places they were
/// standardized to and use the format's separator; absent values become
/// empty segments. Nothing is validated here.
pub fn serialize(record: &CanonicalRecord, format: &LineFormat) -> String {
    let delimiter = format.delimiter;
    let mut line = String::new();
    if format.enclosed {
        line.push(delimiter);
    }
    line.push_str(record.tag().as_str());
    for value in record.values() {
        line.push(delimiter);
        line.push_str(&render_value(value, format));
    }
    if format.enclosed {
        line.push(delimiter);
    }
    line
}

fn render_value(value: &FieldValue, format: &LineFormat) -> String {
    match value {
        FieldValue::Decimal(d) => render_decimal(*d, format.decimal_separator),
        other => other.canonical_text().unwrap_or_default(),
    }
}

fn render_decimal(value: Decimal, separator: char) -> String {
    // Negative zero would otherwise print a sign.
    let value = if value.is_zero() { value.abs() } else { value };
    let text = value.to_string();
    if separator == '.' {
        text
    } else {
        text.replace('.', &separator.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn decimals_use_separator_and_keep_places() {
        let d = Decimal::from_str("1234.50").unwrap();
        assert_eq!(render_decimal(d, ','), "1234,50");
        assert_eq!(render_decimal(d, '.'), "1234.50");
        assert_eq!(render_decimal(-d, ','), "-1234,50");
    }

    #[test]
    fn negative_zero_prints_unsigned() {
        let zero = -Decimal::from_str("0.00").unwrap();
        assert_eq!(render_decimal(zero, ','), "0,00");
    }
}
