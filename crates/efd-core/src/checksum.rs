//! Check-digit validation for structured identifiers.

/// Validates check digits of the identifiers business rules delegate.
pub trait ChecksumValidator: Send + Sync {
    /// Whether a 44-digit electronic document access key is valid.
    fn access_key_valid(&self, key: &str) -> bool;
    /// Whether an 11-digit natural-person tax id (CPF) is valid.
    fn person_id_valid(&self, id: &str) -> bool;
}

/// Modulo-11 validator used by the Brazilian tax identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Modulo11;

const ACCESS_KEY_LEN: usize = 44;
const PERSON_ID_LEN: usize = 11;

fn digits(text: &str, len: usize) -> Option<Vec<u32>> {
    if text.len() != len {
        return None;
    }
    text.chars().map(|c| c.to_digit(10)).collect()
}

/// Check digit for a run of digits weighted right to left with 2, 3, ... `max_weight`.
fn check_digit(digits: &[u32], max_weight: u32) -> u32 {
    let mut weight = 2;
    let mut sum = 0;
    for digit in digits.iter().rev() {
        sum += digit * weight;
        weight = if weight == max_weight { 2 } else { weight + 1 };
    }
    match sum % 11 {
        0 | 1 => 0,
        rest => 11 - rest,
    }
}

impl ChecksumValidator for Modulo11 {
    fn access_key_valid(&self, key: &str) -> bool {
        let Some(digits) = digits(key, ACCESS_KEY_LEN) else {
            return false;
        };
        let (body, dv) = digits.split_at(ACCESS_KEY_LEN - 1);
        check_digit(body, 9) == dv[0]
    }

    fn person_id_valid(&self, id: &str) -> bool {
        let Some(digits) = digits(id, PERSON_ID_LEN) else {
            return false;
        };
        if digits.iter().all(|&d| d == digits[0]) {
            return false;
        }
        check_digit(&digits[..9], 11) == digits[9] && check_digit(&digits[..10], 11) == digits[10]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "35240101234567000190550010000001231000001230";

    #[test]
    fn accepts_valid_access_key() {
        assert!(Modulo11.access_key_valid(KEY));
    }

    #[test]
    fn rejects_wrong_final_digit() {
        let mut key = KEY.to_string();
        key.replace_range(43.., "7");
        assert!(!Modulo11.access_key_valid(&key));
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(!Modulo11.access_key_valid(&KEY[..43]));
        assert!(!Modulo11.access_key_valid(&KEY.replace('5', "X")));
    }

    #[test]
    fn person_ids() {
        assert!(Modulo11.person_id_valid("52998224725"));
        assert!(Modulo11.person_id_valid("11144477735"));
        assert!(!Modulo11.person_id_valid("52998224724"));
        assert!(!Modulo11.person_id_valid("11111111111"));
        assert!(!Modulo11.person_id_valid("5299822472"));
    }
}
