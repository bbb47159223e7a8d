use std::collections::HashMap;

use shared::domain::{FieldId, SupplierType};

/// Digit-grouping display masks. Optional: a controller built without one
/// skips masking and behaves the same otherwise.
pub trait InputMasker {
    fn apply(&mut self, field: FieldId, pattern: &'static str);
    fn remove(&mut self, field: FieldId);
    /// Display form of `value` under the field's current mask.
    fn display(&self, field: FieldId, value: &str) -> String;
}

/// Renders `raw` through `pattern`, where `0` is a digit slot and every other
/// character is a literal. Literals are emitted only when another digit
/// follows, so partial input never ends in a separator.
pub fn format_digits(pattern: &str, raw: &str) -> String {
    let mut digits = raw.chars().filter(char::is_ascii_digit).peekable();
    let mut out = String::with_capacity(pattern.len());
    let mut pending_literals = String::new();

    for slot in pattern.chars() {
        if slot == '0' {
            let Some(digit) = digits.next() else { break };
            out.push_str(&pending_literals);
            pending_literals.clear();
            out.push(digit);
        } else {
            if digits.peek().is_none() {
                break;
            }
            pending_literals.push(slot);
        }
    }
    out
}

pub fn format_tax_id(value: &str, supplier_type: SupplierType) -> String {
    format_digits(supplier_type.tax_id_mask(), value)
}

#[derive(Debug, Clone, Default)]
pub struct DigitMasker {
    patterns: HashMap<FieldId, &'static str>,
}

impl DigitMasker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pattern(&self, field: FieldId) -> Option<&'static str> {
        self.patterns.get(&field).copied()
    }
}

impl InputMasker for DigitMasker {
    fn apply(&mut self, field: FieldId, pattern: &'static str) {
        self.patterns.insert(field, pattern);
    }

    fn remove(&mut self, field: FieldId) {
        self.patterns.remove(&field);
    }

    fn display(&self, field: FieldId, value: &str) -> String {
        match self.pattern(field) {
            Some(pattern) => format_digits(pattern, value),
            None => value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::{PHONE_MASK, ZIP_CODE_MASK};

    #[test]
    fn formats_complete_values() {
        assert_eq!(
            format_tax_id("11222333000181", SupplierType::Corporate),
            "11.222.333/0001-81"
        );
        assert_eq!(
            format_tax_id("52998224725", SupplierType::Individual),
            "529.982.247-25"
        );
        assert_eq!(format_digits(ZIP_CODE_MASK, "01310100"), "01310-100");
        assert_eq!(format_digits(PHONE_MASK, "81998765432"), "(81) 99876-5432");
    }

    #[test]
    fn partial_input_does_not_end_with_literal() {
        assert_eq!(format_digits(ZIP_CODE_MASK, "01310"), "01310");
        assert_eq!(format_digits(ZIP_CODE_MASK, "013101"), "01310-1");
        assert_eq!(format_digits(PHONE_MASK, ""), "");
    }

    #[test]
    fn leading_literal_waits_for_first_digit() {
        assert_eq!(format_digits(PHONE_MASK, "8"), "(8");
    }

    #[test]
    fn ignores_non_digits_and_overflow() {
        assert_eq!(format_digits(ZIP_CODE_MASK, "01.310-100 999"), "01310-100");
    }

    #[test]
    fn masker_tracks_pattern_per_field() {
        let mut masker = DigitMasker::new();
        masker.apply(FieldId::ZipCode, ZIP_CODE_MASK);
        assert_eq!(masker.display(FieldId::ZipCode, "50030230"), "50030-230");
        assert_eq!(masker.display(FieldId::City, "Recife"), "Recife");

        masker.remove(FieldId::ZipCode);
        assert_eq!(masker.display(FieldId::ZipCode, "50030230"), "50030230");
    }
}
