use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CORPORATE_TAX_ID_DIGITS: usize = 14;
pub const INDIVIDUAL_TAX_ID_DIGITS: usize = 11;
pub const ZIP_CODE_DIGITS: usize = 8;

pub const CORPORATE_TAX_ID_MASK: &str = "00.000.000/0000-00";
pub const INDIVIDUAL_TAX_ID_MASK: &str = "000.000.000-00";
pub const ZIP_CODE_MASK: &str = "00000-000";
pub const PHONE_MASK: &str = "(00) 00000-0000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupplierType {
    #[serde(rename = "CORP")]
    Corporate,
    #[serde(rename = "IND")]
    Individual,
}

impl SupplierType {
    pub fn code(self) -> &'static str {
        match self {
            Self::Corporate => "CORP",
            Self::Individual => "IND",
        }
    }

    pub fn max_tax_id_digits(self) -> usize {
        match self {
            Self::Corporate => CORPORATE_TAX_ID_DIGITS,
            Self::Individual => INDIVIDUAL_TAX_ID_DIGITS,
        }
    }

    pub fn tax_id_mask(self) -> &'static str {
        match self {
            Self::Corporate => CORPORATE_TAX_ID_MASK,
            Self::Individual => INDIVIDUAL_TAX_ID_MASK,
        }
    }

    /// Registration fields (state and municipal) only apply to companies.
    pub fn shows_tax_registration(self) -> bool {
        self == Self::Corporate
    }
}

impl fmt::Display for SupplierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown supplier type '{0}' (expected CORP or IND)")]
pub struct UnknownSupplierType(pub String);

impl FromStr for SupplierType {
    type Err = UnknownSupplierType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CORP" | "CORPORATE" => Ok(Self::Corporate),
            "IND" | "INDIVIDUAL" => Ok(Self::Individual),
            _ => Err(UnknownSupplierType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    FullName,
    PreferredName,
    TaxId,
    TaxRegistrationState,
    TaxRegistrationMunicipal,
    Street,
    Number,
    Complement,
    Neighborhood,
    City,
    State,
    ZipCode,
    Phone,
    ContactPerson,
}

impl FieldId {
    pub const ALL: [FieldId; 14] = [
        FieldId::FullName,
        FieldId::PreferredName,
        FieldId::TaxId,
        FieldId::TaxRegistrationState,
        FieldId::TaxRegistrationMunicipal,
        FieldId::Street,
        FieldId::Number,
        FieldId::Complement,
        FieldId::Neighborhood,
        FieldId::City,
        FieldId::State,
        FieldId::ZipCode,
        FieldId::Phone,
        FieldId::ContactPerson,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::FullName => "full_name",
            Self::PreferredName => "preferred_name",
            Self::TaxId => "tax_id",
            Self::TaxRegistrationState => "tax_registration_state",
            Self::TaxRegistrationMunicipal => "tax_registration_municipal",
            Self::Street => "street",
            Self::Number => "number",
            Self::Complement => "complement",
            Self::Neighborhood => "neighborhood",
            Self::City => "city",
            Self::State => "state",
            Self::ZipCode => "zip_code",
            Self::Phone => "phone",
            Self::ContactPerson => "contact_person",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    TaxId,
    ZipCode,
}

impl LookupKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::TaxId => "tax_id",
            Self::ZipCode => "zip_code",
        }
    }

    /// Query-string key the lookup endpoint expects.
    pub fn query_param(self) -> &'static str {
        self.name()
    }

    /// Field whose digits feed the lookup query.
    pub fn source_field(self) -> FieldId {
        match self {
            Self::TaxId => FieldId::TaxId,
            Self::ZipCode => FieldId::ZipCode,
        }
    }

    pub fn required_digits(self) -> usize {
        match self {
            Self::TaxId => CORPORATE_TAX_ID_DIGITS,
            Self::ZipCode => ZIP_CODE_DIGITS,
        }
    }

    /// Supplier type for which this lookup control is enabled.
    pub fn enabled_for(self) -> SupplierType {
        match self {
            Self::TaxId => SupplierType::Corporate,
            Self::ZipCode => SupplierType::Individual,
        }
    }

    pub fn is_enabled_for(self, supplier_type: SupplierType) -> bool {
        self.enabled_for() == supplier_type
    }

    /// Field that receives focus after a successful lookup.
    pub fn focus_after_success(self) -> FieldId {
        match self {
            Self::TaxId => FieldId::ContactPerson,
            Self::ZipCode => FieldId::Number,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::TaxId => "tax id",
            Self::ZipCode => "zip code",
        }
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Strips non-digits and keeps at most `max_digits` of what remains.
pub fn clamp_digits(raw: &str, max_digits: usize) -> String {
    raw.chars()
        .filter(char::is_ascii_digit)
        .take(max_digits)
        .collect()
}

pub fn clamp_tax_id(raw: &str, supplier_type: SupplierType) -> String {
    clamp_digits(raw, supplier_type.max_tax_id_digits())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_from_masked_tax_id() {
        assert_eq!(digits_only("12.345.678/0001-95"), "12345678000195");
        assert_eq!(digits_only("abc"), "");
    }

    #[test]
    fn clamps_tax_id_per_supplier_type() {
        let raw = "123.456.789-0123456";
        assert_eq!(clamp_tax_id(raw, SupplierType::Corporate), "12345678901234");
        assert_eq!(clamp_tax_id(raw, SupplierType::Individual), "12345678901");
        assert_eq!(clamp_tax_id("12-3", SupplierType::Individual), "123");
    }

    #[test]
    fn parses_supplier_type_codes() {
        assert_eq!("CORP".parse::<SupplierType>(), Ok(SupplierType::Corporate));
        assert_eq!(" ind ".parse::<SupplierType>(), Ok(SupplierType::Individual));
        let err = "company".parse::<SupplierType>().expect_err("unknown code");
        assert_eq!(err, UnknownSupplierType("company".into()));
        assert_eq!(
            err.to_string(),
            "unknown supplier type 'company' (expected CORP or IND)"
        );
        let _: &dyn std::error::Error = &err;
    }

    #[test]
    fn lookup_kinds_gate_on_opposite_types() {
        for supplier_type in [SupplierType::Corporate, SupplierType::Individual] {
            assert_ne!(
                LookupKind::TaxId.is_enabled_for(supplier_type),
                LookupKind::ZipCode.is_enabled_for(supplier_type)
            );
        }
        assert!(LookupKind::TaxId.is_enabled_for(SupplierType::Corporate));
    }

    #[test]
    fn field_names_round_trip() {
        for field in FieldId::ALL {
            assert_eq!(FieldId::from_name(field.name()), Some(field));
        }
        assert_eq!(FieldId::from_name("email"), None);
    }
}
