use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{
    domain::{FieldId, LookupKind},
    error::LookupError,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRequest {
    pub kind: LookupKind,
    /// Digits only, already length-checked for `kind`.
    pub query: String,
    pub endpoint: String,
}

impl LookupRequest {
    pub fn query_pairs(&self) -> [(&'static str, &str); 1] {
        [(self.kind.query_param(), self.query.as_str())]
    }
}

/// Field values supplied by a successful lookup. A field is present only when
/// the service sent it; present values may still be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupFields(BTreeMap<FieldId, String>);

impl LookupFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: FieldId, value: impl Into<String>) -> Self {
        self.0.insert(field, value.into());
        self
    }

    pub fn insert(&mut self, field: FieldId, value: impl Into<String>) {
        self.0.insert(field, value.into());
    }

    pub fn get(&self, field: FieldId) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn non_empty(&self, field: FieldId) -> Option<&str> {
        self.get(field).filter(|value| !value.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &str)> {
        self.0.iter().map(|(field, value)| (*field, value.as_str()))
    }
}

pub type LookupResult = Result<LookupFields, LookupError>;

/// Accepts strings, numbers and booleans; anything else (or null) is absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn put(fields: &mut LookupFields, field: FieldId, value: Option<String>) {
    if let Some(value) = value {
        fields.insert(field, value);
    }
}

fn application_error(kind: LookupKind, error: Option<String>) -> Option<LookupError> {
    error
        .filter(|message| !message.is_empty())
        .map(|message| LookupError::application(kind, message))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxIdLookupResponse {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub preferred_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub state_registration: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl TaxIdLookupResponse {
    pub fn into_result(self) -> LookupResult {
        if let Some(err) = application_error(LookupKind::TaxId, self.error) {
            return Err(err);
        }

        let mut fields = LookupFields::new();
        put(&mut fields, FieldId::FullName, self.full_name);
        put(&mut fields, FieldId::PreferredName, self.preferred_name);
        put(&mut fields, FieldId::TaxRegistrationState, self.state_registration);
        put(&mut fields, FieldId::ZipCode, self.zip_code);
        put(&mut fields, FieldId::Street, self.street);
        put(&mut fields, FieldId::Number, self.number);
        put(&mut fields, FieldId::Complement, self.complement);
        put(&mut fields, FieldId::Neighborhood, self.neighborhood);
        put(&mut fields, FieldId::City, self.city);
        put(&mut fields, FieldId::State, self.state);
        Ok(fields)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZipCodeLookupResponse {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl ZipCodeLookupResponse {
    pub fn into_result(self) -> LookupResult {
        if let Some(err) = application_error(LookupKind::ZipCode, self.error) {
            return Err(err);
        }

        let mut fields = LookupFields::new();
        put(&mut fields, FieldId::Street, self.street);
        put(&mut fields, FieldId::Neighborhood, self.neighborhood);
        put(&mut fields, FieldId::City, self.city);
        put(&mut fields, FieldId::State, self.state);
        Ok(fields)
    }
}

/// Decodes a lookup body for `kind`. A body that is not a JSON object of the
/// expected shape is a transport failure.
pub fn decode_lookup_body(kind: LookupKind, body: &[u8]) -> LookupResult {
    let malformed = |e: serde_json::Error| {
        LookupError::transport(kind, format!("malformed {kind} lookup response: {e}"))
    };
    match kind {
        LookupKind::TaxId => serde_json::from_slice::<TaxIdLookupResponse>(body)
            .map_err(malformed)?
            .into_result(),
        LookupKind::ZipCode => serde_json::from_slice::<ZipCodeLookupResponse>(body)
            .map_err(malformed)?
            .into_result(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn tax_id_body_keeps_only_supplied_fields() {
        let fields = decode_lookup_body(
            LookupKind::TaxId,
            br#"{"full_name":"Acme","state_registration":"123","city":""}"#,
        )
        .expect("decode");

        assert_eq!(fields.get(FieldId::FullName), Some("Acme"));
        assert_eq!(fields.get(FieldId::TaxRegistrationState), Some("123"));
        assert_eq!(fields.get(FieldId::PreferredName), None);
        assert_eq!(fields.get(FieldId::City), Some(""));
        assert_eq!(fields.non_empty(FieldId::City), None);
    }

    #[test]
    fn error_field_becomes_application_error() {
        let err = decode_lookup_body(LookupKind::ZipCode, br#"{"error":"zip code not found"}"#)
            .expect_err("application error");
        assert_eq!(err.error_kind(), ErrorKind::Application);
        assert_eq!(err.user_message(), "Error: zip code not found");
    }

    #[test]
    fn empty_error_field_is_not_an_error() {
        let fields = decode_lookup_body(LookupKind::ZipCode, br#"{"error":"","city":"Recife"}"#)
            .expect("decode");
        assert_eq!(fields.get(FieldId::City), Some("Recife"));
    }

    #[test]
    fn numeric_values_are_accepted_as_text() {
        let fields = decode_lookup_body(LookupKind::TaxId, br#"{"number":120,"street":null}"#)
            .expect("decode");
        assert_eq!(fields.get(FieldId::Number), Some("120"));
        assert_eq!(fields.get(FieldId::Street), None);
    }

    #[test]
    fn non_json_body_is_transport_error() {
        let err = decode_lookup_body(LookupKind::TaxId, b"<html>502</html>").expect_err("malformed");
        assert_eq!(err.error_kind(), ErrorKind::Transport);

        let err = decode_lookup_body(LookupKind::TaxId, b"[1,2]").expect_err("not an object");
        assert_eq!(err.error_kind(), ErrorKind::Transport);
    }

    #[test]
    fn request_exposes_kind_specific_query_param() {
        let request = LookupRequest {
            kind: LookupKind::ZipCode,
            query: "01310100".into(),
            endpoint: "http://localhost/lookup/zip".into(),
        };
        assert_eq!(request.query_pairs(), [("zip_code", "01310100")]);
    }
}
