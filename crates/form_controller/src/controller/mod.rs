//! Controller layer: supplier-type transitions, lookup validation and
//! completion handling.

pub mod events;
pub mod orchestration;
pub mod state;

use shared::{
    domain::{
        clamp_tax_id, digits_only, FieldId, LookupKind, SupplierType, PHONE_MASK, ZIP_CODE_MASK,
    },
    error::{ErrorKind, LookupError},
    protocol::{LookupFields, LookupRequest, LookupResult},
};
use tracing::{debug, error, info, warn};

use crate::{
    mask::InputMasker,
    page::{FieldTrigger, FormPage},
};

pub use state::ControllerState;

/// Written on every successful tax-id lookup, empty when absent.
const TAX_ID_IDENTITY_FIELDS: [FieldId; 3] = [
    FieldId::FullName,
    FieldId::PreferredName,
    FieldId::TaxRegistrationState,
];

/// Written by a tax-id lookup only for companies, and only when non-empty.
/// The zip code is handled separately since it goes through its mask.
const TAX_ID_ADDRESS_FIELDS: [FieldId; 6] = [
    FieldId::Street,
    FieldId::Number,
    FieldId::Complement,
    FieldId::Neighborhood,
    FieldId::City,
    FieldId::State,
];

const ZIP_CODE_ADDRESS_FIELDS: [FieldId; 4] = [
    FieldId::Street,
    FieldId::Neighborhood,
    FieldId::City,
    FieldId::State,
];

pub struct FormController<P: FormPage> {
    page: P,
    state: ControllerState,
    masker: Option<Box<dyn InputMasker + Send>>,
}

impl<P: FormPage> FormController<P> {
    /// Builds the controller from the page's current select value and runs
    /// the initial type transition.
    pub fn new(page: P, masker: Option<Box<dyn InputMasker + Send>>) -> Self {
        let supplier_type = page.selected_supplier_type();
        let mut controller = Self {
            page,
            state: ControllerState::new(supplier_type),
            masker,
        };

        match controller.masker.as_mut() {
            Some(masker) => {
                masker.apply(FieldId::ZipCode, ZIP_CODE_MASK);
                masker.apply(FieldId::Phone, PHONE_MASK);
            }
            None => warn!("input mask capability not found; masks will not be applied"),
        }

        controller.on_supplier_type_change(supplier_type);
        controller
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    pub fn into_page(self) -> P {
        self.page
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn supplier_type(&self) -> SupplierType {
        self.state.supplier_type
    }

    pub fn is_busy(&self, kind: LookupKind) -> bool {
        self.state.is_busy(kind)
    }

    pub fn has_pending_lookup(&self) -> bool {
        self.is_busy(LookupKind::TaxId) || self.is_busy(LookupKind::ZipCode)
    }

    /// Field value as the user sees it, with the field's mask applied.
    pub fn display_value(&self, field: FieldId) -> String {
        let value = self.page.value(field);
        match &self.masker {
            Some(masker) => masker.display(field, &value),
            None => value,
        }
    }

    /// Change handler for the supplier-type select.
    pub fn on_supplier_type_selected(&mut self) {
        let supplier_type = self.page.selected_supplier_type();
        self.on_supplier_type_change(supplier_type);
    }

    pub fn on_supplier_type_change(&mut self, new_type: SupplierType) {
        debug!(supplier_type = new_type.code(), "supplier type changed");
        self.state.supplier_type = new_type;

        self.refresh_control(LookupKind::TaxId);
        self.refresh_control(LookupKind::ZipCode);
        self.page
            .animate_tax_registration(new_type.shows_tax_registration());

        if let Some(masker) = self.masker.as_mut() {
            masker.remove(FieldId::TaxId);
            masker.apply(FieldId::TaxId, new_type.tax_id_mask());
        }

        let current = self.page.value(FieldId::TaxId);
        if digits_only(&current).len() > new_type.max_tax_id_digits() {
            let clamped = clamp_tax_id(&current, new_type);
            self.page
                .set_value(FieldId::TaxId, &clamped, FieldTrigger::Change);
        }
    }

    /// Keeps the tax-id field to digits only, within the current type's limit.
    pub fn on_tax_id_input_changed(&mut self, raw_value: &str) {
        let clamped = clamp_tax_id(raw_value, self.state.supplier_type);
        self.page
            .set_value(FieldId::TaxId, &clamped, FieldTrigger::Change);
    }

    pub fn search_tax_id(&mut self) -> Result<Option<LookupRequest>, LookupError> {
        self.begin_lookup(LookupKind::TaxId)
    }

    pub fn search_zip_code(&mut self) -> Result<Option<LookupRequest>, LookupError> {
        self.begin_lookup(LookupKind::ZipCode)
    }

    pub fn search(&mut self, kind: LookupKind) -> Result<Option<LookupRequest>, LookupError> {
        self.begin_lookup(kind)
    }

    /// Validates the lookup input and, on success, moves `kind` to pending.
    /// `Ok(None)` means the button is disabled and the click is ignored.
    fn begin_lookup(&mut self, kind: LookupKind) -> Result<Option<LookupRequest>, LookupError> {
        if !self.state.can_search(kind) {
            warn!(
                kind = kind.name(),
                busy = self.state.is_busy(kind),
                supplier_type = self.state.supplier_type.code(),
                "lookup control disabled; ignoring search"
            );
            return Ok(None);
        }

        let query = digits_only(&self.page.value(kind.source_field()));
        if query.len() != kind.required_digits() {
            return Err(self.reject(LookupError::validation(
                kind,
                format!(
                    "Enter a valid {} with {} digits.",
                    kind.label(),
                    kind.required_digits()
                ),
            )));
        }

        let Some(endpoint) = self
            .page
            .lookup_endpoint(kind)
            .filter(|endpoint| !endpoint.trim().is_empty())
        else {
            return Err(self.reject(LookupError::validation(
                kind,
                format!("{} lookup URL is not configured.", kind.label()),
            )));
        };

        self.state.set_busy(kind, true);
        self.refresh_control(kind);
        info!(kind = kind.name(), endpoint = %endpoint, "dispatching lookup");

        Ok(Some(LookupRequest {
            kind,
            query,
            endpoint,
        }))
    }

    fn reject(&mut self, err: LookupError) -> LookupError {
        debug!(kind = err.lookup_kind().name(), "lookup rejected: {err}");
        self.page.notify(&err.user_message());
        err
    }

    /// Applies the outcome of a dispatched lookup and returns `kind` to idle.
    /// Field rules are evaluated against the supplier type at this moment,
    /// not the one at dispatch.
    pub fn complete_lookup(&mut self, kind: LookupKind, result: LookupResult) {
        if !self.state.is_busy(kind) {
            warn!(kind = kind.name(), "completion for a lookup that is not pending; ignoring");
            return;
        }

        match result {
            Ok(fields) => match kind {
                LookupKind::TaxId => self.apply_tax_id_fields(&fields),
                LookupKind::ZipCode => self.apply_zip_code_fields(&fields),
            },
            Err(err) => {
                if err.error_kind() == ErrorKind::Transport {
                    error!(kind = kind.name(), detail = %err, "lookup request failed");
                } else {
                    info!(kind = kind.name(), "lookup returned an error: {err}");
                }
                self.page.notify(&err.user_message());
            }
        }

        self.state.set_busy(kind, false);
        self.refresh_control(kind);
    }

    fn apply_tax_id_fields(&mut self, fields: &LookupFields) {
        for field in TAX_ID_IDENTITY_FIELDS {
            let value = fields.get(field).unwrap_or_default();
            self.page.set_value(field, value, FieldTrigger::Change);
        }

        if self.state.supplier_type == SupplierType::Corporate {
            if let Some(zip_code) = fields.non_empty(FieldId::ZipCode) {
                self.page
                    .set_value(FieldId::ZipCode, &digits_only(zip_code), FieldTrigger::Input);
            }
            self.write_non_empty(fields, &TAX_ID_ADDRESS_FIELDS);
        } else {
            debug!("supplier type changed during tax id lookup; address fields left untouched");
        }

        self.page.focus(LookupKind::TaxId.focus_after_success());
    }

    fn apply_zip_code_fields(&mut self, fields: &LookupFields) {
        if self.state.supplier_type != SupplierType::Individual {
            debug!("supplier type changed during zip code lookup; response not applied");
            return;
        }

        self.write_non_empty(fields, &ZIP_CODE_ADDRESS_FIELDS);
        self.page.focus(LookupKind::ZipCode.focus_after_success());
    }

    fn write_non_empty(&mut self, fields: &LookupFields, targets: &[FieldId]) {
        for &field in targets {
            if let Some(value) = fields.non_empty(field) {
                self.page.set_value(field, value, FieldTrigger::Change);
            }
        }
    }

    fn refresh_control(&mut self, kind: LookupKind) {
        let control = self.state.control_state(kind);
        self.page.set_lookup_control(kind, control);
    }
}

#[cfg(test)]
#[path = "../tests/controller_tests.rs"]
mod tests;
