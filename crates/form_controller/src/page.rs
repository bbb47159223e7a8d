//! Page-side collaborator: the form fields, lookup buttons and notifications
//! the controller drives. The page owns the fields; the controller only reads
//! and writes their values.

use std::collections::{BTreeMap, HashMap};

use shared::domain::{FieldId, LookupKind, SupplierType};

/// How a write is announced to the page's own listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTrigger {
    /// Plain value change; dependent widgets recalculate.
    Change,
    /// Behaves like typed input, so the field's mask is re-run.
    Input,
}

/// Appearance of a lookup button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlState {
    pub enabled: bool,
    /// Showing the "searching" spinner instead of the idle icon.
    pub pending: bool,
}

pub trait FormPage {
    /// Value the supplier-type select currently holds.
    fn selected_supplier_type(&self) -> SupplierType;
    fn value(&self, field: FieldId) -> String;
    fn set_value(&mut self, field: FieldId, value: &str, trigger: FieldTrigger);
    fn focus(&mut self, field: FieldId);
    fn set_lookup_control(&mut self, kind: LookupKind, state: ControlState);
    /// Starts the show/hide transition of the registration fields and returns
    /// immediately. Nothing waits on it.
    fn animate_tax_registration(&mut self, visible: bool);
    /// Blocking user notification (an alert box on a web page).
    fn notify(&mut self, message: &str);
    fn lookup_endpoint(&self, kind: LookupKind) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldWrite {
    pub field: FieldId,
    pub value: String,
    pub trigger: FieldTrigger,
}

/// In-memory page. Keeps every controller write so callers can inspect what
/// a lookup changed.
#[derive(Debug, Clone)]
pub struct RecordingPage {
    selected: SupplierType,
    values: BTreeMap<FieldId, String>,
    endpoints: HashMap<LookupKind, String>,
    controls: HashMap<LookupKind, ControlState>,
    tax_registration_visible: bool,
    focused: Option<FieldId>,
    notifications: Vec<String>,
    writes: Vec<FieldWrite>,
}

impl RecordingPage {
    pub fn new(selected: SupplierType) -> Self {
        Self {
            selected,
            values: BTreeMap::new(),
            endpoints: HashMap::new(),
            controls: HashMap::new(),
            tax_registration_visible: false,
            focused: None,
            notifications: Vec::new(),
            writes: Vec::new(),
        }
    }

    pub fn with_endpoint(mut self, kind: LookupKind, endpoint: impl Into<String>) -> Self {
        self.endpoints.insert(kind, endpoint.into());
        self
    }

    pub fn with_value(mut self, field: FieldId, value: impl Into<String>) -> Self {
        self.values.insert(field, value.into());
        self
    }

    /// User picks a supplier type in the select.
    pub fn select_supplier_type(&mut self, supplier_type: SupplierType) {
        self.selected = supplier_type;
    }

    /// User edits a field directly. Not recorded as a controller write.
    pub fn type_value(&mut self, field: FieldId, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn values(&self) -> &BTreeMap<FieldId, String> {
        &self.values
    }

    pub fn writes(&self) -> &[FieldWrite] {
        &self.writes
    }

    pub fn control(&self, kind: LookupKind) -> ControlState {
        self.controls.get(&kind).copied().unwrap_or_default()
    }

    pub fn tax_registration_visible(&self) -> bool {
        self.tax_registration_visible
    }

    pub fn focused(&self) -> Option<FieldId> {
        self.focused
    }

    pub fn notifications(&self) -> &[String] {
        &self.notifications
    }

    pub fn take_notifications(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notifications)
    }
}

impl FormPage for RecordingPage {
    fn selected_supplier_type(&self) -> SupplierType {
        self.selected
    }

    fn value(&self, field: FieldId) -> String {
        self.values.get(&field).cloned().unwrap_or_default()
    }

    fn set_value(&mut self, field: FieldId, value: &str, trigger: FieldTrigger) {
        self.values.insert(field, value.to_string());
        self.writes.push(FieldWrite {
            field,
            value: value.to_string(),
            trigger,
        });
    }

    fn focus(&mut self, field: FieldId) {
        self.focused = Some(field);
    }

    fn set_lookup_control(&mut self, kind: LookupKind, state: ControlState) {
        self.controls.insert(kind, state);
    }

    fn animate_tax_registration(&mut self, visible: bool) {
        self.tax_registration_visible = visible;
    }

    fn notify(&mut self, message: &str) {
        self.notifications.push(message.to_string());
    }

    fn lookup_endpoint(&self, kind: LookupKind) -> Option<String> {
        self.endpoints.get(&kind).cloned()
    }
}
