use shared::domain::{LookupKind, SupplierType};

use crate::page::ControlState;

/// Everything the controller remembers between events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerState {
    pub supplier_type: SupplierType,
    busy_tax_id: bool,
    busy_zip_code: bool,
}

impl ControllerState {
    pub fn new(supplier_type: SupplierType) -> Self {
        Self {
            supplier_type,
            busy_tax_id: false,
            busy_zip_code: false,
        }
    }

    pub fn is_busy(&self, kind: LookupKind) -> bool {
        match kind {
            LookupKind::TaxId => self.busy_tax_id,
            LookupKind::ZipCode => self.busy_zip_code,
        }
    }

    pub fn set_busy(&mut self, kind: LookupKind, busy: bool) {
        match kind {
            LookupKind::TaxId => self.busy_tax_id = busy,
            LookupKind::ZipCode => self.busy_zip_code = busy,
        }
    }

    /// A pending lookup keeps its button disabled whatever the type is.
    pub fn control_state(&self, kind: LookupKind) -> ControlState {
        let pending = self.is_busy(kind);
        ControlState {
            enabled: !pending && kind.is_enabled_for(self.supplier_type),
            pending,
        }
    }

    pub fn can_search(&self, kind: LookupKind) -> bool {
        self.control_state(kind).enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_flags_are_independent_per_kind() {
        let mut state = ControllerState::new(SupplierType::Corporate);
        state.set_busy(LookupKind::TaxId, true);
        assert!(state.is_busy(LookupKind::TaxId));
        assert!(!state.is_busy(LookupKind::ZipCode));
    }

    #[test]
    fn pending_control_is_disabled_even_when_type_matches() {
        let mut state = ControllerState::new(SupplierType::Corporate);
        assert!(state.can_search(LookupKind::TaxId));

        state.set_busy(LookupKind::TaxId, true);
        assert_eq!(
            state.control_state(LookupKind::TaxId),
            ControlState {
                enabled: false,
                pending: true
            }
        );
    }
}
