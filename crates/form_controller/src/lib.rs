//! Supplier registration form controller: supplier-type driven field
//! visibility, tax-id and zip-code lookups, and input masks.

pub mod controller;
pub mod lookup_bridge;
pub mod mask;
pub mod page;
pub mod session;

pub use controller::{events::LookupEvent, ControllerState, FormController};
pub use mask::{format_digits, format_tax_id, DigitMasker, InputMasker};
pub use page::{ControlState, FieldTrigger, FieldWrite, FormPage, RecordingPage};
pub use session::FormSession;
