//! Pure view-model transforms, free of I/O and rendering.

pub mod form;
pub mod pagination;
pub mod picker;
pub mod query;
pub mod state;
pub mod status;
pub mod suggest;

pub use form::{Field, FieldSelection, FlightDraft, UpdateForm, UpdatePlan};
pub use pagination::{PageItem, PageState, page_window};
pub use picker::{FlightPicker, PickerOption};
pub use query::{FilterState, ListQuery, SortKey};
pub use state::{Action, Effect, ListState, Phase, RequestToken};
pub use status::{FlightStatus, LiveBoard, derive_progress, derive_status};
