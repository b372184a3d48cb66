pub mod autocomplete;
pub mod events;
pub mod fields;
pub mod list;
pub mod model_table;
pub mod text_input;

pub use events::{AutocompleteEvent, TextInputEvent};
pub use fields::{AutocompleteField, AutocompleteOutcome, TextInputField};
pub use list::ListState;
pub use model_table::{EditRequest, ModelTable, TableEvent};
pub use text_input::TextInputState;
