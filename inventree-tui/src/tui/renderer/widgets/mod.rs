pub mod autocomplete;
pub mod checkbox;
pub mod table;
pub mod text_input;

pub use autocomplete::render_autocomplete;
pub use checkbox::{render_checkbox, render_radio_group};
pub use table::render_model_table;
pub use text_input::render_text_input;
