pub mod confirm;
pub mod notice;
pub mod row_edit;

pub use confirm::{ConfirmAnswer, ConfirmState, render_confirm};
pub use notice::{Notice, render_notice};
pub use row_edit::{EditOutcome, RowEditAction, RowEditState, render_row_edit};
