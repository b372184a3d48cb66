//! Drawing helpers shared by the console views
//!
//! Views draw straight onto the ratatui `Frame`; these functions only know
//! about widget state, never about app messages.

pub mod widgets;

use ratatui::layout::Rect;

pub use widgets::{
    render_autocomplete, render_checkbox, render_model_table, render_radio_group, render_text_input,
};

/// Centered rectangle of at most `width` x `height` inside `area`
pub fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_popup_is_centered_and_clamped() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(popup_area(area, 60, 10), Rect::new(20, 15, 60, 10));
        assert_eq!(popup_area(Rect::new(5, 5, 20, 8), 60, 10), Rect::new(5, 5, 20, 8));
    }
}
