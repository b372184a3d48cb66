use ratatui::style::Color;

/// Colors shared by every view
#[derive(Debug, Clone)]
pub struct Theme {
    pub text_primary: Color,
    pub text_secondary: Color,
    pub border_primary: Color,
    pub border_secondary: Color,
    pub accent_primary: Color,
    pub accent_success: Color,
    pub accent_warning: Color,
    pub accent_error: Color,
    pub highlight_bg: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            text_primary: Color::Rgb(205, 214, 244),
            text_secondary: Color::Rgb(147, 153, 178),
            border_primary: Color::Rgb(88, 91, 112),
            border_secondary: Color::Rgb(69, 71, 90),
            accent_primary: Color::Rgb(137, 180, 250),
            accent_success: Color::Rgb(166, 227, 161),
            accent_warning: Color::Rgb(249, 226, 175),
            accent_error: Color::Rgb(243, 139, 168),
            highlight_bg: Color::Rgb(49, 50, 68),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
