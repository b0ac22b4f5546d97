//! Placeholder text for a section with no rows.

use decoyscope_core::render::Section;
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::widgets::Paragraph;

use crate::theme;

/// Style for a section's placeholder: red for a failed fetch, dim otherwise.
pub fn style<T>(section: &Section<T>) -> Style {
    match section {
        Section::Failed(_) => theme::placeholder_error(),
        _ => theme::placeholder(),
    }
}

/// Draw the placeholder if the section has one. Returns `true` when drawn.
pub fn render<T>(frame: &mut Frame, area: Rect, section: &Section<T>) -> bool {
    let Some(text) = section.placeholder() else {
        return false;
    };
    frame.render_widget(
        Paragraph::new(text)
            .style(style(section))
            .alignment(Alignment::Center),
        area,
    );
    true
}
