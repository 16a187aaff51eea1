//! Color constants for the terminal user interface.

use ratatui::style::Color;

/// Fallback accent used for tags without a dedicated color.
pub const GOLD: Color = Color::Rgb(252, 188, 30);

/// Accent color for a tag chip, keyed by tag name.
pub fn tag_color(name: &str) -> Color {
    match name {
        "Follow Up" => Color::Rgb(255, 215, 0),
        "High Priority" => Color::Rgb(255, 99, 71),
        "Low Priority" => Color::Rgb(144, 238, 144),
        "Big Project" => Color::Rgb(135, 206, 235),
        "Project" => Color::Rgb(221, 160, 221),
        "R&D" => Color::Rgb(255, 165, 0),
        _ => GOLD,
    }
}

/// Slider color for an urgency weight: calm green through alarm red.
pub fn urgency_color(urgency: u8) -> Color {
    if urgency <= 3 {
        Color::Rgb(144, 238, 144)
    } else if urgency <= 6 {
        Color::Rgb(255, 165, 0)
    } else {
        Color::Rgb(255, 99, 71)
    }
}
