//! Color constants for the terminal user interface.

use ratatui::style::Color;

/// Accent for the header row and status bar.
pub const MILK_BLUE: Color = Color::Rgb(94, 144, 200);
