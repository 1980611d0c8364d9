// src/core/color.rs

use colored::{Color, Colorize};

/// Parses a color name string (e.g., "red", "green") into a terminal color.
///
/// `"reset"` yields `None`, meaning the text is printed without color.
pub fn parse_color_name(name: &str) -> Result<Option<Color>, String> {
    match name.to_lowercase().as_str() {
        "reset" => Ok(None),
        "black" => Ok(Some(Color::Black)),
        "red" => Ok(Some(Color::Red)),
        "green" => Ok(Some(Color::Green)),
        "yellow" => Ok(Some(Color::Yellow)),
        "blue" => Ok(Some(Color::Blue)),
        "magenta" => Ok(Some(Color::Magenta)),
        "cyan" => Ok(Some(Color::Cyan)),
        "white" => Ok(Some(Color::White)),
        _ => Err(format!("Unknown color name: '{name}'")),
    }
}

/// Renders the prompt in the given color. Honors `NO_COLOR` through `colored`.
pub fn paint_prompt(prompt: &str, color: Option<Color>) -> String {
    match color {
        Some(color) => prompt.color(color).to_string(),
        None => prompt.to_string(),
    }
}
