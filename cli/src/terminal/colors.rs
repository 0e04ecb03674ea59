use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 0x7a, g: 0xc7, b: 0xff };
pub const ACCENT: Color = Color::TrueColor { r: 0xff, g: 0xb8, b: 0x6c };
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;
pub const SUCCESS: Color = Color::Green;
pub const FAILURE: Color = Color::Red;
