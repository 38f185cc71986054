//! CSS-style color strings.

use peniko::Color;

/// Parse `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa` or `transparent`.
pub fn parse_color(value: &str) -> Option<Color> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("transparent") {
        return Some(Color::TRANSPARENT);
    }
    let hex = value.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }

    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    let (r, g, b, a) = match hex.len() {
        3 => (nibble(0)?, nibble(1)?, nibble(2)?, 255),
        4 => (nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?),
        6 => (byte(0)?, byte(2)?, byte(4)?, 255),
        8 => (byte(0)?, byte(2)?, byte(4)?, byte(6)?),
        _ => return None,
    };
    Some(Color::from_rgba8(r, g, b, a))
}

/// Like [`parse_color`], logging and substituting `fallback` on failure.
pub fn parse_color_or(value: &str, fallback: Color) -> Color {
    parse_color(value).unwrap_or_else(|| {
        log::warn!("Unrecognized color {value:?}");
        fallback
    })
}
