//! Packed `0x00RRGGBB` pixel colors.

use crate::math::Vector4;

/// Light blue, RGB (123, 195, 221).
pub const DEFAULT_BACKGROUND: u32 = pack_rgb(123, 195, 221);

pub const fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

pub const fn unpack_rgb(color: u32) -> (u8, u8, u8) {
    ((color >> 16) as u8, (color >> 8) as u8, color as u8)
}

/// Packs a vertex color whose channels are in `0.0..=1.0`. Out of range
/// channels are clamped and `w` is ignored.
pub fn pack_unit_rgb(color: Vector4) -> u32 {
    pack_rgb(
        unit_to_byte(color.x),
        unit_to_byte(color.y),
        unit_to_byte(color.z),
    )
}

fn unit_to_byte(channel: f32) -> u8 {
    if channel.is_nan() {
        return 0;
    }
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Parses `RRGGBB`, optionally prefixed with `#` or `0x`.
pub fn parse_hex_color(text: &str) -> Option<u32> {
    let digits = text
        .strip_prefix('#')
        .or_else(|| text.strip_prefix("0x"))
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_packs_to_expected_value() {
        assert_eq!(DEFAULT_BACKGROUND, 0x007B_C3DD);
        assert_eq!(unpack_rgb(DEFAULT_BACKGROUND), (123, 195, 221));
    }

    #[test]
    fn top_byte_stays_zero() {
        assert_eq!(pack_rgb(255, 255, 255) >> 24, 0);
    }

    #[test]
    fn packs_unit_colors() {
        assert_eq!(pack_unit_rgb(Vector4::new(1.0, 0.0, 0.0, 0.0)), 0x00FF_0000);
        assert_eq!(pack_unit_rgb(Vector4::new(1.0, 0.0, 1.0, 0.0)), 0x00FF_00FF);
        assert_eq!(pack_unit_rgb(Vector4::new(2.0, -1.0, 0.5, 9.0)), 0x00FF_0080);
        assert_eq!(pack_unit_rgb(Vector4::new(f32::NAN, 0.0, 0.0, 0.0)), 0);
    }

    #[test]
    fn parses_hex_forms() {
        assert_eq!(parse_hex_color("#7bc3dd"), Some(DEFAULT_BACKGROUND));
        assert_eq!(parse_hex_color("7BC3DD"), Some(DEFAULT_BACKGROUND));
        assert_eq!(parse_hex_color("0x7bc3dd"), Some(DEFAULT_BACKGROUND));
        assert_eq!(parse_hex_color("#7bc3d"), None);
        assert_eq!(parse_hex_color("zzzzzz"), None);
        assert_eq!(parse_hex_color("+7bc3d"), None);
    }
}
