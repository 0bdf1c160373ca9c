use crate::color::Rgb;

/// Blend two 8-bit values.
#[inline]
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
pub(crate) const fn blend8(a: u8, b: u8, amount_of_b: u8) -> u8 {
    let delta = b as i16 - a as i16;

    let mut partial: u32 = (a as u32) << 16; // a * 65536
    partial = partial.wrapping_add(
        (delta as u32)
            .wrapping_mul(amount_of_b as u32)
            .wrapping_mul(257),
    ); // (b - a) * amount_of_b * 257
    partial = partial.wrapping_add(0x8000); // + 32768 for rounding

    (partial >> 16) as u8
}

/// Scale an 8-bit value by a factor (0-255 = 0.0-1.0).
#[inline]
#[allow(clippy::cast_lossless, clippy::cast_possible_truncation)]
pub(crate) const fn scale8(value: u8, scale: u8) -> u8 {
    ((value as u16 * (1 + scale as u16)) >> 8) as u8
}

/// Convert an intensity percentage (0-100) to a 0-255 blend amount.
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub(crate) const fn percent_to_amount(percent: u8) -> u8 {
    let percent = if percent > 100 { 100 } else { percent };
    ((percent as u16 * 255 + 50) / 100) as u8
}

/// Blend two RGB colors.
///
/// # Arguments
/// * `a` - First color
/// * `b` - Second color
/// * `amount_of_b` - Blend factor (0 = all a, 255 = all b)
#[inline]
pub fn blend_colors(a: Rgb, b: Rgb, amount_of_b: u8) -> Rgb {
    Rgb {
        r: blend8(a.r, b.r, amount_of_b),
        g: blend8(a.g, b.g, amount_of_b),
        b: blend8(a.b, b.b, amount_of_b),
    }
}

/// Blend `b` into `a` weighted by a percentage (0 = all a, 100 = all b).
#[inline]
pub fn blend_percent(a: Rgb, b: Rgb, percent: u8) -> Rgb {
    blend_colors(a, b, percent_to_amount(percent))
}

/// Mean of the three channels.
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub const fn brightness(color: Rgb) -> u8 {
    ((color.r as u16 + color.g as u16 + color.b as u16) / 3) as u8
}

/// Create an RGB color from a u32 value (0xRRGGBB format).
#[allow(clippy::cast_possible_truncation)]
pub const fn rgb_from_u32(color: u32) -> Rgb {
    Rgb {
        r: ((color >> 16) & 0xFF) as u8,
        g: ((color >> 8) & 0xFF) as u8,
        b: (color & 0xFF) as u8,
    }
}
