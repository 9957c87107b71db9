/// Accepts "#rgb", "#rgba", "#rrggbb", "#rrggbbaa" (or without '#').
/// Panics on invalid input; use only with trusted literals.
/// Evaluated at COMPILE TIME if assigned to a const/static.
pub const fn rgba_hex(s: &str) -> [f32; 4] {
    let bytes = s.as_bytes();

    let (bytes, len) = if !bytes.is_empty() && bytes[0] == b'#' {
        let (_, rem) = bytes.split_at(1);
        (rem, s.len() - 1)
    } else {
        (bytes, s.len())
    };

    const fn val(b: u8) -> u8 {
        match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => 10 + (b - b'a'),
            b'A'..=b'F' => 10 + (b - b'A'),
            _ => panic!("invalid hex digit in color string"),
        }
    }

    const fn byte2(h: u8, l: u8) -> u8 {
        (val(h) << 4) | val(l)
    }

    // Expand 4-bit color to 8-bit (e.g. F -> FF)
    const fn rep(n: u8) -> u8 {
        (val(n) << 4) | val(n)
    }

    let (r, g, b, a) = match len {
        3 => (rep(bytes[0]), rep(bytes[1]), rep(bytes[2]), 0xFF),
        4 => (rep(bytes[0]), rep(bytes[1]), rep(bytes[2]), rep(bytes[3])),
        6 => (
            byte2(bytes[0], bytes[1]),
            byte2(bytes[2], bytes[3]),
            byte2(bytes[4], bytes[5]),
            0xFF,
        ),
        8 => (
            byte2(bytes[0], bytes[1]),
            byte2(bytes[2], bytes[3]),
            byte2(bytes[4], bytes[5]),
            byte2(bytes[6], bytes[7]),
        ),
        _ => panic!("color hex string must be 3, 4, 6, or 8 digits"),
    };

    [
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        a as f32 / 255.0,
    ]
}

pub const WHITE: [f32; 4] = rgba_hex("#FFFFFF");
pub const BLACK: [f32; 4] = rgba_hex("#000000");
pub const RED: [f32; 4] = rgba_hex("#FF0000");
pub const GREEN: [f32; 4] = rgba_hex("#00FF00");

/// Falling notes are tinted by MIDI track, cycling through this palette.
pub const TRACK_RGBA: [[f32; 4]; 6] = [
    rgba_hex("#FF0000"),
    rgba_hex("#00FF00"),
    rgba_hex("#0000FF"),
    rgba_hex("#FFFF00"),
    rgba_hex("#FF00FF"),
    rgba_hex("#00FFFF"),
];

/// Multiplier applied to raised-key note colors.
pub const DARKEN_MULTIPLIER: f32 = 0.6;

#[inline(always)]
pub fn track_rgba(track: u16) -> [f32; 4] {
    TRACK_RGBA[track as usize % TRACK_RGBA.len()]
}

/// Multiplies RGB by `factor` and clamps to [0, 1], keeps alpha.
#[inline(always)]
pub fn darken_rgba(c: [f32; 4], factor: f32) -> [f32; 4] {
    [
        (c[0] * factor).clamp(0.0, 1.0),
        (c[1] * factor).clamp(0.0, 1.0),
        (c[2] * factor).clamp(0.0, 1.0),
        c[3],
    ]
}

/// Multiplies RGB by 1.25, keeps alpha.
#[inline(always)]
pub fn lighten_rgba(c: [f32; 4]) -> [f32; 4] {
    [
        (c[0] * 1.25).min(1.0),
        (c[1] * 1.25).min(1.0),
        (c[2] * 1.25).min(1.0),
        c[3],
    ]
}

#[inline(always)]
fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// XORs each RGB byte with `mask`. Applying the same mask twice restores
/// any color whose channels are multiples of 1/255.
#[inline(always)]
pub fn invert_rgba(c: [f32; 4], mask: u8) -> [f32; 4] {
    let flip = |v: f32| f32::from(to_byte(v) ^ mask) / 255.0;
    [flip(c[0]), flip(c[1]), flip(c[2]), c[3]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parses_short_and_long_forms() {
        assert_eq!(rgba_hex("#fff"), WHITE);
        assert_eq!(rgba_hex("000000ff"), BLACK);
        let c = rgba_hex("#FF000080");
        assert!((c[3] - 128.0 / 255.0).abs() <= f32::EPSILON);
    }

    #[test]
    fn darken_scales_rgb_and_keeps_alpha() {
        let c = darken_rgba([1.0, 0.5, 0.0, 0.25], DARKEN_MULTIPLIER);
        assert!((c[0] - 0.6).abs() <= 1e-6);
        assert!((c[1] - 0.3).abs() <= 1e-6);
        assert_eq!(c[2], 0.0);
        assert_eq!(c[3], 0.25);
    }

    #[test]
    fn darken_clamps_out_of_range_factors() {
        let c = darken_rgba([0.9, 0.9, 0.9, 1.0], 2.0);
        assert_eq!(c, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn invert_twice_restores_palette_colors() {
        for c in TRACK_RGBA.iter().copied().chain([WHITE, BLACK]) {
            let once = invert_rgba(c, 0xa0);
            assert_ne!(once, c, "mask should change {c:?}");
            assert_eq!(invert_rgba(once, 0xa0), c);
        }
    }

    #[test]
    fn track_palette_wraps() {
        assert_eq!(track_rgba(0), track_rgba(TRACK_RGBA.len() as u16));
        assert_eq!(track_rgba(7), TRACK_RGBA[1]);
    }
}
