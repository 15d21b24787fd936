//! Built-in 3x5 bitmap font. Lowercase letters render with the uppercase
//! glyphs; characters without a glyph advance like a space.

use super::canvas::Canvas;

const GLYPH_WIDTH: u32 = 3;
const GLYPH_HEIGHT: u32 = 5;
/// Font pixels per glyph cell row, so an 18px style draws 3x scaled glyphs.
const FONT_PX_PER_SCALE: f32 = 6.0;

// Each row holds three bits, most significant bit on the left.
const GLYPHS: &[(char, [u8; 5])] = &[
    ('A', [0b010, 0b101, 0b111, 0b101, 0b101]),
    ('B', [0b110, 0b101, 0b110, 0b101, 0b110]),
    ('C', [0b011, 0b100, 0b100, 0b100, 0b011]),
    ('D', [0b110, 0b101, 0b101, 0b101, 0b110]),
    ('E', [0b111, 0b100, 0b110, 0b100, 0b111]),
    ('F', [0b111, 0b100, 0b110, 0b100, 0b100]),
    ('G', [0b011, 0b100, 0b101, 0b101, 0b011]),
    ('H', [0b101, 0b101, 0b111, 0b101, 0b101]),
    ('I', [0b111, 0b010, 0b010, 0b010, 0b111]),
    ('J', [0b001, 0b001, 0b001, 0b101, 0b010]),
    ('K', [0b101, 0b101, 0b110, 0b101, 0b101]),
    ('L', [0b100, 0b100, 0b100, 0b100, 0b111]),
    ('M', [0b101, 0b111, 0b111, 0b101, 0b101]),
    ('N', [0b110, 0b101, 0b101, 0b101, 0b101]),
    ('O', [0b010, 0b101, 0b101, 0b101, 0b010]),
    ('P', [0b110, 0b101, 0b110, 0b100, 0b100]),
    ('Q', [0b010, 0b101, 0b101, 0b110, 0b011]),
    ('R', [0b110, 0b101, 0b110, 0b101, 0b101]),
    ('S', [0b011, 0b100, 0b010, 0b001, 0b110]),
    ('T', [0b111, 0b010, 0b010, 0b010, 0b010]),
    ('U', [0b101, 0b101, 0b101, 0b101, 0b111]),
    ('V', [0b101, 0b101, 0b101, 0b101, 0b010]),
    ('W', [0b101, 0b101, 0b111, 0b111, 0b101]),
    ('X', [0b101, 0b101, 0b010, 0b101, 0b101]),
    ('Y', [0b101, 0b101, 0b010, 0b010, 0b010]),
    ('Z', [0b111, 0b001, 0b010, 0b100, 0b111]),
    ('0', [0b111, 0b101, 0b101, 0b101, 0b111]),
    ('1', [0b010, 0b110, 0b010, 0b010, 0b111]),
    ('2', [0b110, 0b001, 0b010, 0b100, 0b111]),
    ('3', [0b110, 0b001, 0b010, 0b001, 0b110]),
    ('4', [0b101, 0b101, 0b111, 0b001, 0b001]),
    ('5', [0b111, 0b100, 0b110, 0b001, 0b110]),
    ('6', [0b011, 0b100, 0b111, 0b101, 0b111]),
    ('7', [0b111, 0b001, 0b010, 0b010, 0b010]),
    ('8', [0b111, 0b101, 0b111, 0b101, 0b111]),
    ('9', [0b111, 0b101, 0b111, 0b001, 0b110]),
    ('.', [0b000, 0b000, 0b000, 0b000, 0b010]),
    (',', [0b000, 0b000, 0b000, 0b010, 0b100]),
    (':', [0b000, 0b010, 0b000, 0b010, 0b000]),
    ('-', [0b000, 0b000, 0b111, 0b000, 0b000]),
    ('+', [0b000, 0b010, 0b111, 0b010, 0b000]),
    ('=', [0b000, 0b111, 0b000, 0b111, 0b000]),
    ('_', [0b000, 0b000, 0b000, 0b000, 0b111]),
    ('!', [0b010, 0b010, 0b010, 0b000, 0b010]),
    ('?', [0b110, 0b001, 0b010, 0b000, 0b010]),
    ('/', [0b001, 0b001, 0b010, 0b100, 0b100]),
    ('(', [0b001, 0b010, 0b010, 0b010, 0b001]),
    (')', [0b100, 0b010, 0b010, 0b010, 0b100]),
    ('\'', [0b010, 0b010, 0b000, 0b000, 0b000]),
    ('#', [0b101, 0b111, 0b101, 0b111, 0b101]),
];

fn glyph_rows(ch: char) -> Option<[u8; 5]> {
    let upper = ch.to_ascii_uppercase();
    GLYPHS
        .iter()
        .find(|(glyph_char, _)| *glyph_char == upper)
        .map(|(_, rows)| *rows)
}

pub(crate) fn text_scale(font_size_px: f32) -> u32 {
    if !font_size_px.is_finite() {
        return 1;
    }
    (font_size_px / FONT_PX_PER_SCALE).round().max(1.0) as u32
}

/// Pixel size of `text` drawn at `font_size_px`; multi-line text is not
/// supported, so the height is always one glyph row.
pub(crate) fn measure_text(text: &str, font_size_px: f32) -> (u32, u32) {
    let scale = text_scale(font_size_px);
    let chars = text.chars().count() as u32;
    if chars == 0 {
        return (0, GLYPH_HEIGHT * scale);
    }
    let width = chars * (GLYPH_WIDTH + 1) * scale - scale;
    (width, GLYPH_HEIGHT * scale)
}

pub(crate) fn draw_text(
    canvas: &mut Canvas<'_>,
    left: i32,
    top: i32,
    text: &str,
    font_size_px: f32,
    color: [u8; 4],
) {
    let scale = text_scale(font_size_px) as i32;
    let advance = (GLYPH_WIDTH as i32 + 1) * scale;
    let mut x = left;
    for ch in text.chars() {
        if let Some(rows) = glyph_rows(ch) {
            draw_glyph(canvas, x, top, rows, scale, color);
        }
        x = x.saturating_add(advance);
        if x >= canvas.width() as i32 {
            break;
        }
    }
}

fn draw_glyph(canvas: &mut Canvas<'_>, left: i32, top: i32, rows: [u8; 5], scale: i32, color: [u8; 4]) {
    for (row_index, bits) in rows.iter().enumerate() {
        for column in 0..GLYPH_WIDTH as i32 {
            let mask = 1u8 << (GLYPH_WIDTH as i32 - 1 - column);
            if bits & mask == 0 {
                continue;
            }
            canvas.fill_rect(
                left + column * scale,
                top + row_index as i32 * scale,
                scale,
                scale,
                color,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_follows_font_size() {
        assert_eq!(text_scale(18.0), 3);
        assert_eq!(text_scale(32.0), 5);
        assert_eq!(text_scale(1.0), 1);
        assert_eq!(text_scale(f32::NAN), 1);
    }

    #[test]
    fn measure_excludes_trailing_spacing() {
        assert_eq!(measure_text("A", 6.0), (3, 5));
        assert_eq!(measure_text("AB", 6.0), (7, 5));
        assert_eq!(measure_text("Loading...", 32.0), (195, 25));
        assert_eq!(measure_text("", 18.0), (0, 15));
    }

    #[test]
    fn lowercase_uses_uppercase_glyphs_and_unknown_is_blank() {
        assert_eq!(glyph_rows('w'), glyph_rows('W'));
        assert!(glyph_rows('~').is_none());
    }

    #[test]
    fn draws_glyph_pixels() {
        let mut frame = vec![0u8; 8 * 8 * 4];
        let mut canvas = Canvas::new(&mut frame, 8, 8).expect("canvas");
        draw_text(&mut canvas, 0, 0, "-", 6.0, [255, 255, 255, 255]);
        assert_eq!(canvas.pixel(1, 2), Some([255, 255, 255, 255]));
        assert_eq!(canvas.pixel(1, 0), Some([0, 0, 0, 0]));
    }
}
