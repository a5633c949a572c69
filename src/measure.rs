//! Text measurement capability consumed by the layout engine.
//!
//! The engine never touches font data itself; it asks a [`TextMeasure`] for
//! string widths and wraps on top of the answers. Production code uses
//! [`HelveticaMetrics`]; layout tests use the deterministic [`FixedAdvance`].

/// Base-14 font variants the renderer can draw with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
}

/// Points to page units (millimetres).
pub const PT_TO_MM: f32 = 25.4 / 72.0;

pub trait TextMeasure {
    /// Width of `text` in page units at `size_pt` points.
    fn text_width(&self, text: &str, style: FontStyle, size_pt: f32) -> f32;

    /// Greedy word wrap against `max_width`. Words wider than the full
    /// width are hard-split so a single long token cannot overflow a cell.
    fn wrap(&self, text: &str, style: FontStyle, size_pt: f32, max_width: f32) -> Vec<String> {
        let mut lines: Vec<String> = Vec::new();
        let mut current = String::new();

        let push_word = |word: &str, lines: &mut Vec<String>, current: &mut String| {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if self.text_width(&candidate, style, size_pt) <= max_width || current.is_empty() {
                *current = candidate;
            } else {
                lines.push(std::mem::take(current));
                *current = word.to_string();
            }
        };

        for word in text.split_whitespace() {
            if self.text_width(word, style, size_pt) > max_width {
                // Hard-split an unbreakable token char by char.
                let mut piece = String::new();
                for ch in word.chars() {
                    piece.push(ch);
                    if self.text_width(&piece, style, size_pt) > max_width && piece.chars().count() > 1
                    {
                        piece.pop();
                        push_word(&piece, &mut lines, &mut current);
                        if !current.is_empty() {
                            lines.push(std::mem::take(&mut current));
                        }
                        piece = ch.to_string();
                    }
                }
                if !piece.is_empty() {
                    push_word(&piece, &mut lines, &mut current);
                }
            } else {
                push_word(word, &mut lines, &mut current);
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        if lines.is_empty() {
            lines.push(String::new());
        }
        lines
    }
}

/// Map a single Unicode char to its WinAnsi byte, or 0 if unmappable.
pub(crate) fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007F => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes for PDF Str encoding.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(char_to_winansi)
        .filter(|&b| b != 0)
        .collect()
}

/// Approximate Helvetica advance widths at 1000 units/em, indexed by WinAnsi
/// byte minus 32. Good enough for invoice cells; exact glyph shaping is out
/// of scope.
fn helvetica_widths() -> Vec<f32> {
    (32u8..=255u8)
        .map(|b| match b {
            32 => 278.0,                          // space
            33..=47 => 333.0,                     // punctuation
            48..=57 => 556.0,                     // digits
            58..=64 => 333.0,                     // more punctuation
            73 | 74 => 278.0,                     // I J (narrow uppercase)
            77 => 833.0,                          // M (wide)
            65..=90 => 667.0,                     // uppercase A-Z (average)
            91..=96 => 333.0,                     // brackets etc.
            102 | 105 | 106 | 108 | 116 => 278.0, // narrow lowercase: f i j l t
            109 | 119 => 833.0,                   // m w (wide)
            97..=122 => 556.0,                    // lowercase a-z (average)
            _ => 556.0,
        })
        .collect()
}

/// WinAnsi-table metrics for the base-14 Helvetica family. Bold and oblique
/// variants reuse the regular table; the difference is below cell-padding
/// tolerance at invoice sizes.
pub struct HelveticaMetrics {
    widths_1000: Vec<f32>,
}

impl HelveticaMetrics {
    pub fn new() -> Self {
        Self {
            widths_1000: helvetica_widths(),
        }
    }

    fn char_width_1000(&self, ch: char) -> f32 {
        let byte = char_to_winansi(ch);
        if byte >= 32 {
            self.widths_1000[(byte - 32) as usize]
        } else {
            0.0
        }
    }
}

impl Default for HelveticaMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasure for HelveticaMetrics {
    fn text_width(&self, text: &str, _style: FontStyle, size_pt: f32) -> f32 {
        text.chars()
            .map(|ch| self.char_width_1000(ch) * size_pt / 1000.0)
            .sum::<f32>()
            * PT_TO_MM
    }
}

/// Deterministic measurer: every character advances by a fixed number of page
/// units regardless of font or size. Makes wrap and pagination decisions
/// exactly predictable in tests.
pub struct FixedAdvance(pub f32);

impl TextMeasure for FixedAdvance {
    fn text_width(&self, text: &str, _style: FontStyle, _size_pt: f32) -> f32 {
        text.chars().count() as f32 * self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_respects_max_width() {
        let m = FixedAdvance(1.0);
        let lines = m.wrap("aaa bbb ccc", FontStyle::Regular, 9.0, 7.0);
        assert_eq!(lines, vec!["aaa bbb", "ccc"]);
    }

    #[test]
    fn wrap_hard_splits_long_tokens() {
        let m = FixedAdvance(1.0);
        let lines = m.wrap("abcdefghij", FontStyle::Regular, 9.0, 4.0);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn wrap_empty_is_single_blank_line() {
        let m = FixedAdvance(1.0);
        assert_eq!(m.wrap("", FontStyle::Regular, 9.0, 10.0), vec![""]);
    }

    #[test]
    fn helvetica_narrow_vs_wide() {
        let m = HelveticaMetrics::new();
        let narrow = m.text_width("iiii", FontStyle::Regular, 10.0);
        let wide = m.text_width("mmmm", FontStyle::Regular, 10.0);
        assert!(wide > narrow);
    }

    #[test]
    fn unmappable_chars_measure_zero() {
        let m = HelveticaMetrics::new();
        assert_eq!(m.text_width("\u{4e2d}", FontStyle::Regular, 10.0), 0.0);
    }
}
