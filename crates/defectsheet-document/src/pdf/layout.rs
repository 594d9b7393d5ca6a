// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page canvas — accumulates printpdf operations for one page.
//
// Text width is estimated, not measured: the average glyph is roughly half
// the font size wide. Coordinates are PDF points with the origin at the
// bottom-left corner. Text goes through the embedded font when one is set,
// otherwise through builtin Helvetica (WinAnsi, Latin only).

use printpdf::{
    BuiltinFont, Color, FontId, Op, Point, Pt, Rgb, TextItem, XObjectId, XObjectTransform,
};

/// Average glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// Resolution photos are placed at before scaling.
const IMAGE_DPI: f32 = 150.0;

/// Font face used for a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Regular,
    Bold,
}

impl Face {
    fn builtin(self) -> BuiltinFont {
        match self {
            Self::Regular => BuiltinFont::Helvetica,
            Self::Bold => BuiltinFont::HelveticaBold,
        }
    }
}

/// RGB colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tint(pub f32, pub f32, pub f32);

impl Tint {
    pub const BLACK: Tint = Tint(0.0, 0.0, 0.0);
    pub const GREY: Tint = Tint(0.4, 0.4, 0.4);
    pub const WATERMARK: Tint = Tint(0.88, 0.88, 0.88);
    pub const ACCENT: Tint = Tint(0.18, 0.49, 0.2);
}

/// Rectangle in page points; `y` is the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Operation list for a single page.
pub struct Canvas {
    ops: Vec<Op>,
    width: f32,
    /// Embedded font used for every face.
    font: Option<FontId>,
}

impl Canvas {
    pub fn new(width: f32, font: Option<FontId>) -> Self {
        Self {
            ops: Vec::new(),
            width,
            font,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn into_ops(self) -> Vec<Op> {
        self.ops
    }

    pub fn set_color(&mut self, tint: Tint) {
        self.ops.push(Op::SetFillColor {
            col: Color::Rgb(Rgb {
                r: tint.0,
                g: tint.1,
                b: tint.2,
                icc_profile: None,
            }),
        });
    }

    /// Write `text` with its baseline starting at `(x, y)`.
    pub fn text(&mut self, x: f32, y: f32, size: f32, face: Face, text: &str) {
        if text.is_empty() {
            return;
        }
        self.ops.push(Op::StartTextSection);
        self.ops.push(Op::SetTextCursor {
            pos: Point { x: Pt(x), y: Pt(y) },
        });
        let items = vec![TextItem::Text(text.to_owned())];
        match &self.font {
            Some(font) => {
                self.ops.push(Op::SetFontSize {
                    size: Pt(size),
                    font: font.clone(),
                });
                self.ops.push(Op::WriteText {
                    items,
                    font: font.clone(),
                });
            }
            None => {
                self.ops.push(Op::SetFontSizeBuiltinFont {
                    size: Pt(size),
                    font: face.builtin(),
                });
                self.ops.push(Op::WriteTextBuiltinFont {
                    items,
                    font: face.builtin(),
                });
            }
        }
        self.ops.push(Op::EndTextSection);
    }

    /// Write `text` centred horizontally on the page.
    pub fn text_centered(&mut self, y: f32, size: f32, face: Face, text: &str) {
        let x = ((self.width - estimate_width(text, size)) / 2.0).max(0.0);
        self.text(x, y, size, face, text);
    }

    /// Write `text` so that it ends at `right`.
    pub fn text_right(&mut self, right: f32, y: f32, size: f32, face: Face, text: &str) {
        let x = (right - estimate_width(text, size)).max(0.0);
        self.text(x, y, size, face, text);
    }

    /// Place an embedded image centred in `frame`, scaled down to fit.
    ///
    /// Returns the frame actually covered by the image.
    pub fn image(&mut self, id: XObjectId, pixel_width: u32, pixel_height: u32, frame: Frame) -> Frame {
        let native_w = pixel_width.max(1) as f32 / IMAGE_DPI * 72.0;
        let native_h = pixel_height.max(1) as f32 / IMAGE_DPI * 72.0;
        let scale = (frame.width / native_w).min(frame.height / native_h).min(1.0);

        let width = native_w * scale;
        let height = native_h * scale;
        let x = frame.x + (frame.width - width) / 2.0;
        let y = frame.y + (frame.height - height) / 2.0;

        self.ops.push(Op::UseXobject {
            id,
            transform: XObjectTransform {
                translate_x: Some(Pt(x)),
                translate_y: Some(Pt(y)),
                scale_x: Some(scale),
                scale_y: Some(scale),
                dpi: Some(IMAGE_DPI),
                rotate: None,
            },
        });

        Frame {
            x,
            y,
            width,
            height,
        }
    }
}

/// Estimated rendered width of `text` at `size` points.
pub fn estimate_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * AVG_GLYPH_WIDTH * size
}

/// How many characters fit in `width` points at `size`.
pub fn chars_per_line(width: f32, size: f32) -> usize {
    ((width / (AVG_GLYPH_WIDTH * size)) as usize).max(1)
}

/// Word-wrap `text` so that no line exceeds `max_chars` characters.
///
/// Existing newlines are kept. Words longer than a line are broken on
/// character boundaries.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0usize;

        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();

            if word_len > max_chars {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let chars: Vec<char> = word.chars().collect();
                let mut pieces = chars.chunks(max_chars).peekable();
                while let Some(piece) = pieces.next() {
                    if pieces.peek().is_some() {
                        lines.push(piece.iter().collect());
                    } else {
                        current = piece.iter().collect();
                        current_len = piece.len();
                    }
                }
            } else if current.is_empty() {
                current.push_str(word);
                current_len = word_len;
            } else if current_len + 1 + word_len <= max_chars {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_owned()));
                current_len = word_len;
            }
        }

        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_respects_width() {
        let lines = wrap_text("water is dripping from the ceiling near the lamp", 16);
        assert!(lines.iter().all(|line| line.chars().count() <= 16));
        assert_eq!(lines.join(" "), "water is dripping from the ceiling near the lamp");
    }

    #[test]
    fn wrap_keeps_paragraphs() {
        let lines = wrap_text("first\n\nsecond", 40);
        assert_eq!(lines, vec!["first", "", "second"]);
    }

    #[test]
    fn long_word_breaks_on_char_boundaries() {
        let lines = wrap_text("น้ำรั่วซึมจากเพดาน", 5);
        assert!(lines.iter().all(|line| line.chars().count() <= 5));
        assert_eq!(lines.concat(), "น้ำรั่วซึมจากเพดาน");
    }

    #[test]
    fn builtin_font_without_embedding() {
        let mut canvas = Canvas::new(500.0, None);
        canvas.text(10.0, 10.0, 11.0, Face::Bold, "Room 1204");
        let ops = canvas.into_ops();
        assert!(ops.iter().any(|op| matches!(
            op,
            Op::WriteTextBuiltinFont {
                font: BuiltinFont::HelveticaBold,
                ..
            }
        )));
    }

    #[test]
    fn embedded_font_carries_all_text() {
        let font = FontId("F-sarabun".into());
        let mut canvas = Canvas::new(500.0, Some(font.clone()));
        canvas.text(10.0, 10.0, 11.0, Face::Bold, "ห้องน้ำ");
        canvas.text_centered(40.0, 20.0, Face::Regular, "ริทึ่ม");
        let ops = canvas.into_ops();

        assert!(!ops.iter().any(|op| matches!(op, Op::WriteTextBuiltinFont { .. })));
        let written: Vec<&Op> = ops
            .iter()
            .filter(|op| matches!(op, Op::WriteText { font: f, .. } if *f == font))
            .collect();
        assert_eq!(written.len(), 2);
    }

    #[test]
    fn chars_per_line_is_never_zero() {
        assert_eq!(chars_per_line(1.0, 40.0), 1);
        assert_eq!(chars_per_line(110.0, 11.0), 20);
    }

    #[test]
    fn width_estimate_counts_chars_not_bytes() {
        assert_eq!(estimate_width("ab", 10.0), 10.0);
        assert_eq!(estimate_width("ศศ", 10.0), 10.0);
    }
}
