/// Standard Type 1 fonts available to every PDF viewer without embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Font {
    Regular,
    Bold,
}

impl Font {
    pub(crate) const fn resource_name(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
        }
    }

    pub(crate) const fn base_font(self) -> &'static str {
        match self {
            Self::Regular => "Helvetica",
            Self::Bold => "Helvetica-Bold",
        }
    }

    /// Rendered width in points of `text` at `size`.
    pub(crate) fn text_width(self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(self.glyph_width(c))).sum();
        units as f32 * size / 1000.0
    }

    fn glyph_width(self, c: char) -> u16 {
        let table = match self {
            Self::Regular => &HELVETICA_WIDTHS,
            Self::Bold => &HELVETICA_BOLD_WIDTHS,
        };
        let base = fold_accent(c);
        match base {
            ' '..='~' => table[base as usize - 32],
            _ => DEFAULT_WIDTH,
        }
    }
}

const DEFAULT_WIDTH: u16 = 556;

// Advance widths for code points 32..=126, in 1/1000 em (Adobe core font metrics).
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    333, 333, 584, 584, 584, 611, 975, // ':'..'@'
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    333, 278, 333, 584, 556, 333, // '['..'`'
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // 'a'..'m'
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // 'n'..'z'
    389, 280, 389, 584, // '{'..'~'
];

/// Accented Latin letters share the advance width of their base letter.
fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
        'Á' | 'À' | 'Ä' | 'Â' | 'Ã' => 'A',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'É' | 'È' | 'Ë' | 'Ê' => 'E',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'Ó' | 'Ò' | 'Ö' | 'Ô' | 'Õ' => 'O',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ç' => 'c',
        'Ç' => 'C',
        '\t' => ' ',
        other => other,
    }
}

/// Maps a character to its WinAnsiEncoding byte, `None` when it has no slot.
pub(crate) fn encode_win_ansi(c: char) -> Option<u8> {
    let byte = match c {
        ' '..='~' => c as u8,
        '\u{a0}'..='\u{ff}' => c as u32 as u8,
        '\t' => b' ',
        '€' => 0x80,
        '‚' => 0x82,
        '„' => 0x84,
        '…' => 0x85,
        '‰' => 0x89,
        '‹' => 0x8b,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '™' => 0x99,
        '›' => 0x9b,
        _ => return None,
    };
    Some(byte)
}

/// Greedy word wrap honouring explicit line breaks. Words wider than the line are
/// split between characters. Always returns at least one (possibly empty) line.
pub(crate) fn wrap_text(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        let mut current = String::new();

        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if font.text_width(&candidate, size) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            for c in word.chars() {
                current.push(c);
                if current.chars().count() > 1 && font.text_width(&current, size) > max_width {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(c);
                }
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
    fn widths_follow_core_metrics() {
        assert_eq!(Font::Regular.text_width("i", 1000.0), 222.0);
        assert_eq!(Font::Bold.text_width("i", 1000.0), 278.0);
        assert_eq!(
            Font::Regular.text_width("POLICÍA", 10.0),
            Font::Regular.text_width("POLICIA", 10.0)
        );
    }

    #[test]
    fn encodes_spanish_letters_in_win_ansi() {
        let encoded: Option<Vec<u8>> = "Pérez Ñ º ¿".chars().map(encode_win_ansi).collect();
        assert_eq!(encoded, Some(b"P\xe9rez \xd1 \xba \xbf".to_vec()));
        assert_eq!(encode_win_ansi('€'), Some(0x80));
        assert_eq!(encode_win_ansi('漢'), None);
        assert_eq!(encode_win_ansi('Ł'), None);
    }

    #[test]
    fn wraps_on_word_boundaries_and_breaks_long_words() {
        let lines = wrap_text("uno dos tres cuatro", Font::Regular, 10.0, 40.0);
        assert!(lines.len() > 1);
        assert!(lines
            .iter()
            .all(|line| Font::Regular.text_width(line, 10.0) <= 40.0));
        assert_eq!(lines.join(" "), "uno dos tres cuatro");

        let long = "x".repeat(60);
        let lines = wrap_text(&long, Font::Regular, 10.0, 50.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), long);
    }

    #[test]
    fn keeps_explicit_line_breaks_and_empty_text() {
        assert_eq!(
            wrap_text("a\r\n\nb", Font::Regular, 10.0, 500.0),
            vec!["a", "", "b"]
        );
        assert_eq!(wrap_text("", Font::Regular, 10.0, 500.0), vec![""]);
    }
}
