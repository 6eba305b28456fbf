//! Text measurement and whitespace wrapping.

/// Measures the rendered width of a line of text at a given font size.
///
/// The composer is generic over this so that layout stays independent of
/// the output backend: the PDF backend supplies real TrueType advances,
/// while [`BuiltinMetrics`] approximates the built-in Helvetica widths.
pub trait TextMeasure {
    /// Width of `text` in points when set at `font_size`.
    fn line_width(&self, text: &str, font_size: f32) -> f32;
}

/// Width approximation for the built-in Helvetica face, used when no font
/// file is embedded. Latin glyphs average roughly half an em; fullwidth
/// and CJK glyphs take a full em.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinMetrics;

impl BuiltinMetrics {
    /// Create the built-in metrics.
    pub fn new() -> Self {
        Self
    }

    fn advance(c: char) -> f32 {
        match c {
            ' ' => 0.278,
            'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' => 0.25,
            'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '-' | '/' => 0.333,
            'm' | 'M' | 'W' | 'w' => 0.889,
            c if c.is_ascii_uppercase() => 0.677,
            c if c.is_ascii_digit() => 0.556,
            c if c.is_ascii() => 0.5,
            // Fullwidth forms, CJK ideographs, kana.
            c if ('\u{1100}'..='\u{9FFF}').contains(&c)
                || ('\u{F900}'..='\u{FFEF}').contains(&c) =>
            {
                1.0
            }
            _ => 0.6,
        }
    }
}

impl TextMeasure for BuiltinMetrics {
    fn line_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().map(Self::advance).sum::<f32>() * font_size
    }
}

/// Fixed-advance metrics. Handy in tests, where line widths need to be
/// predictable down to the character count.
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMetrics {
    /// Advance per character in ems.
    pub advance: f32,
}

#[cfg(test)]
impl TextMeasure for MonospaceMetrics {
    fn line_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * self.advance * font_size
    }
}

/// Wrap `text` into the minimum number of lines of at most `max_width`
/// points, breaking only at whitespace.
///
/// A single word wider than `max_width` is placed on its own line without
/// further splitting; the overflow is accepted. Empty and whitespace-only
/// input yields no lines.
pub fn wrap_text(
    text: &str,
    measure: &dyn TextMeasure,
    font_size: f32,
    max_width: f32,
) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        let candidate_width =
            measure.line_width(&current, font_size) + measure.line_width(" ", font_size)
                + measure.line_width(word, font_size);
        if candidate_width <= max_width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONO: MonospaceMetrics = MonospaceMetrics { advance: 1.0 };

    #[test]
    fn test_wrap_empty_and_whitespace() {
        assert!(wrap_text("", &MONO, 10.0, 100.0).is_empty());
        assert!(wrap_text("   \t ", &MONO, 10.0, 100.0).is_empty());
    }

    #[test]
    fn test_wrap_fits_on_one_line() {
        // 7 chars * 10pt = 70pt <= 100pt.
        let lines = wrap_text("abc def", &MONO, 10.0, 100.0);
        assert_eq!(lines, vec!["abc def"]);
    }

    #[test]
    fn test_wrap_breaks_at_whitespace() {
        // Each word is 40pt; "abcd efgh" would be 90pt > 80pt.
        let lines = wrap_text("abcd efgh ijkl", &MONO, 10.0, 80.0);
        assert_eq!(lines, vec!["abcd", "efgh", "ijkl"]);
    }

    #[test]
    fn test_overlong_word_gets_its_own_line() {
        let lines = wrap_text("a extraordinarily b", &MONO, 10.0, 60.0);
        assert_eq!(lines, vec!["a", "extraordinarily", "b"]);
    }

    #[test]
    fn test_wrap_collapses_runs_of_whitespace() {
        let lines = wrap_text("a  \t b", &MONO, 10.0, 100.0);
        assert_eq!(lines, vec!["a b"]);
    }

    #[test]
    fn test_builtin_metrics_cjk_wider_than_latin() {
        let metrics = BuiltinMetrics::new();
        let latin = metrics.line_width("abcd", 12.0);
        let cjk = metrics.line_width("发动机一", 12.0);
        assert!(cjk > latin);
        assert_eq!(cjk, 48.0);
    }
}
