use core_text::{InlineSpan, SpanStyle};

const MAX_NESTING: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Bold,
    Italic,
    Strike,
    Underline,
}

impl Marker {
    fn style_bit(self, style: &mut SpanStyle) {
        match self {
            Marker::Bold => style.bold = true,
            Marker::Italic => style.italic = true,
            Marker::Strike => style.strike = true,
            Marker::Underline => style.underline = true,
        }
    }
}

/// Parse inline markers out of `line`, returning the normalized text (with
/// markers removed) and the spans they produced. Markers toggle: the
/// first `**` in a run opens bold, the next closes it. Nesting depth is
/// capped at 16; markers past the cap pass through as literal text.
pub fn parse_inline(line: &str) -> (String, Vec<InlineSpan>) {
    let bytes = line.as_bytes();
    let mut output = String::with_capacity(line.len());
    let mut stack: Vec<(Marker, usize)> = Vec::new();
    let mut spans = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 1 < bytes.len() {
            let next_char_len = next_char_boundary(line, i + 1) - (i + 1);
            output.push_str(&line[i + 1..i + 1 + next_char_len]);
            i += 1 + next_char_len;
            continue;
        }

        if let Some((marker, width)) = match_marker(bytes, i) {
            if let Some(pos) = stack.iter().rposition(|(m, _)| *m == marker) {
                let (_, start) = stack.remove(pos);
                let end = output.len();
                let mut style = SpanStyle::default();
                marker.style_bit(&mut style);
                spans.push(InlineSpan {
                    start,
                    length: end - start,
                    style,
                });
            } else if stack.len() < MAX_NESTING {
                stack.push((marker, output.len()));
            } else {
                output.push_str(&line[i..i + width]);
                i += width;
                continue;
            }
            i += width;
            continue;
        }

        let next = next_char_boundary(line, i);
        output.push_str(&line[i..next]);
        i = next;
    }

    // Unbalanced opens close at end-of-line so the style still applies
    // to the remaining text rather than silently vanishing.
    while let Some((marker, start)) = stack.pop() {
        let end = output.len();
        if end > start {
            let mut style = SpanStyle::default();
            marker.style_bit(&mut style);
            spans.push(InlineSpan {
                start,
                length: end - start,
                style,
            });
        }
    }

    (output, spans)
}

fn match_marker(bytes: &[u8], i: usize) -> Option<(Marker, usize)> {
    let two = bytes.get(i..i + 2);
    match two {
        Some(b"**") => return Some((Marker::Bold, 2)),
        Some(b"__") => return Some((Marker::Bold, 2)),
        Some(b"~~") => return Some((Marker::Strike, 2)),
        Some(b"++") => return Some((Marker::Underline, 2)),
        _ => {}
    }
    match bytes.get(i).copied() {
        Some(b'*') => Some((Marker::Italic, 1)),
        Some(b'_') => Some((Marker::Italic, 1)),
        _ => None,
    }
}

fn next_char_boundary(s: &str, from: usize) -> usize {
    let mut j = from + 1;
    while j < s.len() && !s.is_char_boundary(j) {
        j += 1;
    }
    j.min(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_markers_are_removed_and_tracked_as_a_span() {
        let (normalized, spans) = parse_inline("a **b** c");
        assert_eq!(normalized, "a b c");
        assert_eq!(spans.len(), 1);
        assert!(spans[0].style.bold);
    }

    #[test]
    fn underline_and_strike_custom_markers() {
        let (normalized, spans) = parse_inline("++under++ ~~gone~~");
        assert_eq!(normalized, "under gone");
        assert!(spans.iter().any(|s| s.style.underline));
        assert!(spans.iter().any(|s| s.style.strike));
    }

    #[test]
    fn escaped_marker_is_literal() {
        let (normalized, spans) = parse_inline(r"\*not italic\*");
        assert_eq!(normalized, "*not italic*");
        assert!(spans.is_empty());
    }

    #[test]
    fn balanced_markers_preserve_length_arithmetic() {
        let input = "**bold** and _em_";
        let consumed_markers = 4 + 2; // **...** (4 chars) + _..._ (2 chars)
        let (normalized, spans) = parse_inline(input);
        assert_eq!(normalized.len(), input.len() - consumed_markers);
        assert_eq!(spans.len(), 2);
    }

    #[test]
    fn nesting_cap_falls_back_to_literal_markers() {
        let mut input = String::new();
        for _ in 0..20 {
            input.push_str("**");
        }
        input.push('x');
        for _ in 0..20 {
            input.push_str("**");
        }
        let (_normalized, spans) = parse_inline(&input);
        assert!(spans.len() <= MAX_NESTING);
    }
}
