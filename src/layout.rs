//! Width accounting for rendered rows.
//!
//! All widths are counted in `char`s, so multi-byte labels and content never
//! get cut in the middle of a character.

use std::borrow::Cow;

/// Width of the label column between the two pipes.
pub const LABEL_WIDTH: usize = 17;

/// Columns taken by the row frame around the label: two pipes, the space
/// after them and one spare column so a full row does not trigger the
/// terminal's own wrapping.
pub const FRAME_WIDTH: usize = 4;

/// Content columns left on a terminal `columns` wide, never less than one.
pub fn content_width(columns: u16) -> usize {
    usize::from(columns)
        .saturating_sub(LABEL_WIDTH + FRAME_WIDTH)
        .max(1)
}

/// Splits `text` into consecutive slices of at most `max_width` chars.
///
/// Text that already fits comes back as a single slice, including the empty
/// string. A `max_width` of zero is treated as one.
pub fn partition(text: &str, max_width: usize) -> Vec<&str> {
    let max_width = max_width.max(1);

    let mut fragments = Vec::new();
    let mut start = 0;
    for (count, (idx, _)) in text.char_indices().enumerate() {
        if count > 0 && count % max_width == 0 {
            fragments.push(&text[start..idx]);
            start = idx;
        }
    }
    fragments.push(&text[start..]);

    fragments
}

/// Shortens `label` to `max_width` chars, keeping its tail behind an
/// ellipsis.
pub fn trim_label(label: &str, max_width: usize) -> Cow<'_, str> {
    let len = label.chars().count();
    if len <= max_width {
        return Cow::Borrowed(label);
    }

    if max_width <= 3 {
        return Cow::Owned(".".repeat(max_width));
    }

    let keep = max_width - 3;
    let tail = label
        .char_indices()
        .nth(len - keep)
        .map_or("", |(idx, _)| &label[idx..]);

    Cow::Owned(format!("...{}", tail))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_width() {
        assert_eq!(content_width(80), 59);
        assert_eq!(content_width(200), 179);
        assert_eq!(content_width(21), 1);
        assert_eq!(content_width(0), 1);
    }

    #[test]
    fn test_partition_short_text() {
        assert_eq!(partition("short line", 59), vec!["short line"]);
        assert_eq!(partition("exact", 5), vec!["exact"]);
        assert_eq!(partition("", 10), vec![""]);
    }

    #[test]
    fn test_partition_long_text() {
        assert_eq!(partition("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert_eq!(partition("abcdef", 3), vec!["abc", "def"]);
        assert_eq!(partition("abc", 0), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_partition_multibyte() {
        assert_eq!(partition("héllo wörld", 4), vec!["héll", "o wö", "rld"]);
        assert_eq!(partition("日本語のログ", 4), vec!["日本語の", "ログ"]);
        assert_eq!(partition("🦀🦀🦀", 2), vec!["🦀🦀", "🦀"]);
    }

    #[test]
    fn test_trim_label() {
        assert_eq!(trim_label("app.log", 17), "app.log");
        assert_eq!(trim_label("seventeen-chars.x", 17), "seventeen-chars.x");
        assert_eq!(
            trim_label("/var/log/nginx/access.log", 17),
            "...inx/access.log"
        );
        assert_eq!(trim_label("/var/log/nginx/access.log", 10), "...ess.log");
    }

    #[test]
    fn test_trim_label_multibyte() {
        let trimmed = trim_label("/srv/журнал/событий.log", 12);
        assert_eq!(trimmed, "...бытий.log");
        assert_eq!(trimmed.chars().count(), 12);
    }

    #[test]
    fn test_trim_label_tiny_width() {
        assert_eq!(trim_label("abcdef", 3), "...");
        assert_eq!(trim_label("abcdef", 2), "..");
        assert_eq!(trim_label("abcdef", 0), "");
    }
}
