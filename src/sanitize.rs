use std::borrow::Cow;

/// Make server-supplied text safe to put on a terminal.
///
/// Control characters (including ESC and the C1 CSI introducer) are dropped so
/// a crafted artist or error string cannot emit escape sequences. Line breaks
/// and tabs become plain spaces since every value is shown on a single line.
pub fn clean_text(raw: &str) -> String {
    raw.chars()
        .filter_map(|c| match c {
            '\n' | '\r' | '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

/// Escape text for inclusion in HTML element content or quoted attributes.
pub fn escape_html(raw: &str) -> Cow<'_, str> {
    if !raw.contains(|c: char| matches!(c, '&' | '<' | '>' | '"' | '\'')) {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len() + 16);
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}
