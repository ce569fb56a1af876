//! Search-term highlighting for card text.
//!
//! Output is an HTML fragment: text is escaped, newlines become `<br>`, and
//! matches are wrapped in `<mark>`. The text is cut to `max_chars` characters
//! *before* matching, so an occurrence that starts in the window but runs past
//! its end is not marked, and nothing after the cut is ever searched.

/// Escapes one character for HTML text content. Newlines become `<br>`; `\r` is dropped.
fn push_escaped_char(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        '\n' => out.push_str("<br>"),
        '\r' => {}
        _ => out.push(c),
    }
}

/// Appends `text` to `out`, HTML-escaped, with newlines as `<br>`.
pub fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        push_escaped_char(out, c);
    }
}

/// HTML-escapes `text`, newlines as `<br>`.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    push_escaped(&mut out, text);
    out
}

/// The first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}

/// Suffix telling the reader that only part of the text is shown.
pub fn truncation_notice(shown: usize, total: usize) -> String {
    format!("…<br><small>(showed {} of {} characters)</small>", shown, total)
}

/// Byte ranges of non-overlapping, case-insensitive, literal occurrences of
/// `needle` in `haystack`, left to right.
///
/// Both sides are compared after Unicode lowercasing. A match must start and
/// end on whole characters of `haystack`, even where lowercasing expands one
/// character into several.
pub fn find_case_insensitive(haystack: &str, needle: &str) -> Vec<(usize, usize)> {
    let needle: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    if needle.is_empty() {
        return Vec::new();
    }

    // (lowercased char, byte offset of the source char, first char of its expansion)
    let mut folded: Vec<(char, usize, bool)> = Vec::with_capacity(haystack.len());
    for (byte, c) in haystack.char_indices() {
        for (k, lower) in c.to_lowercase().enumerate() {
            folded.push((lower, byte, k == 0));
        }
    }

    let n = needle.len();
    let mut matches = Vec::new();
    let mut i = 0;
    while i + n <= folded.len() {
        let end = i + n;
        let on_boundary = folded[i].2 && (end == folded.len() || folded[end].2);
        if on_boundary && folded[i..end].iter().zip(&needle).all(|(f, c)| f.0 == *c) {
            let end_byte = if end == folded.len() { haystack.len() } else { folded[end].1 };
            matches.push((folded[i].1, end_byte));
            i = end;
        } else {
            i += 1;
        }
    }
    matches
}

/// Renders `text` for display with every occurrence of `term` marked.
///
/// - Blank `term`: the first `max_chars` characters, escaped, nothing else.
/// - Otherwise: truncate, mark matches inside the window, and if `text` was
///   longer than `max_chars` append [`truncation_notice`].
///
/// # Examples
///
/// ```
/// use cardsearch::searching::highlight::highlight;
///
/// let html = highlight("Рядовой ИВАНОВ.\nПогиб", "иванов", 100);
/// assert_eq!(html, "Рядовой <mark>ИВАНОВ</mark>.<br>Погиб");
/// ```
pub fn highlight(text: &str, term: &str, max_chars: usize) -> String {
    let window = truncate_chars(text, max_chars);
    let term = term.trim();
    if term.is_empty() {
        return escape_html(window);
    }

    let mut out = String::with_capacity(window.len() + 64);
    let mut last = 0;
    for (start, end) in find_case_insensitive(window, term) {
        push_escaped(&mut out, &window[last..start]);
        out.push_str("<mark>");
        push_escaped(&mut out, &window[start..end]);
        out.push_str("</mark>");
        last = end;
    }
    push_escaped(&mut out, &window[last..]);

    if window.len() < text.len() {
        out.push_str(&truncation_notice(max_chars, text.chars().count()));
    }
    out
}
