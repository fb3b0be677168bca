#![forbid(unsafe_code)]

//! Body and title helpers. Bodies are stored as HTML fragments; rendering is
//! somebody else's job, these only derive plain text from them.

pub const SNIPPET_RADIUS: usize = 40;
pub const EMPTY_BODY_HINT: &str = "<h1 class=\"kb-empty-title\"></h1>";
const COPY_SUFFIX: &str = " (copy)";

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Initial body of an article created without one.
pub fn default_body(title: Option<&str>) -> String {
    match title.map(str::trim).filter(|title| !title.is_empty()) {
        Some(title) => format!("<h1>{}</h1>", escape_html(title)),
        None => EMPTY_BODY_HINT.to_string(),
    }
}

/// Tags dropped, common entities decoded, whitespace collapsed.
pub fn html_to_text(html: &str) -> String {
    let mut raw = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => {
                in_tag = true;
                raw.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => raw.push(ch),
            _ => {}
        }
    }
    let decoded = raw
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Plain-text excerpt around the first case-insensitive match of `term`,
/// [`SNIPPET_RADIUS`] characters on each side. Falls back to the start of the
/// text when the term only matched the title.
pub fn snippet(body_html: &str, term: &str) -> String {
    let text = html_to_text(body_html);
    let chars: Vec<char> = text.chars().collect();
    let needle: Vec<char> = term.trim().to_lowercase().chars().collect();
    let lowered: Vec<char> = chars
        .iter()
        .map(|ch| ch.to_lowercase().next().unwrap_or(*ch))
        .collect();

    let hit = if needle.is_empty() {
        None
    } else {
        lowered
            .windows(needle.len())
            .position(|window| window == needle.as_slice())
    };
    let (start, end) = match hit {
        Some(at) => (
            at.saturating_sub(SNIPPET_RADIUS),
            (at + needle.len() + SNIPPET_RADIUS).min(chars.len()),
        ),
        None => (0, (SNIPPET_RADIUS * 2).min(chars.len())),
    };
    chars[start..end].iter().collect::<String>().trim().to_string()
}

pub fn copy_title(title: Option<&str>) -> String {
    format!("{}{COPY_SUFFIX}", title.unwrap_or_default())
        .trim()
        .to_string()
}
