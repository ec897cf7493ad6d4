//! Message formatter — markdown-lite bot replies to transcript HTML.
//!
//! DESIGN
//! ======
//! The formatter is an ordered list of passes over a single string buffer.
//! Each pass reads the previous pass's output and never looks back, so the
//! first applicable rule wins and nothing backtracks. The buffer is
//! HTML-escaped before any pass runs; passes only ever add tags.
//!
//! Code (fenced and inline) and finished links are lifted out of the buffer
//! into a stash and replaced by a NUL-delimited placeholder so that later
//! passes cannot rewrite their contents; a link URL with asterisks in it
//! stays a URL. Placeholders are restored just before the final cleanup.
//! NUL is stripped from the input up front, so a placeholder can never be
//! forged by the reply text.
//!
//! Emphasis never crosses a `<strong>` boundary: an italic span whose inner
//! text would leave a bold tag unbalanced keeps its asterisks literal.
//!
//! User-authored text never goes through here: it is rendered with
//! [`render_user_text`], which escapes and wraps it without interpretation.

/// Tags whose opening or closing boundary swallows an adjacent `<br>`.
const BLOCK_BOUNDARIES: &[&str] = &[
    "<h2>", "</h2>", "<h3>", "</h3>", "<h4>", "</h4>", "<ul>", "</ul>", "<pre>", "</pre>", "<hr>",
];

const PLACEHOLDER: char = '\0';

type Pass = fn(&str, &mut Stash) -> String;

/// Formatting passes in application order.
const PASSES: &[(&str, Pass)] = &[
    ("fenced_code", fenced_code),
    ("inline_code", inline_code),
    ("links", links),
    ("headers", headers),
    ("bold", bold),
    ("italic", italic),
    ("lists", lists),
    ("rules", rules),
    ("line_breaks", line_breaks),
    ("restore", restore),
    ("cleanup", cleanup),
];

/// Fragments lifted out of the buffer, indexed by placeholder number.
#[derive(Debug, Default)]
struct Stash {
    fragments: Vec<String>,
}

impl Stash {
    fn push(&mut self, html: String) -> String {
        let index = self.fragments.len();
        self.fragments.push(html);
        format!("{PLACEHOLDER}{index}{PLACEHOLDER}")
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Convert a bot reply into transcript HTML.
///
/// Pure and total: every input, including the empty string and unbalanced
/// delimiters, yields a string. Unmatched delimiters stay literal.
#[must_use]
pub fn format_message(text: &str) -> String {
    let mut stash = Stash::default();
    let mut buf = escape_html(&text.replace(PLACEHOLDER, ""));
    for (_name, pass) in PASSES {
        buf = pass(&buf, &mut stash);
    }
    buf
}

/// Render user-authored text as a single escaped paragraph.
#[must_use]
pub fn render_user_text(text: &str) -> String {
    format!("<p>{}</p>", escape_html(text))
}

/// Escape the five HTML-significant characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + s.len() / 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

// =============================================================================
// PASSES
// =============================================================================

/// ```` ```lang\n...``` ```` → `<pre><code>...</code></pre>`.
fn fenced_code(buf: &str, stash: &mut Stash) -> String {
    let mut out = String::with_capacity(buf.len());
    let mut rest = buf;
    while let Some(open) = rest.find("```") {
        let after_open = &rest[open + 3..];
        let Some(close) = after_open.find("```") else {
            break;
        };
        out.push_str(&rest[..open]);
        let body = strip_fence_language(&after_open[..close]);
        let body = body.strip_suffix('\n').unwrap_or(body);
        out.push_str(&stash.push(format!("<pre><code>{body}</code></pre>")));
        rest = &after_open[close + 3..];
    }
    out.push_str(rest);
    out
}

/// Drop a language tag directly after the opening fence, plus its newline.
fn strip_fence_language(body: &str) -> &str {
    let tag_len = body
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+')))
        .unwrap_or(body.len());
    // A "tag" followed by more text on the same line is code, not a tag.
    body[tag_len..].strip_prefix('\n').unwrap_or(body)
}

/// `` `code` `` → `<code>code</code>`, never spanning lines.
fn inline_code(buf: &str, stash: &mut Stash) -> String {
    map_lines(buf, |line| {
        let mut out = String::with_capacity(line.len());
        let mut rest = line;
        while let Some(open) = rest.find('`') {
            let after_open = &rest[open + 1..];
            match after_open.find('`') {
                Some(close) if close > 0 => {
                    out.push_str(&rest[..open]);
                    out.push_str(&stash.push(format!("<code>{}</code>", &after_open[..close])));
                    rest = &after_open[close + 1..];
                }
                _ => {
                    out.push_str(&rest[..=open]);
                    rest = after_open;
                }
            }
        }
        out.push_str(rest);
        out
    })
}

/// `# `, `## `, `### ` at line start → `<h2>`, `<h3>`, `<h4>`.
fn headers(buf: &str, _stash: &mut Stash) -> String {
    map_lines(buf, |line| {
        let hashes = line.len() - line.trim_start_matches('#').len();
        match (hashes, line[hashes..].strip_prefix(' ')) {
            (1..=3, Some(title)) => {
                let level = hashes + 1;
                format!("<h{level}>{title}</h{level}>")
            }
            _ => line.to_string(),
        }
    })
}

/// `**text**` → `<strong>text</strong>`.
fn bold(buf: &str, _stash: &mut Stash) -> String {
    map_lines(buf, |line| {
        let mut out = String::with_capacity(line.len());
        let mut rest = line;
        while let Some(open) = rest.find("**") {
            let after_open = &rest[open + 2..];
            // Skip one char so the inner text is never empty.
            let Some(first) = after_open.chars().next() else {
                break;
            };
            let Some(close) = after_open[first.len_utf8()..].find("**") else {
                break;
            };
            let close = close + first.len_utf8();
            out.push_str(&rest[..open]);
            out.push_str("<strong>");
            out.push_str(&after_open[..close]);
            out.push_str("</strong>");
            rest = &after_open[close + 2..];
        }
        out.push_str(rest);
        out
    })
}

/// `*text*` → `<em>text</em>`, where neither asterisk touches another one.
fn italic(buf: &str, _stash: &mut Stash) -> String {
    map_lines(buf, |line| {
        let chars: Vec<char> = line.chars().collect();
        let lone_star = |i: usize| {
            chars[i] == '*'
                && (i == 0 || chars[i - 1] != '*')
                && chars.get(i + 1).is_none_or(|&c| c != '*')
        };

        let mut out = String::with_capacity(line.len());
        let mut i = 0;
        while i < chars.len() {
            if lone_star(i) {
                if let Some(end) = (i + 1..chars.len()).find(|&j| lone_star(j)) {
                    let inner: String = chars[i + 1..end].iter().collect();
                    if strong_balanced(&inner) {
                        out.push_str("<em>");
                        out.push_str(&inner);
                        out.push_str("</em>");
                        i = end + 1;
                        continue;
                    }
                }
            }
            out.push(chars[i]);
            i += 1;
        }
        out
    })
}

/// Whether every `<strong>` in `s` closes inside `s` and nothing closes
/// that was opened outside it.
fn strong_balanced(s: &str) -> bool {
    let mut depth = 0usize;
    let mut rest = s;
    while let Some(idx) = rest.find("<strong>").into_iter().chain(rest.find("</strong>")).min() {
        if rest[idx..].starts_with("</strong>") {
            let Some(d) = depth.checked_sub(1) else {
                return false;
            };
            depth = d;
            rest = &rest[idx + "</strong>".len()..];
        } else {
            depth += 1;
            rest = &rest[idx + "<strong>".len()..];
        }
    }
    depth == 0
}

/// `[label](url)` → anchor opening in a new context without an opener.
///
/// The label gets bold and italic on its own; the finished anchor is then
/// stashed whole. URLs with a scheme other than http, https, mailto or tel
/// render as the bare label.
fn links(buf: &str, stash: &mut Stash) -> String {
    map_lines(buf, |line| {
        let mut out = String::with_capacity(line.len());
        let mut rest = line;
        while let Some(open) = rest.find('[') {
            out.push_str(&rest[..open]);
            let candidate = &rest[open..];
            match parse_link(candidate) {
                Some((label, url, consumed)) => {
                    let bolded = bold(label, stash);
                    let label = italic(&bolded, stash);
                    let html = if is_allowed_url(url) {
                        format!("<a href=\"{url}\" target=\"_blank\" rel=\"noopener noreferrer\">{label}</a>")
                    } else {
                        label
                    };
                    out.push_str(&stash.push(html));
                    rest = &candidate[consumed..];
                }
                None => {
                    out.push('[');
                    rest = &candidate[1..];
                }
            }
        }
        out.push_str(rest);
        out
    })
}

/// Parse `[label](url)` at the start of `s`; returns label, url and bytes consumed.
fn parse_link(s: &str) -> Option<(&str, &str, usize)> {
    let label_end = s.find(']')?;
    let label = &s[1..label_end];
    if label.is_empty() || label.contains('[') {
        return None;
    }
    let after_label = s[label_end + 1..].strip_prefix('(')?;
    let url_end = after_label.find(')')?;
    let url = &after_label[..url_end];
    if url.is_empty() {
        return None;
    }
    Some((label, url, label_end + 2 + url_end + 1))
}

fn is_allowed_url(url: &str) -> bool {
    let scheme_end = url.find(|c: char| matches!(c, ':' | '/' | '?' | '#'));
    match scheme_end {
        Some(idx) if url[idx..].starts_with(':') => {
            let scheme = url[..idx].to_ascii_lowercase();
            matches!(scheme.as_str(), "http" | "https" | "mailto" | "tel")
        }
        _ => true,
    }
}

/// `- item` lines → `<li>`; each contiguous run shares one `<ul>`.
fn lists(buf: &str, _stash: &mut Stash) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut run: Option<String> = None;
    for line in buf.split('\n') {
        if let Some(item) = line.trim_start().strip_prefix("- ") {
            let list = run.get_or_insert_with(|| String::from("<ul>"));
            list.push_str("<li>");
            list.push_str(item);
            list.push_str("</li>");
        } else {
            if let Some(mut list) = run.take() {
                list.push_str("</ul>");
                lines.push(list);
            }
            lines.push(line.to_string());
        }
    }
    if let Some(mut list) = run.take() {
        list.push_str("</ul>");
        lines.push(list);
    }
    lines.join("\n")
}

/// A line that is exactly `---` → `<hr>`.
fn rules(buf: &str, _stash: &mut Stash) -> String {
    map_lines(buf, |line| if line.trim() == "---" { "<hr>".to_string() } else { line.to_string() })
}

fn line_breaks(buf: &str, _stash: &mut Stash) -> String {
    buf.replace('\n', "<br>")
}

fn restore(buf: &str, stash: &mut Stash) -> String {
    expand(buf, &stash.fragments, stash.fragments.len())
}

/// Replace placeholders below `limit` with their fragments. A fragment only
/// refers to fragments stashed before it (a link label holding inline code),
/// so each one is expanded with its own index as the limit.
fn expand(buf: &str, fragments: &[String], limit: usize) -> String {
    let mut out = String::with_capacity(buf.len());
    let mut parts = buf.split(PLACEHOLDER);
    if let Some(head) = parts.next() {
        out.push_str(head);
    }
    // Placeholders alternate: index, text, index, text...
    while let Some(index) = parts.next() {
        match index.parse::<usize>().ok().filter(|&i| i < limit) {
            Some(i) => out.push_str(&expand(&fragments[i], fragments, i)),
            None => out.push_str(index),
        }
        if let Some(text) = parts.next() {
            out.push_str(text);
        }
    }
    out
}

/// Drop a `<br>` that directly touches a block-level boundary.
fn cleanup(buf: &str, _stash: &mut Stash) -> String {
    let mut out = buf.to_string();
    for tag in BLOCK_BOUNDARIES {
        out = out.replace(&format!("<br>{tag}"), tag);
        out = out.replace(&format!("{tag}<br>"), tag);
    }
    out
}

// =============================================================================
// HELPERS
// =============================================================================

fn map_lines(buf: &str, mut f: impl FnMut(&str) -> String) -> String {
    buf.split('\n').map(&mut f).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
#[path = "format_test.rs"]
mod tests;
