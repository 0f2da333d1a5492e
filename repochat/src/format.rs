use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref CODE_BLOCK_RE: Regex = Regex::new(r"```(\w+)?\n([\s\S]*?)```").unwrap();
    static ref BOLD_RE: Regex = Regex::new(r"\*\*(.*?)\*\*").unwrap();
    static ref ITALIC_RE: Regex = Regex::new(r"\*(.*?)\*").unwrap();
    static ref STRIKE_RE: Regex = Regex::new(r"~~(.*?)~~").unwrap();
}

const DEFAULT_LANGUAGE: &str = "javascript";

/// Renders a bot reply as HTML.
///
/// Fenced code blocks become Prism-ready `<pre>` elements, and `**bold**`, `*italic*`
/// and `~~struck~~` spans are converted in the surrounding prose. Everything else is
/// escaped, so the result is safe to inject into the page.
#[must_use]
pub fn format_message(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut html = String::with_capacity(text.len());
    let mut last = 0;

    for captures in CODE_BLOCK_RE.captures_iter(text) {
        let Some(block) = captures.get(0) else {
            continue;
        };

        html.push_str(&format_prose(&text[last..block.start()]));
        html.push_str(&format_code(&captures));
        last = block.end();
    }

    html.push_str(&format_prose(&text[last..]));

    html
}

fn format_code(captures: &Captures) -> String {
    let language = captures
        .get(1)
        .map_or(DEFAULT_LANGUAGE, |m| m.as_str())
        .to_lowercase();
    let code = captures.get(2).map_or("", |m| m.as_str()).trim();

    format!(
        "<pre class=\"language-{language}\"><code class=\"language-{language}\">{}</code></pre>",
        escape_html(code)
    )
}

fn format_prose(text: &str) -> String {
    let html = escape_html(text);
    let html = BOLD_RE.replace_all(&html, "<strong>$1</strong>");
    let html = ITALIC_RE.replace_all(&html, "<em>$1</em>");

    STRIKE_RE.replace_all(&html, "<del>$1</del>").into_owned()
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }

    escaped
}

/// The repository name shown for a namespace, e.g. `axum` for `https://github.com/tokio-rs/axum`.
#[must_use]
pub fn repo_name(namespace: &str) -> &str {
    namespace.rsplit('/').next().unwrap_or_default()
}
