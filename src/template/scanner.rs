//! Scanner for `{{ ... }}` expression markers

/// Byte range in markup text
pub type Span = std::ops::Range<usize>;

/// Marker delimiters
pub const OPEN: &str = "{{";
pub const CLOSE: &str = "}}";

/// One expression region found in a markup string
///
/// `span` covers the delimiters; `raw` is the trimmed expression text
/// between them. Markers are regenerated on every scan pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub span: Span,
    pub raw: String,
}

/// Find all markers in `markup`, earliest-first and non-overlapping
///
/// An opener with no closer anywhere ahead is skipped and stays literal
/// text. The first `}}` after an opener always terminates the marker, so a
/// marker cannot itself contain a literal `}}` (for instance inside a string
/// literal); there is no escape syntax. The truncated remainder then
/// typically surfaces as a parse error for that marker. An empty marker
/// (`{{}}` or `{{ }}`) scans to empty expression text, which the parser
/// rejects, so it too surfaces as an accumulated error rather than empty
/// output.
pub fn scan(markup: &str) -> Vec<Marker> {
    let mut markers = Vec::new();
    let mut pos = 0;

    while let Some(open_offset) = markup[pos..].find(OPEN) {
        let open = pos + open_offset;
        let body_start = open + OPEN.len();

        match markup[body_start..].find(CLOSE) {
            Some(close_offset) => {
                let close = body_start + close_offset;
                let end = close + CLOSE.len();
                markers.push(Marker {
                    span: open..end,
                    raw: collapse_whitespace(&markup[body_start..close]),
                });
                pos = end;
            }
            // Unclosed opener: skip it, leave it as literal text
            None => pos = body_start,
        }
    }

    markers
}

/// Trim the expression and collapse each newline plus its following
/// whitespace run into a single space
fn collapse_whitespace(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' {
            while chars.peek().is_some_and(|next| next.is_whitespace()) {
                chars.next();
            }
            out.push(' ');
        } else {
            out.push(c);
        }
    }

    out.trim().to_string()
}
