//! `&`-style color markup.

/// Section sign that introduces a resolved formatting code.
pub const COLOR_CHAR: char = '§';

fn is_code(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), '0'..='9' | 'a'..='f' | 'k'..='o' | 'r' | 'x')
}

/// Resolve `&x` codes into `§x`. A `&` not followed by a code stays literal.
pub fn colorful(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match chars.peek() {
            Some(&next) if c == '&' && is_code(next) => {
                out.push(COLOR_CHAR);
                out.push(next.to_ascii_lowercase());
                chars.next();
            },
            _ => out.push(c),
        }
    }
    out
}

/// Remove both resolved (`§x`) and unresolved (`&x`) codes.
pub fn strip_colors(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match chars.peek() {
            Some(&next) if (c == '&' || c == COLOR_CHAR) && is_code(next) => {
                chars.next();
            },
            _ => out.push(c),
        }
    }
    out
}
