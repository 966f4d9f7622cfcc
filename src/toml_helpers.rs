// Helpers for turning toml parser errors into RuleError values.

use crate::error::RuleError;

/// Look for patterns like "line N column M" in parser error messages and
/// return (line, column) when found.
#[must_use]
pub fn extract_line_col_from_msg(msg: &str) -> Option<(usize, usize)> {
    let after = &msg[msg.find("line ")? + 5..];
    let line = leading_number(after)?;
    let after2 = &after[after.find("column ")? + 7..];
    let col = leading_number(after2)?;
    Some((line, col))
}

fn leading_number(s: &str) -> Option<usize> {
    let digits: String = s.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Build a `RuleError::Parse` from a toml deserialization error.
///
/// toml 0.9 reports positions as a byte span rather than in the message, so
/// the span is converted against `src` when the message carries none.
pub fn parse_error(src: &str, e: &toml::de::Error) -> RuleError {
    let message = e.message().trim().to_string();
    let line_col = extract_line_col_from_msg(&e.to_string())
        .or_else(|| e.span().map(|span| line_col_at(src, span.start)));
    RuleError::Parse { line_col, message }
}

/// 1-based line and column of byte offset `pos` in `src`.
#[must_use]
pub fn line_col_at(src: &str, pos: usize) -> (usize, usize) {
    let head = &src[..pos.min(src.len())];
    let line = head.matches('\n').count() + 1;
    let col = head.rfind('\n').map_or(head.len(), |nl| head.len() - nl - 1) + 1;
    (line, col)
}
