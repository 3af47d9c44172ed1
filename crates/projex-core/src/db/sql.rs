//! Literal escaping for hand-built SQL text.
//!
//! Query builders interpolate values directly, since the query text itself
//! is the extension point deployments override.

/// Escape `input` for use inside a single-quoted SQL string. With
/// `esc_like`, `%`, `_` and `[` are also escaped with a backslash for use
/// in a `LIKE ... ESCAPE '\'` pattern.
#[must_use]
pub fn sanitize_sql(input: &str, esc_like: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\'' => out.push_str("''"),
            '\\' if esc_like => out.push_str("\\\\"),
            '%' | '_' | '[' if esc_like => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Render `input` as an SQL literal: `NULL` for blank input, a bare number
/// for numeric input, otherwise a quoted string.
#[must_use]
pub fn sql_literal(input: &str, esc_like: bool) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return "NULL".to_string();
    }
    if trimmed.parse::<i64>().is_ok() {
        return trimmed.to_string();
    }
    if trimmed.parse::<f64>().is_ok_and(f64::is_finite) {
        return trimmed.to_string();
    }
    format!("'{}'", sanitize_sql(input, esc_like))
}

/// Comma-separated list of quoted literals for an `IN (...)` clause.
#[must_use]
pub fn quoted_list<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    values
        .into_iter()
        .map(|value| format!("'{}'", sanitize_sql(value, false)))
        .collect::<Vec<_>>()
        .join(", ")
}
