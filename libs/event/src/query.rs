//! `application/x-www-form-urlencoded` parsing shared by query strings and form bodies.

use url::form_urlencoded;

/// Decodes every `key=value` pair in order.
///
/// Percent escapes are decoded and `+` becomes a space. A segment without `=` yields an
/// empty value and empty segments (`a=1&&b=2`, trailing `&`) are skipped.
pub fn parse_pairs(raw: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(raw.as_bytes()).into_owned().collect()
}

/// Value of the last occurrence of `name`.
pub fn last_value(raw: &str, name: &str) -> Option<String> {
    form_urlencoded::parse(raw.as_bytes())
        .filter(|(key, _)| key == name)
        .last()
        .map(|(_, value)| value.into_owned())
}

/// Every value recorded for `name`, in order of appearance.
pub fn all_values(raw: &str, name: &str) -> Vec<String> {
    form_urlencoded::parse(raw.as_bytes())
        .filter(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .collect()
}
