//! `${name}` placeholder expansion

use std::collections::HashMap;

/// Name of the synthetic row-position variable
pub const INDEX_KEY: &str = "index";

/// Replace every `${key}` whose key is present in `values`.
///
/// Unknown placeholders are left verbatim. Substituted text is not
/// expanded again.
pub fn expand(template: &str, values: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match values.get(key) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 1]),
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

/// Keep only the digits of a user-entered date (`2024-01-15` → `20240115`)
pub fn normalize_date(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}
