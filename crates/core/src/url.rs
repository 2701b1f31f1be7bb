//! Public URL derivation for object keys

/// Replace every whitespace character of `key` with `%20`
///
/// Only whitespace is substituted; `/` and every other reserved character are kept.
pub fn encode_whitespace(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for c in key.chars() {
        if is_key_whitespace(c) {
            encoded.push_str("%20");
        } else {
            encoded.push(c);
        }
    }
    encoded
}

/// Whitespace in keys: Unicode `White_Space` without U+0085 (NEL), plus U+FEFF (BOM)
fn is_key_whitespace(c: char) -> bool {
    match c {
        '\u{85}' => false,
        '\u{feff}' => true,
        c => c.is_whitespace(),
    }
}

/// Public URL of `key` under `base`
///
/// No separator is inserted, so `base` must end with `/` when one is wanted.
pub fn public_url(base: &str, key: &str) -> String {
    format!("{}{}", base, encode_whitespace(key))
}
