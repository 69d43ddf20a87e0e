//! Identifier case conversion

/// Convert `snake_case` to `PascalCase`: `hello_world` becomes `HelloWorld`
pub fn to_camel_case(input: &str) -> String {
    input
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Convert `camelCase` or `PascalCase` to `snake_case`.
///
/// A word boundary sits before an uppercase letter that follows a lowercase
/// letter or digit, and before the last capital of an acronym run
/// (`HTTPServer` becomes `http_server`).
pub fn to_snake_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut result = String::with_capacity(input.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary && !result.ends_with('_') {
                result.push('_');
            }
        }
        result.extend(c.to_lowercase());
    }

    result
}
