//! Small text helpers shared by the components.

use unicode_segmentation::UnicodeSegmentation;

/// Marker placed between the kept ends of a trimmed address.
pub const ELLIPSIS: &str = "…";

/// Keep `size` leading and trailing graphemes of `address` around an
/// ellipsis. Addresses too short to gain anything are returned unchanged.
pub fn trim_address(address: &str, size: usize) -> String {
    let graphemes: Vec<&str> = address.graphemes(true).collect();
    if graphemes.len() <= size.saturating_mul(2).saturating_add(1) {
        return address.to_string();
    }
    let head: String = graphemes[..size].concat();
    let tail: String = graphemes[graphemes.len() - size..].concat();
    format!("{head}{ELLIPSIS}{tail}")
}

/// Strip the common leading indentation from a multi-line string.
///
/// The first line is ignored when computing the indent if it has none of its
/// own (text right after an opening quote). Blank lines never count.
pub fn unindent(input: &str) -> String {
    let lines: Vec<&str> = input.split('\n').collect();
    if lines.len() <= 1 {
        return input.to_string();
    }

    let offset = if lines[0].starts_with(char::is_whitespace) { 0 } else { 1 };
    let min_indent = lines[offset..]
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| {
            let strip = min_indent.min(line.len() - line.trim_start().len());
            &line[strip..]
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `close-all` -> `CloseAll`.
pub fn kebab_to_pascal(name: &str) -> String {
    name.split(['-', '_'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Render CSS custom properties as an inline `style` value.
///
/// ```ignore
/// assert_eq!(css_vars([("i", 2)]), "--i: 2");
/// ```
pub fn css_vars<K, V, I>(vars: I) -> String
where
    K: AsRef<str>,
    V: std::fmt::Display,
    I: IntoIterator<Item = (K, V)>,
{
    vars.into_iter()
        .map(|(name, value)| {
            let name = name.as_ref();
            let name = name.strip_prefix("--").unwrap_or(name);
            format!("--{name}: {value}")
        })
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_address() {
        let addr = "neutron1jqz2205er0d8657ugll98c462cyplkcqmjthzv";
        assert_eq!(trim_address(addr, 6), "neutro…mjthzv");
        assert_eq!(trim_address(addr, 3), "neu…hzv");
        assert_eq!(trim_address("short", 6), "short");
        assert_eq!(trim_address("abcdefghijklm", 6), "abcdefghijklm");
    }

    #[test]
    fn test_trim_address_graphemes() {
        let addr = "é".repeat(20);
        let trimmed = trim_address(&addr, 2);
        assert_eq!(trimmed, format!("éé{ELLIPSIS}éé"));
    }

    #[test]
    fn test_trim_address_huge_size() {
        let addr = "neutron1jqz2205er0d8657ugll98c462cyplkcqmjthzv";
        assert_eq!(trim_address(addr, usize::MAX), addr);
        assert_eq!(trim_address(addr, usize::MAX / 2), addr);
    }

    #[test]
    fn test_unindent() {
        let text = "first\n    a\n      b\n\n    c";
        assert_eq!(unindent(text), "first\na\n  b\n\nc");

        let indented = "  x\n    y";
        assert_eq!(unindent(indented), "x\n  y");
        assert_eq!(unindent("single"), "single");
    }

    #[test]
    fn test_kebab_to_pascal() {
        assert_eq!(kebab_to_pascal("close"), "Close");
        assert_eq!(kebab_to_pascal("close-all"), "CloseAll");
        assert_eq!(kebab_to_pascal("is-logged-in"), "IsLoggedIn");
        assert_eq!(kebab_to_pascal(""), "");
    }

    #[test]
    fn test_css_vars() {
        assert_eq!(css_vars([("i", 2)]), "--i: 2");
        assert_eq!(css_vars([("--a", "1px"), ("b", "red")]), "--a: 1px; --b: red");
    }
}
