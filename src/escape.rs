/// Escapes one captured line so it can be embedded safely: backslashes are
/// doubled and control characters become backslash escapes. Line feeds never
/// appear here because lines are split before escaping.
pub fn escape_line(line: &str) -> String {
    if !line.chars().any(|c| c == '\\' || c.is_control()) {
        return line.to_string();
    }

    let mut escaped = String::with_capacity(line.len() + 8);
    for c in line.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            c if c.is_control() => escaped.push_str(&format!("\\u{:04x}", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(escape_line("Hello, World!"), "Hello, World!");
    }

    #[test]
    fn test_tab_and_carriage_return() {
        assert_eq!(escape_line("a\tb\rc"), "a\\tb\\rc");
    }

    #[test]
    fn test_backslash_is_doubled() {
        assert_eq!(escape_line("C:\\temp"), "C:\\\\temp");
    }

    #[test]
    fn test_other_control_characters_become_hex_escapes() {
        assert_eq!(escape_line("bell\u{7}"), "bell\\u0007");
        assert_eq!(escape_line("\u{1b}[31m"), "\\u001b[31m");
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(escape_line(""), "");
    }
}
