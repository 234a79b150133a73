//! Download filename sanitisation.
//!
//! Mirrors the behaviour of werkzeug's `secure_filename`, which the original upload forms were
//! built against, so download names stay the same for the same input.

/// Reserved device names that Windows refuses to use as file stems.
const WINDOWS_DEVICE_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "LPT1", "LPT2", "LPT3",
];

/// Reduces `name` to a flat ASCII file name.
///
/// The result contains only `A-Z a-z 0-9 _ . -`, never contains a path separator and never
/// starts or ends with `.` or `_`. It may be empty; callers choose their own fallback.
pub fn secure_filename(name: &str) -> String {
    let ascii: String = name
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    let filtered: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    let stripped = filtered.trim_matches(|c| c == '.' || c == '_');

    let stem = stripped.split('.').next().unwrap_or_default();
    if !stripped.is_empty()
        && WINDOWS_DEVICE_NAMES
            .iter()
            .any(|device| device.eq_ignore_ascii_case(stem))
    {
        return format!("_{stripped}");
    }

    stripped.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_unchanged() {
        assert_eq!(secure_filename("holiday"), "holiday");
        assert_eq!(secure_filename("clip-01.v2"), "clip-01.v2");
    }

    #[test]
    fn test_path_traversal_flattened() {
        assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("..\\windows\\system32"), "windows_system32");
    }

    #[test]
    fn test_whitespace_joined_with_underscores() {
        assert_eq!(secure_filename("My cool   movie"), "My_cool_movie");
    }

    #[test]
    fn test_header_breaking_characters_removed() {
        assert_eq!(secure_filename("a\"b;c\r\nd"), "abc_d");
    }

    #[test]
    fn test_non_ascii_dropped() {
        assert_eq!(secure_filename("café"), "caf");
        assert_eq!(secure_filename("日本"), "");
    }

    #[test]
    fn test_windows_device_names_prefixed() {
        assert_eq!(secure_filename("con"), "_con");
        assert_eq!(secure_filename("NUL.txt"), "_NUL.txt");
        assert_eq!(secure_filename("console"), "console");
    }

    #[test]
    fn test_leading_dots_and_underscores_stripped() {
        assert_eq!(secure_filename("._hidden_"), "hidden");
        assert_eq!(secure_filename("..."), "");
    }
}
