//! Sequential naming of uploaded files.
//!
//! A user-supplied base name such as `holiday7` is split into a prefix (`holiday`) and a start
//! index (`7`). Uploaded files are then named `holiday7`, `holiday8`, ... in upload order,
//! optionally keeping each file's own extension.

use crate::constants::DEFAULT_START_INDEX;

/// Prefix and start index derived from a base name.
///
/// The start index is kept as canonical decimal digits so that any digit run, however long,
/// numbers correctly. Computed once per request and never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePolicy {
    prefix: String,
    start_index: String,
}

impl NamePolicy {
    /// Derives the policy from a raw base name; see [`parse_base_and_start`].
    pub fn from_base_name(base_name: &str) -> Self {
        let (prefix, start_index) = parse_base_and_start(base_name);
        Self {
            prefix,
            start_index,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Start index as decimal digits without leading zeros.
    pub fn start_index(&self) -> &str {
        &self.start_index
    }

    /// Output names for `files`, in the same order.
    pub fn generate_names<S: AsRef<str>>(&self, files: &[S], keep_extension: bool) -> Vec<String> {
        generate_names(&self.prefix, &self.start_index, files, keep_extension)
    }
}

/// Splits a base name into `(prefix, start_index)`.
///
/// Surrounding whitespace is trimmed first. A trailing run of ASCII digits becomes the start index
/// and everything before it the prefix (possibly empty). Without trailing digits the whole
/// trimmed string is the prefix and the start index is `"1"`.
///
/// The start index is returned as decimal digits with leading zeros removed (`"007"` gives
/// `"7"`, `"000"` gives `"0"`). Digit runs of any length are accepted. Only ASCII `0-9` count as
/// digits; other Unicode decimal digits such as `٣` stay in the prefix.
///
/// Never fails.
pub fn parse_base_and_start(base_name: &str) -> (String, String) {
    let trimmed = base_name.trim();
    let prefix = trimmed.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &trimmed[prefix.len()..];

    if digits.is_empty() {
        return (trimmed.to_owned(), DEFAULT_START_INDEX.to_owned());
    }

    let significant = digits.trim_start_matches('0');
    let start = if significant.is_empty() { "0" } else { significant };
    (prefix.to_owned(), start.to_owned())
}

/// Builds `prefix + (start_index + i) + extension` for every file in order.
///
/// `start_index` must be ASCII decimal digits, as produced by [`parse_base_and_start`]. The
/// extension (see [`file_extension`]) is appended only when `keep_extension` is true.
pub fn generate_names<S: AsRef<str>>(
    prefix: &str,
    start_index: &str,
    files: &[S],
    keep_extension: bool,
) -> Vec<String> {
    files
        .iter()
        .enumerate()
        .map(|(offset, file_name)| {
            let number = add_decimal(start_index, offset);
            let extension = if keep_extension {
                file_extension(file_name.as_ref())
            } else {
                ""
            };
            format!("{prefix}{number}{extension}")
        })
        .collect()
}

/// `digits + offset` in decimal, for digit strings of any length.
fn add_decimal(digits: &str, offset: usize) -> String {
    // Least significant digit first.
    let mut out: Vec<u8> = digits.bytes().rev().map(|b| b - b'0').collect();
    let mut carry = offset;
    let mut pos = 0;

    while carry > 0 {
        if pos == out.len() {
            out.push(0);
        }
        let sum = usize::from(out[pos]) + carry;
        out[pos] = (sum % 10) as u8;
        carry = sum / 10;
        pos += 1;
    }

    let text: String = out.iter().rev().map(|d| char::from(b'0' + d)).collect();
    match text.trim_start_matches('0') {
        "" => "0".to_owned(),
        significant => significant.to_owned(),
    }
}

/// Extension of the last path component, including the leading `.`.
///
/// Leading dots do not start an extension (`.bashrc` has none) and only the final dot counts
/// (`clip.tar.gz` gives `.gz`). Returns `""` when there is no extension.
pub fn file_extension(file_name: &str) -> &str {
    let base_start = file_name.rfind(['/', '\\']).map_or(0, |i| i + 1);
    let base = &file_name[base_start..];

    match base.rfind('.') {
        Some(dot) if base[..dot].bytes().any(|b| b != b'.') => &base[dot..],
        _ => "",
    }
}
