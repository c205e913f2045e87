//! `key.properties` parsing
//!
//! The format is the one `java.util.Properties` reads: one `key=value` entry
//! per logical line, `#` or `!` comment lines, `:` or whitespace as
//! alternative separators, backslash line continuation and escapes.
//! Duplicate keys overwrite earlier ones.

use crate::error::{Result, SigningError};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;

const BOM: char = '\u{feff}';

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// Flat string key/value mapping loaded from a properties file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SigningProperties {
    entries: BTreeMap<String, String>,
}

impl SigningProperties {
    /// Parse properties text. Parsing never fails; unparseable escapes are
    /// kept as literal characters.
    pub fn parse(input: &str) -> Self {
        let input = input.strip_prefix(BOM).unwrap_or(input);

        let mut entries = BTreeMap::new();
        for line in logical_lines(input) {
            let (key, value) = split_entry(&line);
            entries.insert(key, value);
        }

        Self { entries }
    }

    /// Load a properties file.
    ///
    /// Returns `Ok(None)` when the file does not exist. Fails only when the
    /// file exists but cannot be read or is not valid UTF-8.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            // A file component in the parent chain also means "does not exist"
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                return Ok(None)
            }
            Err(source) => {
                return Err(SigningError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let text = String::from_utf8(bytes).map_err(|source| SigningError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Some(Self::parse(&text)))
    }

    /// Look up a value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries were parsed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SigningProperties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Join natural lines into logical lines, dropping comments and blanks.
/// Escapes are left in place for `split_entry`.
fn logical_lines(input: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending = String::new();
    let mut continuing = false;

    for raw in natural_lines(input) {
        let line = raw.trim_start_matches(is_blank);

        if !continuing && (line.is_empty() || line.starts_with(['#', '!'])) {
            continue;
        }

        if ends_with_continuation(line) {
            pending.push_str(&line[..line.len() - 1]);
            continuing = true;
        } else {
            pending.push_str(line);
            lines.push(std::mem::take(&mut pending));
            continuing = false;
        }
    }

    if continuing && !pending.is_empty() {
        lines.push(pending);
    }

    lines
}

/// Split on `\n`, `\r\n` or a lone `\r`
fn natural_lines(input: &str) -> impl Iterator<Item = &str> {
    input.split_terminator('\n').flat_map(|line| {
        line.strip_suffix('\r')
            .unwrap_or(line)
            .split_terminator('\r')
    })
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Split a logical line into an unescaped key and value
fn split_entry(line: &str) -> (String, String) {
    let chars: Vec<char> = line.chars().collect();

    let mut key_end = chars.len();
    let mut has_separator = false;
    let mut escaped = false;
    for (i, &c) in chars.iter().enumerate() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' {
            key_end = i;
            has_separator = true;
            break;
        } else if is_blank(c) {
            key_end = i;
            break;
        }
    }

    let mut pos = key_end;
    if has_separator {
        pos += 1;
    } else {
        while pos < chars.len() && is_blank(chars[pos]) {
            pos += 1;
        }
        if pos < chars.len() && (chars[pos] == '=' || chars[pos] == ':') {
            pos += 1;
        }
    }
    while pos < chars.len() && is_blank(chars[pos]) {
        pos += 1;
    }

    (unescape(&chars[..key_end]), unescape(&chars[pos..]))
}

fn unescape(chars: &[char]) -> String {
    let mut out = String::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some(&next) = chars.get(i) else {
            break;
        };
        i += 1;

        match next {
            't' => out.push('\t'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            'f' => out.push('\x0c'),
            'u' => match decode_unicode(&chars[i..]) {
                Some((decoded, consumed)) => {
                    out.push(decoded);
                    i += consumed;
                }
                None => {
                    tracing::warn!("Invalid \\u escape in properties file, keeping it literally");
                    out.push('u');
                }
            },
            other => out.push(other),
        }
    }

    out
}

/// Decode the hex digits following `\u`, combining a UTF-16 surrogate pair
/// when a second `\uXXXX` follows a high surrogate. Returns the character and
/// the number of chars consumed after the initial `u`.
fn decode_unicode(rest: &[char]) -> Option<(char, usize)> {
    let high = read_hex4(rest)?;

    if (0xD800..0xDC00).contains(&high) {
        if rest.len() >= 10 && rest[4] == '\\' && rest[5] == 'u' {
            if let Some(low) = read_hex4(&rest[6..]) {
                if (0xDC00..0xE000).contains(&low) {
                    let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    return char::from_u32(code).map(|c| (c, 10));
                }
            }
        }
        return None;
    }

    char::from_u32(high).map(|c| (c, 4))
}

fn read_hex4(chars: &[char]) -> Option<u32> {
    if chars.len() < 4 {
        return None;
    }
    chars[..4]
        .iter()
        .try_fold(0u32, |acc, c| c.to_digit(16).map(|d| acc * 16 + d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn test_basic_entries() {
        let props = SigningProperties::parse("keyAlias=foo\nstorePassword=bar\n");
        assert_eq!(props.get("keyAlias"), Some("foo"));
        assert_eq!(props.get("storePassword"), Some("bar"));
        assert_eq!(props.len(), 2);
    }

    #[test]
    fn test_last_duplicate_wins() {
        let props = SigningProperties::parse("keyAlias=a\nkeyAlias=b");
        assert_eq!(props.get("keyAlias"), Some("b"));
        assert_eq!(props.len(), 1);
    }

    #[test]
    fn test_comments_and_blanks() {
        let props = SigningProperties::parse("# signing\n\n   \n! legacy comment\n\t# indented\n");
        assert!(props.is_empty());
    }

    #[test]
    fn test_alternate_separators() {
        let props = SigningProperties::parse("a:1\nb 2\nc = 3\nd\t:\t4\n");
        assert_eq!(props.get("a"), Some("1"));
        assert_eq!(props.get("b"), Some("2"));
        assert_eq!(props.get("c"), Some("3"));
        assert_eq!(props.get("d"), Some("4"));
    }

    #[test]
    fn test_value_keeps_later_separators_and_trailing_space() {
        let props = SigningProperties::parse("storePassword=p=ss:word  \n");
        assert_eq!(props.get("storePassword"), Some("p=ss:word  "));
    }

    #[test]
    fn test_key_without_value() {
        let props = SigningProperties::parse("keyPassword\nkeyAlias=\n");
        assert_eq!(props.get("keyPassword"), Some(""));
        assert_eq!(props.get("keyAlias"), Some(""));
    }

    #[test]
    fn test_line_continuation() {
        let props =
            SigningProperties::parse("storeFile=/home/dev/\\\n    upload.jks\nkeyAlias=upload");
        assert_eq!(props.get("storeFile"), Some("/home/dev/upload.jks"));
        assert_eq!(props.get("keyAlias"), Some("upload"));
    }

    #[test]
    fn test_escaped_backslash_is_not_continuation() {
        let props = SigningProperties::parse("storeFile=C:\\\\keys\\\\\nkeyAlias=upload");
        assert_eq!(props.get("storeFile"), Some("C:\\keys\\"));
        assert_eq!(props.get("keyAlias"), Some("upload"));
    }

    #[test]
    fn test_comment_inside_continuation_is_value() {
        let props = SigningProperties::parse("keyPassword=abc\\\n#def");
        assert_eq!(props.get("keyPassword"), Some("abc#def"));
    }

    #[test]
    fn test_escapes() {
        let props = SigningProperties::parse("my\\ key=a\\tb\\=c\\u00e9\\q");
        assert_eq!(props.get("my key"), Some("a\tb=c\u{e9}q"));
    }

    #[test]
    fn test_surrogate_pair_escape() {
        let props = SigningProperties::parse("emoji=\\ud83d\\udd11");
        assert_eq!(props.get("emoji"), Some("\u{1f511}"));
    }

    #[test]
    fn test_invalid_unicode_escape_is_literal() {
        let props = SigningProperties::parse("alias=\\uZZ12");
        assert_eq!(props.get("alias"), Some("uZZ12"));
    }

    #[test]
    fn test_crlf_and_bom() {
        let props = SigningProperties::parse("\u{feff}keyAlias=foo\r\nkeyPassword=bar\r\n");
        assert_eq!(props.get("keyAlias"), Some("foo"));
        assert_eq!(props.get("keyPassword"), Some("bar"));
    }

    #[test]
    fn test_lone_cr_ends_line() {
        let props = SigningProperties::parse("keyAlias=foo\rstorePassword=bar\r");
        assert_eq!(props.get("keyAlias"), Some("foo"));
        assert_eq!(props.get("storePassword"), Some("bar"));
        assert_eq!(props.len(), 2);
    }

    #[test]
    fn test_mixed_line_endings() {
        let input = "# keys\rkeyAlias=foo\r\nstoreFile=a\\\r  b.jks\nkeyPassword=k";
        let props = SigningProperties::parse(input);
        assert_eq!(props.get("keyAlias"), Some("foo"));
        assert_eq!(props.get("storeFile"), Some("ab.jks"));
        assert_eq!(props.get("keyPassword"), Some("k"));
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let loaded = SigningProperties::load(&dir.path().join("key.properties")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_under_regular_file_is_none() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();

        let loaded = SigningProperties::load(&file.join("key.properties")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_invalid_utf8_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("key.properties");
        std::fs::write(&path, b"keyAlias=\xff\xfe\n").unwrap();

        let err = SigningProperties::load(&path).unwrap_err();
        assert!(matches!(err, SigningError::Malformed { .. }));
    }

    #[test]
    fn test_load_directory_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = SigningProperties::load(dir.path()).unwrap_err();
        assert!(matches!(err, SigningError::Io { .. }));
    }

    fn key_strategy() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9_.]{0,12}"
    }

    fn value_strategy() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_./-]{0,16}"
    }

    proptest! {
        #[test]
        fn prop_last_assignment_wins(
            key in key_strategy(),
            values in proptest::collection::vec(value_strategy(), 1..5),
        ) {
            let text: String = values.iter().map(|v| format!("{}={}\n", key, v)).collect();
            let props = SigningProperties::parse(&text);
            prop_assert_eq!(props.get(&key), values.last().map(String::as_str));
            prop_assert_eq!(props.len(), 1);
        }

        #[test]
        fn prop_parse_is_deterministic(text in "[ -~\n]{0,200}") {
            prop_assert_eq!(SigningProperties::parse(&text), SigningProperties::parse(&text));
        }

        #[test]
        fn prop_comment_lines_add_nothing(
            entries in proptest::collection::btree_map(key_strategy(), value_strategy(), 0..6),
            comment in "[ -~]{0,30}",
        ) {
            let mut text = String::new();
            for (k, v) in &entries {
                text.push_str(&format!("# {}\n{}={}\n\n", comment, k, v));
            }
            let props = SigningProperties::parse(&text);
            let expected: SigningProperties = entries.into_iter().collect();
            prop_assert_eq!(props, expected);
        }
    }
}
