//! Directive attribute parsing.
//!
//! Parses the attribute list of `:::name key="value" flag:::`.

use std::collections::HashMap;

/// Attributes of a directive line.
///
/// Values may be double-quoted, single-quoted or bare. A bare word without
/// `=` is stored as a flag with an empty value. Unknown attributes are kept
/// so handlers can read whatever they need.
///
/// # Example
///
/// ```
/// use dfm_renderer::directive::DirectiveArgs;
///
/// let args = DirectiveArgs::parse(r#"type="content" source='a.png' span=2 lightbox"#);
/// assert_eq!(args.get("type"), Some("content"));
/// assert_eq!(args.get("source"), Some("a.png"));
/// assert_eq!(args.get("span"), Some("2"));
/// assert!(args.has("lightbox"));
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DirectiveArgs {
    /// Key-value attributes.
    pub attrs: HashMap<String, String>,
}

impl DirectiveArgs {
    /// Parse an attribute string.
    #[must_use]
    pub fn parse(attrs_str: &str) -> Self {
        let mut args = Self::default();
        let mut remaining = attrs_str.trim();

        while !remaining.is_empty() {
            let key_len = remaining
                .find(|c: char| !is_key_char(c))
                .unwrap_or(remaining.len());

            if key_len == 0 {
                // Skip unrecognized character
                let skip = remaining.chars().next().map_or(1, char::len_utf8);
                remaining = remaining[skip..].trim_start();
                continue;
            }

            let key = &remaining[..key_len];
            let after_key = &remaining[key_len..];

            if let Some(after_eq) = after_key.strip_prefix('=') {
                let (value, rest) = parse_value(after_eq);
                args.attrs.insert(key.to_owned(), value.to_owned());
                remaining = rest.trim_start();
            } else {
                args.attrs.insert(key.to_owned(), String::new());
                remaining = after_key.trim_start();
            }
        }

        args
    }

    /// Get an attribute value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Get a non-empty attribute value by key.
    #[must_use]
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.is_empty())
    }

    /// Whether an attribute or flag is present.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.attrs.contains_key(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Parse a value after `=`: `"value"`, `'value'` or `value`.
///
/// An unterminated quote takes the rest of the string.
fn parse_value(s: &str) -> (&str, &str) {
    for quote in ['"', '\''] {
        if let Some(stripped) = s.strip_prefix(quote) {
            return match stripped.find(quote) {
                Some(end) => (&stripped[..end], &stripped[end + 1..]),
                None => (stripped, ""),
            };
        }
    }

    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    (&s[..end], &s[end..])
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_empty_args() {
        let args = DirectiveArgs::parse("");
        assert!(args.is_empty());
    }

    #[test]
    fn test_image_attributes() {
        let args =
            DirectiveArgs::parse(r#"type="content" source="example.jpg" alt-text="example""#);

        assert_eq!(args.get("type"), Some("content"));
        assert_eq!(args.get("source"), Some("example.jpg"));
        assert_eq!(args.get("alt-text"), Some("example"));
    }

    #[test]
    fn test_single_quoted_value() {
        let args = DirectiveArgs::parse("alt-text='Hello World'");
        assert_eq!(args.get("alt-text"), Some("Hello World"));
    }

    #[test]
    fn test_unquoted_value() {
        let args = DirectiveArgs::parse("span=6 id=x");
        assert_eq!(args.get("span"), Some("6"));
        assert_eq!(args.get("id"), Some("x"));
    }

    #[test]
    fn test_flag_without_value() {
        let args = DirectiveArgs::parse(r#"lightbox source="a.png""#);

        assert!(args.has("lightbox"));
        assert_eq!(args.get("lightbox"), Some(""));
        assert_eq!(args.get_non_empty("lightbox"), None);
        assert_eq!(args.get("source"), Some("a.png"));
    }

    #[test]
    fn test_empty_quoted_value() {
        let args = DirectiveArgs::parse(r#"alt-text="""#);
        assert_eq!(args.get("alt-text"), Some(""));
    }

    #[test]
    fn test_unterminated_quote_takes_rest() {
        let args = DirectiveArgs::parse(r#"alt-text="broken value"#);
        assert_eq!(args.get("alt-text"), Some("broken value"));
    }

    #[test]
    fn test_garbage_is_skipped() {
        let args = DirectiveArgs::parse(r#"@@ type="icon" ,"#);

        assert_eq!(args.get("type"), Some("icon"));
        assert_eq!(args.attrs.len(), 1);
    }

    #[test]
    fn test_later_duplicate_wins() {
        let args = DirectiveArgs::parse("type=icon type=content");
        assert_eq!(args.get("type"), Some("content"));
    }
}
