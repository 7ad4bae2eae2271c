//! Include token scanning.
//!
//! Recognizes `[!include[title](path "optional title")]`. The keyword is
//! case-insensitive and may be followed by whitespace before `[`.

use std::ops::Range;

/// A parsed include directive occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeToken {
    /// Link text between the inner brackets (may be empty).
    pub title: String,
    /// Path as written, with backslash escapes removed.
    pub raw_path: String,
    /// Byte range of the whole token within its line.
    pub span: Range<usize>,
}

impl IncludeToken {
    /// Canonical source form, used when the token renders literally.
    #[must_use]
    pub fn literal(&self) -> String {
        format!("[!include[{}]({})]", self.title, self.raw_path)
    }
}

/// Parse a line that consists of exactly one include token.
///
/// Up to three spaces of indentation and trailing whitespace are allowed.
#[must_use]
pub fn parse_block_include(line: &str) -> Option<IncludeToken> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }

    let token = parse_token_at(line, indent)?;
    line[token.span.end..]
        .trim()
        .is_empty()
        .then_some(token)
}

/// Find every unescaped include token in a line.
///
/// Backslash-escaped tokens (`\[!include...`) and tokens inside code spans
/// are skipped.
#[must_use]
pub fn find_inline_includes(line: &str) -> Vec<IncludeToken> {
    let bytes = line.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => i = skip_code_span(line, i),
            b'[' => {
                if let Some(token) = parse_token_at(line, i) {
                    i = token.span.end;
                    tokens.push(token);
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }

    tokens
}

/// Return the index just past a code span starting at `start`, or past the
/// opening backticks if the span is never closed.
fn skip_code_span(line: &str, start: usize) -> usize {
    let run = line[start..].bytes().take_while(|&b| b == b'`').count();
    let after_open = start + run;

    let mut i = after_open;
    while let Some(offset) = line[i..].find('`') {
        let pos = i + offset;
        let len = line[pos..].bytes().take_while(|&b| b == b'`').count();
        if len == run {
            return pos + len;
        }
        i = pos + len;
    }

    after_open
}

fn parse_token_at(line: &str, start: usize) -> Option<IncludeToken> {
    let mut cursor = Cursor::new(line, start);

    cursor.eat('[').then_some(())?;
    cursor.eat('!').then_some(())?;
    cursor.eat_keyword("include").then_some(())?;
    cursor.skip_whitespace();
    cursor.eat('[').then_some(())?;
    let title = cursor.take_until(']')?;
    cursor.eat(']').then_some(())?;
    cursor.eat('(').then_some(())?;
    cursor.skip_whitespace();
    let raw_path = cursor.destination()?;
    cursor.skip_whitespace();
    if cursor.link_title().is_some() {
        cursor.skip_whitespace();
    }
    cursor.eat(')').then_some(())?;
    cursor.eat(']').then_some(())?;

    if raw_path.is_empty() {
        return None;
    }

    Some(IncludeToken {
        title: title.to_owned(),
        raw_path,
        span: start..cursor.pos,
    })
}

/// Byte cursor over a single line.
struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str, pos: usize) -> Self {
        Self { text, pos }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let matches = self
            .rest()
            .get(..keyword.len())
            .is_some_and(|s| s.eq_ignore_ascii_case(keyword));
        if matches {
            self.pos += keyword.len();
        }
        matches
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c == ' ' || c == '\t') {
            self.pos += 1;
        }
    }

    fn take_until(&mut self, end: char) -> Option<&'a str> {
        let len = self.rest().find(end)?;
        let taken = &self.rest()[..len];
        self.pos += len;
        Some(taken)
    }

    /// Link destination: `<...>` or a run with balanced parentheses.
    fn destination(&mut self) -> Option<String> {
        if self.eat('<') {
            let raw = self.take_until('>')?;
            self.pos += 1;
            return Some(unescape(raw));
        }

        let mut path = String::new();
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            match c {
                '\\' => {
                    self.pos += 1;
                    match self.peek() {
                        Some(next) if next.is_ascii_punctuation() => {
                            path.push(next);
                            self.pos += 1;
                        }
                        _ => path.push('\\'),
                    }
                    continue;
                }
                '(' => depth += 1,
                ')' if depth == 0 => break,
                ')' => depth -= 1,
                c if c.is_whitespace() => break,
                _ => {}
            }
            path.push(c);
            self.pos += c.len_utf8();
        }

        (depth == 0).then_some(path)
    }

    /// Optional link title: `"..."`, `'...'` or `(...)`. Ignored by callers.
    fn link_title(&mut self) -> Option<&'a str> {
        let close = match self.peek()? {
            '"' => '"',
            '\'' => '\'',
            '(' => ')',
            _ => return None,
        };
        let saved = self.pos;
        self.bump();
        let start = self.pos;
        while let Some(c) = self.bump() {
            if c == '\\' {
                self.bump();
            } else if c == close {
                return Some(&self.text[start..self.pos - close.len_utf8()]);
            }
        }
        self.pos = saved;
        None
    }
}

fn unescape(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\'
            && let Some(&next) = chars.peek()
            && next.is_ascii_punctuation()
        {
            result.push(next);
            chars.next();
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn paths(line: &str) -> Vec<String> {
        find_inline_includes(line)
            .into_iter()
            .map(|token| token.raw_path)
            .collect()
    }

    #[test]
    fn test_block_include() {
        let token = parse_block_include("[!include[refa](a.md)]").unwrap();

        assert_eq!(token.title, "refa");
        assert_eq!(token.raw_path, "a.md");
        assert_eq!(token.span, 0..22);
    }

    #[test]
    fn test_block_include_indent_and_trailing_space() {
        assert!(parse_block_include("   [!include[a](a.md)]  ").is_some());
        assert!(parse_block_include("    [!include[a](a.md)]").is_none());
    }

    #[test]
    fn test_block_include_requires_whole_line() {
        assert!(parse_block_include("[!include[a](a.md)].").is_none());
        assert!(parse_block_include("Text [!include[a](a.md)]").is_none());
    }

    #[test]
    fn test_space_before_closing_bracket_is_not_token() {
        assert!(parse_block_include("[!include[refa](a.md) ]").is_none());
        assert!(find_inline_includes("x [!include[refb](b.md) ]").is_empty());
    }

    #[test]
    fn test_keyword_case_and_space() {
        let token = parse_block_include("[!INCLUDE [azure-ps-prerequisites-include.md](inc3.md)]")
            .unwrap();

        assert_eq!(token.title, "azure-ps-prerequisites-include.md");
        assert_eq!(token.raw_path, "inc3.md");
    }

    #[test]
    fn test_empty_title() {
        let token = parse_block_include("[!include[](b/token.md)]").unwrap();

        assert_eq!(token.title, "");
        assert_eq!(token.raw_path, "b/token.md");
    }

    #[test]
    fn test_link_title_ignored() {
        let token = parse_block_include(r#"[!include[refc](a/refc.md "This is root")]"#).unwrap();

        assert_eq!(token.raw_path, "a/refc.md");
        assert_eq!(token.literal(), "[!include[refc](a/refc.md)]");
    }

    #[test]
    fn test_escaped_parentheses_in_path() {
        let token = parse_block_include(r"[!include[refa](a\(x\).md)]").unwrap();

        assert_eq!(token.raw_path, "a(x).md");
    }

    #[test]
    fn test_balanced_parentheses_in_path() {
        let token = parse_block_include("[!include[a](a(x).md)]").unwrap();

        assert_eq!(token.raw_path, "a(x).md");
    }

    #[test]
    fn test_angle_bracket_destination() {
        let token = parse_block_include("[!include[a](<my file.md>)]").unwrap();

        assert_eq!(token.raw_path, "my file.md");
    }

    #[test]
    fn test_empty_path_rejected() {
        assert!(parse_block_include("[!include[a]()]").is_none());
    }

    #[test]
    fn test_inline_tokens_with_spans() {
        let line = "Inline [!include[ref1](ref1.md) ] and [!include[ref3](ref3.md)].";
        let tokens = find_inline_includes(line);

        assert_eq!(tokens.len(), 1);
        assert_eq!(&line[tokens[0].span.clone()], "[!include[ref3](ref3.md)]");
    }

    #[test]
    fn test_escaped_token_skipped() {
        assert!(paths(r"Escaped: \[!include[refa](~/r/a.md)].").is_empty());
    }

    #[test]
    fn test_escaped_backslash_then_token() {
        assert_eq!(paths(r"Inline: \\[!include[refa](~/r/a.md)]."), vec!["~/r/a.md"]);
    }

    #[test]
    fn test_code_span_skipped() {
        assert!(paths("Use `[!include[a](a.md)]` to include.").is_empty());
        assert_eq!(paths("`` ` `` [!include[a](a.md)]"), vec!["a.md"]);
    }

    #[test]
    fn test_unclosed_code_span_is_literal_backticks() {
        assert_eq!(paths("``x [!include[a](a.md)]"), vec!["a.md"]);
    }

    #[test]
    fn test_multiple_tokens() {
        assert_eq!(
            paths("[!include[a](a.md)] [!include[b](b.md)]"),
            vec!["a.md", "b.md"]
        );
    }

    #[test]
    fn test_title_never_spans_bracket() {
        assert_eq!(
            paths("[!INCLUDE [x](inc2.md)] [Resource Manager model](inc1.md)."),
            vec!["inc2.md"]
        );
    }
}
