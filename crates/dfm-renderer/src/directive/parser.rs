//! Directive line parsing.
//!
//! Parses `:::name attrs:::` opening lines and `:::name-end:::` closing lines.

use super::DirectiveArgs;

/// A line that opens or closes a triple-colon directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DirectiveLine<'a> {
    /// `:::name attrs:::trailing`
    Open {
        name: &'a str,
        args: DirectiveArgs,
        /// Text after the closing colons, trimmed.
        trailing: &'a str,
    },
    /// `:::name-end:::`
    End { name: &'a str },
}

/// Parse a directive line.
///
/// Returns `None` if the line is not a directive. Up to three spaces of
/// indentation are allowed, as for other block constructs.
pub(crate) fn parse_directive_line(line: &str) -> Option<DirectiveLine<'_>> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }

    let rest = line[indent..].strip_prefix(":::")?;
    let name_len = rest
        .find(|c: char| !is_name_char(c))
        .unwrap_or(rest.len());
    let name = &rest[..name_len];
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }

    let after_name = &rest[name_len..];
    let close = after_name.find(":::")?;
    let attrs = &after_name[..close];
    let trailing = after_name[close + 3..].trim();

    if let Some(base) = name.strip_suffix("-end")
        && !base.is_empty()
        && attrs.trim().is_empty()
        && trailing.is_empty()
    {
        return Some(DirectiveLine::End { name: base });
    }

    // Attributes must be separated from the name.
    if !attrs.is_empty() && !attrs.starts_with(char::is_whitespace) {
        return None;
    }

    Some(DirectiveLine::Open {
        name,
        args: DirectiveArgs::parse(attrs),
        trailing,
    })
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_open_with_attributes() {
        let line = r#":::image type="content" source="example.jpg" alt-text="example":::"#;

        match parse_directive_line(line).unwrap() {
            DirectiveLine::Open {
                name,
                args,
                trailing,
            } => {
                assert_eq!(name, "image");
                assert_eq!(args.get("source"), Some("example.jpg"));
                assert_eq!(trailing, "");
            }
            DirectiveLine::End { .. } => panic!("expected open"),
        }
    }

    #[test]
    fn test_open_without_attributes() {
        assert_eq!(
            parse_directive_line(":::row:::"),
            Some(DirectiveLine::Open {
                name: "row",
                args: DirectiveArgs::default(),
                trailing: "",
            })
        );
    }

    #[test]
    fn test_trailing_text_kept() {
        let line = r#":::image type="complex" source="a.jpg":::Lorem Ipsum"#;

        match parse_directive_line(line).unwrap() {
            DirectiveLine::Open { trailing, .. } => assert_eq!(trailing, "Lorem Ipsum"),
            DirectiveLine::End { .. } => panic!("expected open"),
        }
    }

    #[test]
    fn test_trailing_whitespace_ignored() {
        let line = r#":::image type="complex" source="a.jpg":::   "#;

        match parse_directive_line(line).unwrap() {
            DirectiveLine::Open { trailing, .. } => assert_eq!(trailing, ""),
            DirectiveLine::End { .. } => panic!("expected open"),
        }
    }

    #[test]
    fn test_end_marker() {
        assert_eq!(
            parse_directive_line(":::image-end:::"),
            Some(DirectiveLine::End { name: "image" })
        );
        assert_eq!(
            parse_directive_line("  :::column-end:::  "),
            Some(DirectiveLine::End { name: "column" })
        );
    }

    #[test]
    fn test_not_directive() {
        assert!(parse_directive_line("regular text").is_none());
        assert!(parse_directive_line(":::").is_none());
        assert!(parse_directive_line(":::image without close").is_none());
        assert!(parse_directive_line(":::9lives:::").is_none());
        assert!(parse_directive_line("    :::row:::").is_none());
        assert!(parse_directive_line(":::image@x:::").is_none());
    }

    #[test]
    fn test_bare_end_suffix_is_open() {
        assert!(matches!(
            parse_directive_line(":::-end:::"),
            None | Some(DirectiveLine::Open { .. })
        ));
        assert!(matches!(
            parse_directive_line(r#":::image-end source="x":::"#),
            Some(DirectiveLine::Open { name: "image-end", .. })
        ));
    }
}
