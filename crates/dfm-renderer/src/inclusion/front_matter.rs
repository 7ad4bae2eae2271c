//! Front matter stripping.

/// Strip a leading YAML front matter block (`---` ... `---` or `...`).
///
/// Content without a complete block is returned unchanged.
#[must_use]
pub fn strip_front_matter(content: &str) -> &str {
    let body = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut lines = body.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return content;
    };
    if first.trim_end() != "---" {
        return content;
    }

    let mut offset = first.len();
    for line in lines {
        offset += line.len();
        let marker = line.trim_end();
        if marker == "---" || marker == "..." {
            return &body[offset..];
        }
    }

    content
}
