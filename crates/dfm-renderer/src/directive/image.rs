//! `:::image:::` directive.
//!
//! ```text
//! :::image type="content" source="example.jpg" alt-text="example":::
//! :::image type="icon" source="example.svg":::
//! :::image type="complex" source="chart.png" alt-text="Sales chart":::
//! Long description, rendered as block content.
//! :::image-end:::
//! ```

use std::fmt::Write;

use super::{BlockDirective, DirectiveArgs, DirectiveContext, DirectiveOutput};
use crate::DiagnosticKind;
use crate::util::escape_html;

/// Image variant selected by the `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageType {
    Content,
    Icon,
    Complex,
}

impl ImageType {
    fn parse(value: Option<&str>) -> Option<Self> {
        match value.map(str::trim) {
            None | Some("" | "content") => Some(Self::Content),
            Some("icon") => Some(Self::Icon),
            Some("complex") => Some(Self::Complex),
            Some(_) => None,
        }
    }
}

/// Handler for the `image` directive.
///
/// `complex` images carry a long description between the opening line and
/// `:::image-end:::`. It is rendered into a visually hidden block referenced
/// by `aria-describedby`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageDirective;

impl ImageDirective {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl BlockDirective for ImageDirective {
    fn name(&self) -> &str {
        "image"
    }

    fn has_body(&self, args: &DirectiveArgs) -> bool {
        ImageType::parse(args.get("type")) == Some(ImageType::Complex)
    }

    fn process(&mut self, args: &DirectiveArgs, ctx: &mut DirectiveContext<'_>) -> DirectiveOutput {
        let Some(image_type) = ImageType::parse(args.get("type")) else {
            let value = args.get("type").unwrap_or_default();
            return DirectiveOutput::invalid(
                DiagnosticKind::InvalidImage,
                format!("unknown image type \"{value}\""),
            );
        };
        let Some(source) = args.get_non_empty("source") else {
            return DirectiveOutput::invalid(
                DiagnosticKind::InvalidImage,
                "image directive requires a source",
            );
        };

        let src = escape_html(&ctx.rewrite_url(source));
        let alt = args.get("alt-text");

        match image_type {
            ImageType::Icon => {
                DirectiveOutput::html(format!(r#"<img role="presentation" src="{src}">"#))
            }
            ImageType::Content => {
                let mut html = format!(r#"<img src="{src}""#);
                if let Some(alt) = alt {
                    let _ = write!(html, r#" alt="{}""#, escape_html(alt));
                }
                html.push('>');
                DirectiveOutput::Html(html)
            }
            ImageType::Complex => complex_image(&src, source, alt, ctx),
        }
    }
}

fn complex_image(
    src: &str,
    source: &str,
    alt: Option<&str>,
    ctx: &mut DirectiveContext<'_>,
) -> DirectiveOutput {
    if !ctx.has_closing_marker() {
        return DirectiveOutput::invalid(
            DiagnosticKind::InvalidImage,
            "complex image requires a closing :::image-end::: marker",
        );
    }
    if !ctx.trailing_text().is_empty() {
        return DirectiveOutput::invalid(
            DiagnosticKind::InvalidImage,
            "unexpected text after the opening image marker",
        );
    }

    let alt = alt.unwrap_or_default();
    let seed = format!("{}:{}:{source}:{alt}", ctx.current_file(), ctx.line());
    let id = ctx.unique_id(&seed);
    let alt = escape_html(alt);

    DirectiveOutput::wrap(
        format!(
            "<img src=\"{src}\" alt=\"{alt}\" aria-describedby=\"{id}\">\n\
             <div id=\"{id}\" class=\"visually-hidden\">"
        ),
        "</div>",
    )
}
