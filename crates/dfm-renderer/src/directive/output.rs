//! Directive output types.

use crate::DiagnosticKind;

/// Output from a block directive handler.
///
/// # Example
///
/// ```
/// use dfm_renderer::directive::DirectiveOutput;
///
/// let output = DirectiveOutput::html(r#"<img role="presentation" src="a.png">"#);
/// assert!(matches!(output, DirectiveOutput::Html(_)));
///
/// let output = DirectiveOutput::wrap(r#"<section class="row">"#, "</section>");
/// assert!(matches!(output, DirectiveOutput::Wrap { .. }));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DirectiveOutput {
    /// Markup that replaces the directive line.
    ///
    /// If the directive was given a body, the body is dropped.
    Html(String),
    /// Markup placed around the rendered body.
    ///
    /// The body between the opening line and `:::name-end:::` is rendered as
    /// ordinary block content and placed between `open` and `close`.
    Wrap { open: String, close: String },
    /// Not handled; the line passes through unchanged.
    Skip,
    /// The directive is malformed.
    ///
    /// Nothing is rendered for it (body included) and a diagnostic of `kind`
    /// is collected.
    Invalid {
        kind: DiagnosticKind,
        message: String,
    },
}

impl DirectiveOutput {
    #[must_use]
    pub fn html(s: impl Into<String>) -> Self {
        Self::Html(s.into())
    }

    #[must_use]
    pub fn wrap(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self::Wrap {
            open: open.into(),
            close: close.into(),
        }
    }

    #[must_use]
    pub fn invalid(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::Invalid {
            kind,
            message: message.into(),
        }
    }
}
