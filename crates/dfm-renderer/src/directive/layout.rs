//! `:::row:::` and `:::column:::` layout directives.

use super::{BlockDirective, DirectiveArgs, DirectiveContext, DirectiveOutput};
use crate::util::escape_html;

/// `:::row:::` ... `:::row-end:::`
#[derive(Debug, Default, Clone, Copy)]
pub struct RowDirective;

impl BlockDirective for RowDirective {
    fn name(&self) -> &str {
        "row"
    }

    fn process(&mut self, _args: &DirectiveArgs, _ctx: &mut DirectiveContext<'_>) -> DirectiveOutput {
        DirectiveOutput::wrap(r#"<section class="row">"#, "</section>")
    }
}

/// `:::column span="N":::` ... `:::column-end:::`
#[derive(Debug, Default, Clone, Copy)]
pub struct ColumnDirective;

impl BlockDirective for ColumnDirective {
    fn name(&self) -> &str {
        "column"
    }

    fn process(&mut self, args: &DirectiveArgs, _ctx: &mut DirectiveContext<'_>) -> DirectiveOutput {
        let open = match args.get_non_empty("span") {
            Some(span) => format!(r#"<div class="column span{}">"#, escape_html(span.trim())),
            None => r#"<div class="column">"#.to_owned(),
        };
        DirectiveOutput::wrap(open, "</div>")
    }
}
