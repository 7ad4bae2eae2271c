//! State of one top-level render.
//!
//! Rendering a fragment is a two-step affair:
//!
//! 1. **Preparation** walks the lines of the fragment. Block-level include
//!    lines and handled `:::name:::` directives become block placeholders
//!    (`<dfm-directive-N>` on a line of its own, surrounded by blank lines,
//!    which pulldown-cmark reads as an HTML block). Inline include tokens
//!    become inline placeholders. Fenced code is left alone. The tag prefix
//!    is picked per fragment so that it never occurs in the fragment's own
//!    text, and a fragment only expands the placeholders it registered.
//!
//! 2. **Rendering** feeds the prepared text through pulldown-cmark. When a
//!    placeholder event comes by, its job is expanded on the spot, which may
//!    render other fragments recursively. Expansion therefore happens in
//!    document order, so heading and image IDs are assigned, and diagnostics
//!    collected, in the order they appear in the final page.

use std::collections::HashMap;
use std::fmt::Write;
use std::ops::Range;

use dfm_storage::ContentReader;
use pulldown_cmark::{Event, Parser};

use crate::directive::{
    BlockDirective, DirectiveArgs, DirectiveContext, DirectiveLine, DirectiveOutput,
    parse_directive_line,
};
use crate::fence::FenceTracker;
use crate::html::{HtmlWriter, parser_options};
use crate::ids::UniqueIds;
use crate::inclusion::{
    DependencySet, FileContext, IncludeToken, ResolvedPath, find_inline_includes, is_external,
    normalize, parse_block_include, strip_front_matter,
};
use crate::util::escape_html;
use crate::{Diagnostic, DiagnosticKind, PathRewriter, RenderOutput, RendererOptions, SourceSpan};

const PLACEHOLDER_PREFIX: &str = "<dfm-directive-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IncludeLevel {
    Block,
    Inline,
}

/// Diagnostic held back until its placeholder is reached.
#[derive(Debug)]
struct Deferred {
    kind: DiagnosticKind,
    message: String,
    span: SourceSpan,
}

/// Work deferred until its placeholder is reached.
#[derive(Debug)]
enum Pending {
    Html(String),
    Report(Deferred),
    Include {
        token: IncludeToken,
        level: IncludeLevel,
        line: usize,
        /// Token as written, restored if the placeholder lands in code.
        source: String,
    },
    Wrap {
        open: String,
        body: String,
        close: String,
        first_line: usize,
        unclosed: Option<Deferred>,
    },
}

/// A fragment ready for pulldown-cmark, with the placeholders it owns.
struct Prepared {
    text: String,
    /// Placeholder tag prefix, absent from the fragment's source.
    marker: String,
    ids: Range<usize>,
    /// Whether a placeholder read as an HTML block may expand as blocks.
    block: bool,
}

pub(crate) struct RenderSession<'r> {
    options: &'r RendererOptions,
    reader: &'r dyn ContentReader,
    handlers: Vec<Box<dyn BlockDirective>>,
    files: FileContext,
    ids: UniqueIds,
    dependencies: DependencySet,
    diagnostics: Vec<Diagnostic>,
    pending: HashMap<usize, Pending>,
    next_placeholder: usize,
}

impl<'r> RenderSession<'r> {
    pub(crate) fn new(
        options: &'r RendererOptions,
        reader: &'r dyn ContentReader,
        handlers: Vec<Box<dyn BlockDirective>>,
    ) -> Self {
        Self {
            options,
            reader,
            handlers,
            files: FileContext::new(),
            ids: UniqueIds::new(),
            dependencies: DependencySet::new(),
            diagnostics: Vec::new(),
            pending: HashMap::new(),
            next_placeholder: 0,
        }
    }

    pub(crate) fn render(mut self, file: &str, markdown: &str) -> RenderOutput {
        self.files.enter(normalize(file));
        let html = self.render_blocks(markdown, 1);
        self.files.leave();

        RenderOutput {
            html,
            dependencies: self.dependencies,
            diagnostics: self.diagnostics,
        }
    }

    /// Render a fragment as block content. `first_line` is the line number
    /// of the fragment's first line within the current file.
    fn render_blocks(&mut self, markdown: &str, first_line: usize) -> String {
        let prepared = self.prepare_blocks(markdown, first_line);
        self.render_prepared(&prepared)
    }

    /// Render a fragment as inline content.
    ///
    /// Non-blank lines are trimmed and concatenated, and anything that would
    /// start a block is escaped, so the fragment can only contribute inline
    /// markup to the surrounding paragraph.
    fn render_inline(&mut self, markdown: &str) -> String {
        let flattened = escape_block_start(&flatten_inline(markdown));
        let marker = placeholder_marker(&flattened);
        let start = self.next_placeholder;
        let mut text = String::with_capacity(flattened.len() + 1);
        self.push_inline_line(&flattened, 1, &marker, &mut text);

        let prepared = Prepared {
            text,
            marker,
            ids: start..self.next_placeholder,
            block: false,
        };
        let html = self.render_prepared(&prepared);
        strip_paragraph(html.trim_end()).to_owned()
    }

    fn prepare_blocks(&mut self, markdown: &str, first_line: usize) -> Prepared {
        let marker = placeholder_marker(markdown);
        let start = self.next_placeholder;
        let lines: Vec<&str> = markdown.lines().collect();
        let mut out = String::with_capacity(markdown.len() + 64);
        let mut fence = FenceTracker::new();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];
            let line_no = first_line + i;

            if fence.update(line) || fence.in_fence() {
                out.push_str(line);
                out.push('\n');
                i += 1;
                continue;
            }

            let quote = quote_prefix_len(line);
            if let Some(mut token) = parse_block_include(&line[quote..]) {
                token.span = token.span.start + quote..token.span.end + quote;
                let prefix = &line[..token.span.start];
                let source = line[token.span.clone()].to_owned();
                let id = self.register(Pending::Include {
                    token,
                    level: IncludeLevel::Block,
                    line: line_no,
                    source,
                });
                push_block_placeholder(&mut out, prefix, &marker, id);
                i += 1;
                continue;
            }

            if let Some(next) = self.prepare_directive(&lines, i, line_no, &marker, &mut out) {
                i = next;
                continue;
            }

            self.push_inline_line(line, line_no, &marker, &mut out);
            i += 1;
        }

        Prepared {
            text: out,
            marker,
            ids: start..self.next_placeholder,
            block: true,
        }
    }

    /// Handle a `:::name:::` opening line at `lines[i]`.
    ///
    /// Returns the index of the next unconsumed line, or `None` if the line
    /// is not a handled directive.
    fn prepare_directive(
        &mut self,
        lines: &[&str],
        i: usize,
        line_no: usize,
        marker: &str,
        out: &mut String,
    ) -> Option<usize> {
        let line = lines[i];
        let Some(DirectiveLine::Open {
            name,
            args,
            trailing,
        }) = parse_directive_line(line)
        else {
            return None;
        };
        let index = self.handlers.iter().position(|h| h.name() == name)?;

        let has_body = self.handlers[index].has_body(&args);
        let closing = if has_body {
            self.find_closing(lines, i + 1, name)
        } else {
            None
        };

        let rewriter = self.rewriter();
        let output = {
            let mut ctx = DirectiveContext::new(
                &self.files,
                line_no,
                closing.is_some(),
                trailing,
                &rewriter,
                &mut self.ids,
            );
            self.handlers[index].process(&args, &mut ctx)
        };

        let indent_len = line.len() - line.trim_start().len();
        let indent = &line[..indent_len];
        let span = SourceSpan::new(line_no, indent_len, line.trim_end().len());
        let after_marker = closing.map_or(i + 1, |end| end + 1);

        match output {
            DirectiveOutput::Skip => None,
            DirectiveOutput::Html(html) => {
                let id = self.register(Pending::Html(html));
                push_block_placeholder(out, indent, marker, id);
                Some(after_marker)
            }
            DirectiveOutput::Invalid { kind, message } => {
                let id = self.register(Pending::Report(Deferred {
                    kind,
                    message,
                    span,
                }));
                push_block_placeholder(out, indent, marker, id);
                Some(after_marker)
            }
            DirectiveOutput::Wrap { open, close } => {
                let (body_end, unclosed) = match closing {
                    Some(end) => (end, None),
                    None if has_body => {
                        let unclosed = Deferred {
                            kind: DiagnosticKind::UnclosedDirective,
                            message: format!(
                                ":::{name}::: has no matching :::{name}-end:::, \
                                 closed at the end of the content"
                            ),
                            span,
                        };
                        (lines.len(), Some(unclosed))
                    }
                    None => (i + 1, None),
                };
                let id = self.register(Pending::Wrap {
                    open,
                    body: dedent(&lines[i + 1..body_end]),
                    close,
                    first_line: line_no + 1,
                    unclosed,
                });
                push_block_placeholder(out, indent, marker, id);
                Some(closing.map_or(body_end, |end| end + 1))
            }
        }
    }

    /// Find the `:::name-end:::` line closing a directive opened just before
    /// `lines[start]`, skipping nested directives of the same name and fenced
    /// code.
    fn find_closing(&self, lines: &[&str], start: usize, name: &str) -> Option<usize> {
        let mut fence = FenceTracker::new();
        let mut depth = 0usize;

        for (offset, line) in lines[start..].iter().enumerate() {
            if fence.update(line) || fence.in_fence() {
                continue;
            }
            match parse_directive_line(line) {
                Some(DirectiveLine::End { name: end }) if end == name => {
                    if depth == 0 {
                        return Some(start + offset);
                    }
                    depth -= 1;
                }
                Some(DirectiveLine::Open { name: open, args, .. })
                    if open == name && self.takes_body(name, &args) =>
                {
                    depth += 1;
                }
                _ => {}
            }
        }

        None
    }

    fn takes_body(&self, name: &str, args: &DirectiveArgs) -> bool {
        self.handlers
            .iter()
            .find(|h| h.name() == name)
            .is_some_and(|h| h.has_body(args))
    }

    /// Copy a line to `out`, replacing inline include tokens with placeholders.
    fn push_inline_line(&mut self, line: &str, line_no: usize, marker: &str, out: &mut String) {
        let mut last = 0;
        for token in find_inline_includes(line) {
            let (start, end) = (token.span.start, token.span.end);
            out.push_str(&line[last..start]);
            let id = self.register(Pending::Include {
                token,
                level: IncludeLevel::Inline,
                line: line_no,
                source: line[start..end].to_owned(),
            });
            let _ = write!(out, "{marker}{id}>");
            last = end;
        }
        out.push_str(&line[last..]);
        out.push('\n');
    }

    fn register(&mut self, pending: Pending) -> usize {
        let id = self.next_placeholder;
        self.next_placeholder += 1;
        self.pending.insert(id, pending);
        id
    }

    fn render_prepared(&mut self, prepared: &Prepared) -> String {
        let mut writer = HtmlWriter::new(self.rewriter());
        let marker = prepared.marker.as_str();

        for event in Parser::new_ext(&prepared.text, parser_options(self.options.gfm)) {
            match &event {
                Event::Html(html) | Event::InlineHtml(html) if html.contains(marker) => {
                    let is_block = matches!(event, Event::Html(_));
                    match self.expand_placeholder(html, prepared, is_block) {
                        Some(expanded) if is_block => writer.raw_html(&as_block(&expanded)),
                        Some(expanded) => writer.raw_html(&expanded),
                        // Swallowed by a raw HTML block
                        None => writer.raw_html(&self.restore_sources(html, marker)),
                    }
                    continue;
                }
                Event::Text(text) if text.contains(marker) => {
                    let restored = self.restore_sources(text, marker);
                    writer.text(&restored);
                    continue;
                }
                _ => {}
            }
            writer.process_event(event, &mut self.ids);
        }

        writer.finish()
    }

    /// Expand `html` if it is exactly one placeholder owned by `prepared`.
    ///
    /// An inline include that pulldown-cmark reads as a whole HTML block sits
    /// alone in its container (a list item, say) and expands as blocks.
    fn expand_placeholder(
        &mut self,
        html: &str,
        prepared: &Prepared,
        is_block: bool,
    ) -> Option<String> {
        let id = placeholder_id(html, &prepared.marker).filter(|id| prepared.ids.contains(id))?;
        let mut pending = self.pending.remove(&id)?;
        if is_block
            && prepared.block
            && let Pending::Include { level, .. } = &mut pending
        {
            *level = IncludeLevel::Block;
        }
        Some(self.expand(pending))
    }

    fn expand(&mut self, pending: Pending) -> String {
        match pending {
            Pending::Html(html) => html,
            Pending::Report(deferred) => {
                self.report(deferred.kind, deferred.message, deferred.span);
                String::new()
            }
            Pending::Include {
                token, level, line, ..
            } => self.expand_include(&token, level, line),
            Pending::Wrap {
                open,
                body,
                close,
                first_line,
                unclosed,
            } => {
                if let Some(deferred) = unclosed {
                    self.report(deferred.kind, deferred.message, deferred.span);
                }
                let body_html = self.render_blocks(&body, first_line);
                format!("{open}\n{body_html}{close}")
            }
        }
    }

    /// Replace placeholders that ended up inside code with their source text.
    fn restore_sources(&self, text: &str, marker: &str) -> String {
        let mut restored = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(start) = rest.find(marker) {
            restored.push_str(&rest[..start]);
            let candidate = &rest[start..];
            let source = candidate.find('>').and_then(|end| {
                let id = placeholder_id(&candidate[..=end], marker)?;
                match self.pending.get(&id) {
                    Some(Pending::Include { source, .. }) => Some((source.as_str(), end + 1)),
                    _ => None,
                }
            });
            match source {
                Some((source, consumed)) => {
                    restored.push_str(source);
                    rest = &candidate[consumed..];
                }
                None => {
                    restored.push_str(&candidate[..marker.len()]);
                    rest = &candidate[marker.len()..];
                }
            }
        }

        restored.push_str(rest);
        restored
    }

    /// Resolve, load and render one include token.
    ///
    /// Every failure renders the token literally and collects a diagnostic.
    fn expand_include(&mut self, token: &IncludeToken, level: IncludeLevel, line: usize) -> String {
        let literal = escape_html(&token.literal());
        if is_external(&token.raw_path) {
            return literal;
        }

        let current = self.files.current_file().unwrap_or_default().to_owned();
        let resolved = ResolvedPath::resolve(&token.raw_path, &current);
        let span = SourceSpan::new(line, token.span.start, token.span.end);

        if self.files.is_active(&resolved.path) {
            self.report_cycle(&resolved.display, span);
            return literal;
        }

        if self.files.depth() >= self.options.max_include_depth {
            self.report(
                DiagnosticKind::DepthExceeded,
                format!(
                    "including {} exceeds the maximum include depth of {}",
                    resolved.display, self.options.max_include_depth
                ),
                span,
            );
            return literal;
        }

        let loaded = match self.reader.read(&resolved.path, &current, true) {
            Ok(loaded) => loaded,
            Err(err) => {
                self.report(
                    DiagnosticKind::FileNotFound,
                    format!("cannot include {}: {err}", resolved.display),
                    span,
                );
                return literal;
            }
        };

        let identifier = match normalize(&loaded.identifier) {
            identifier if identifier.is_empty() => resolved.path,
            identifier => identifier,
        };
        if self.files.is_active(&identifier) {
            self.report_cycle(&resolved.display, span);
            return literal;
        }

        tracing::debug!(path = %identifier, from = %current, "Including file");
        self.dependencies.insert(identifier.clone());

        let body = strip_front_matter(&loaded.content);
        let skipped = &loaded.content[..loaded.content.len() - body.len()];
        let first_line = 1 + skipped.matches('\n').count();

        self.files.enter(identifier);
        let html = match level {
            IncludeLevel::Block => self.render_blocks(body, first_line),
            IncludeLevel::Inline => self.render_inline(body),
        };
        self.files.leave();

        html
    }

    fn report_cycle(&mut self, display: &str, span: SourceSpan) {
        let chain = self
            .files
            .frames()
            .iter()
            .map(|frame| frame.file_path.as_str())
            .collect::<Vec<_>>()
            .join(" -> ");
        self.report(
            DiagnosticKind::CircularReference,
            format!("{display} is already being included ({chain})"),
            span,
        );
    }

    fn report(&mut self, kind: DiagnosticKind, message: String, span: SourceSpan) {
        let source_file = self.files.current_file().unwrap_or_default().to_owned();
        tracing::warn!(kind = %kind, file = %source_file, line = span.line, "{message}");
        self.diagnostics.push(Diagnostic {
            kind,
            message,
            source_file,
            span,
        });
    }

    /// Rewriter for content of the current file rendered into the root file.
    fn rewriter(&self) -> PathRewriter {
        PathRewriter::new(
            self.files.current_file().unwrap_or_default(),
            self.files.root_file().unwrap_or_default(),
        )
    }
}

/// Append a placeholder that pulldown-cmark reads as its own HTML block.
///
/// `prefix` is the indentation or block quote markers the placeholder line
/// keeps; the blank lines around it carry the quote markers too.
fn push_block_placeholder(out: &mut String, prefix: &str, marker: &str, id: usize) {
    let blank = prefix.trim_end();
    if !out.is_empty() && !out.ends_with("\n\n") {
        out.push_str(blank);
        out.push('\n');
    }
    let _ = write!(out, "{prefix}{marker}{id}>\n{blank}\n");
}

/// Placeholder tag prefix that does not occur in `source`.
fn placeholder_marker(source: &str) -> String {
    let mut marker = PLACEHOLDER_PREFIX.to_owned();
    let mut attempt = 0usize;
    while source.contains(&marker) {
        attempt += 1;
        marker = format!("{}{attempt}-", PLACEHOLDER_PREFIX.trim_end_matches('-'));
    }
    marker
}

fn placeholder_id(html: &str, marker: &str) -> Option<usize> {
    html.trim()
        .strip_prefix(marker)?
        .strip_suffix('>')?
        .parse()
        .ok()
}

/// Byte length of the block quote markers (`>`, `> > `) opening `line`.
fn quote_prefix_len(line: &str) -> usize {
    let bytes = line.as_bytes();
    let mut end = 0;
    loop {
        let mut i = end;
        while i < end + 3 && bytes.get(i) == Some(&b' ') {
            i += 1;
        }
        if bytes.get(i) != Some(&b'>') {
            return end;
        }
        i += 1;
        if bytes.get(i) == Some(&b' ') {
            i += 1;
        }
        end = i;
    }
}

/// Block expansions end with exactly one newline, or are empty.
fn as_block(html: &str) -> String {
    let trimmed = html.trim_end_matches('\n');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    }
}

/// Remove the indentation shared by all non-blank lines.
fn dedent(lines: &[&str]) -> String {
    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    let mut body = String::new();
    for line in lines {
        body.push_str(line.get(indent..).unwrap_or_default());
        body.push('\n');
    }
    body
}

fn flatten_inline(markdown: &str) -> String {
    markdown
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Backslash-escape whatever would make a single line parse as a block
/// other than a paragraph.
fn escape_block_start(text: &str) -> String {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let second = chars.next();

    let needs_escape = match first {
        '#' | '>' => true,
        '-' | '+' | '*' => second.is_none_or(char::is_whitespace) || is_thematic_break(text),
        '_' => is_thematic_break(text),
        '`' | '~' => text.starts_with("```") || text.starts_with("~~~"),
        _ => false,
    };
    if needs_escape {
        return format!("\\{text}");
    }

    // Ordered list item: up to nine digits, then `.` or `)`
    let digits = text.find(|c: char| !c.is_ascii_digit()).unwrap_or(text.len());
    if (1..=9).contains(&digits) {
        let rest = &text[digits..];
        if rest.starts_with(['.', ')']) && rest[1..].chars().next().is_none_or(char::is_whitespace)
        {
            return format!("{}\\{rest}", &text[..digits]);
        }
    }

    text.to_owned()
}

fn is_thematic_break(text: &str) -> bool {
    let mut marks = text.chars().filter(|c| !c.is_whitespace());
    let Some(mark) = marks.next() else {
        return false;
    };
    matches!(mark, '-' | '*' | '_') && marks.clone().all(|c| c == mark) && marks.count() >= 2
}

/// Strip the `<p>` wrapper a single-line fragment renders into.
fn strip_paragraph(html: &str) -> &str {
    html.strip_prefix("<p>")
        .and_then(|inner| inner.strip_suffix("</p>"))
        .filter(|inner| !inner.contains("<p>"))
        .unwrap_or(html)
}
