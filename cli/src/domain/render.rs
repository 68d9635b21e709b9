//! Caddyfile rendering: template parsing and substitution.
//!
//! Pure functions only. The default template is compiled in; callers may
//! supply their own through [`render_with`].
//!
//! # Template syntax
//!
//! - `{{ name }}`: substitute a value (`hostname`)
//! - `{{#if flag}}` … `{{/if}}`: keep the body only when `flag` is set
//! - `{{#if !flag}}` … `{{/if}}`: keep the body only when `flag` is unset
//!
//! Section tags alone on a line consume that whole line, so they never leave
//! blank lines behind. Caddy's own single-brace placeholders (`{host}`,
//! `{$ENV}`) pass through untouched.

use sha2::{Digest, Sha256};

use crate::domain::config::DesiredConfig;
use crate::domain::error::{RenderError, TemplateError};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

const MAX_HOSTNAME_LEN: usize = 253;

/// The Caddyfile template shipped with the operator.
pub const DEFAULT_TEMPLATE: &str = include_str!("../../templates/Caddyfile.tmpl");

/// A parsed template fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Value(String),
    Section {
        flag: String,
        negated: bool,
        body: Vec<Node>,
    },
}

enum Tag {
    Value(String),
    Open { flag: String, negated: bool },
    Close,
}

impl Tag {
    fn parse(inner: &str) -> Result<Self, TemplateError> {
        if inner == "/if" {
            return Ok(Self::Close);
        }
        if let Some(rest) = inner.strip_prefix("#if ") {
            let rest = rest.trim();
            let (flag, negated) = match rest.strip_prefix('!') {
                Some(f) => (f.trim(), true),
                None => (rest, false),
            };
            if is_identifier(flag) {
                return Ok(Self::Open {
                    flag: flag.to_string(),
                    negated,
                });
            }
            return Err(TemplateError::Malformed(inner.to_string()));
        }
        if is_identifier(inner) {
            return Ok(Self::Value(inner.to_string()));
        }
        Err(TemplateError::Malformed(inner.to_string()))
    }

    fn is_block(&self) -> bool {
        !matches!(self, Self::Value(_))
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse template text into a node tree.
///
/// # Errors
///
/// Returns an error for unclosed or malformed tags and unbalanced sections.
pub fn parse(template: &str) -> Result<Vec<Node>, TemplateError> {
    let mut stack: Vec<(String, bool, Vec<Node>)> = Vec::new();
    let mut current: Vec<Node> = Vec::new();
    let mut offset = 0;

    while let Some(rel_start) = template[offset..].find(OPEN) {
        let start = offset + rel_start;
        let inner_start = start + OPEN.len();
        let Some(rel_end) = template[inner_start..].find(CLOSE) else {
            return Err(TemplateError::Unclosed(start));
        };
        let inner_end = inner_start + rel_end;
        let tag = Tag::parse(template[inner_start..inner_end].trim())?;

        let mut text_end = start;
        let mut next = inner_end + CLOSE.len();
        if tag.is_block()
            && let Some((line_start, line_end)) = standalone_line(template, offset, start, next)
        {
            text_end = line_start;
            next = line_end;
        }
        push_text(&mut current, &template[offset..text_end]);

        match tag {
            Tag::Value(name) => current.push(Node::Value(name)),
            Tag::Open { flag, negated } => {
                stack.push((flag, negated, std::mem::take(&mut current)));
            }
            Tag::Close => {
                let Some((flag, negated, parent)) = stack.pop() else {
                    return Err(TemplateError::UnmatchedEnd(start));
                };
                let body = std::mem::replace(&mut current, parent);
                current.push(Node::Section {
                    flag,
                    negated,
                    body,
                });
            }
        }
        offset = next;
    }
    push_text(&mut current, &template[offset..]);

    if let Some((flag, _, _)) = stack.pop() {
        return Err(TemplateError::UnclosedSection(flag));
    }
    Ok(current)
}

/// If the tag spanning `start..end` is the only thing on its line, return the
/// byte range of the whole line including its newline. `floor` is the end of
/// the previous tag; a line shared with an earlier tag is never standalone.
fn standalone_line(template: &str, floor: usize, start: usize, end: usize) -> Option<(usize, usize)> {
    let line_start = template[..start].rfind('\n').map_or(0, |i| i + 1);
    if line_start < floor {
        return None;
    }
    if !template[line_start..start].chars().all(|c| c == ' ' || c == '\t') {
        return None;
    }
    let rest = &template[end..];
    let line_len = rest.find('\n').map_or(rest.len(), |i| i + 1);
    if !rest[..line_len].trim().is_empty() {
        return None;
    }
    Some((line_start, end + line_len))
}

fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if !text.is_empty() {
        nodes.push(Node::Text(text.to_string()));
    }
}

// ── Context ──────────────────────────────────────────────────────────────────

/// Values and flags a template may reference.
struct Context<'a> {
    cfg: &'a DesiredConfig,
}

impl Context<'_> {
    fn value(&self, name: &str) -> Result<&str, TemplateError> {
        match name {
            "hostname" => Ok(&self.cfg.hostname),
            _ => Err(TemplateError::UnknownValue(name.to_string())),
        }
    }

    fn flag(&self, name: &str) -> Result<bool, TemplateError> {
        match name {
            "file_server" => Ok(self.cfg.file_server),
            "browseable" => Ok(self.cfg.browseable),
            _ => Err(TemplateError::UnknownSection(name.to_string())),
        }
    }
}

fn render_nodes(nodes: &[Node], ctx: &Context<'_>, out: &mut String) -> Result<(), TemplateError> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Value(name) => out.push_str(ctx.value(name)?),
            Node::Section {
                flag,
                negated,
                body,
            } => {
                // Resolve the flag even when the body is skipped so typos surface.
                if ctx.flag(flag)? != *negated {
                    render_nodes(body, ctx, out)?;
                }
            }
        }
    }
    Ok(())
}

// ── Public API ───────────────────────────────────────────────────────────────

/// Reject hostnames that would corrupt the Caddyfile.
///
/// # Errors
///
/// Returns [`RenderError::InvalidInput`] describing the first violation.
pub fn validate_hostname(hostname: &str) -> Result<(), RenderError> {
    let reject = |reason| {
        Err(RenderError::InvalidInput {
            field: "hostname",
            value: hostname.escape_default().to_string(),
            reason,
        })
    };
    if hostname.is_empty() {
        return reject("must not be empty");
    }
    if hostname.len() > MAX_HOSTNAME_LEN {
        return reject("must be at most 253 characters");
    }
    if hostname.chars().any(char::is_control) {
        return reject("contains a control character");
    }
    if hostname.chars().any(char::is_whitespace) {
        return reject("contains whitespace");
    }
    if !hostname
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '*'))
    {
        return reject("may only contain letters, digits, '-', '.', '_' and '*'");
    }
    Ok(())
}

/// Render the default template for `cfg`.
///
/// # Errors
///
/// See [`render_with`].
pub fn render(cfg: &DesiredConfig) -> Result<Vec<u8>, RenderError> {
    render_with(DEFAULT_TEMPLATE, cfg)
}

/// Render `template` for `cfg`.
///
/// The output is a pure function of the two inputs.
///
/// # Errors
///
/// Returns [`RenderError::InvalidInput`] for a hostname that would corrupt
/// the artifact and [`RenderError::Template`] for a broken template.
pub fn render_with(template: &str, cfg: &DesiredConfig) -> Result<Vec<u8>, RenderError> {
    validate_hostname(&cfg.hostname)?;
    let nodes = parse(template)?;
    let mut out = String::with_capacity(template.len());
    render_nodes(&nodes, &Context { cfg }, &mut out)?;
    Ok(out.into_bytes())
}

/// SHA-256 hex digest identifying a rendered artifact.
#[must_use]
pub fn artifact_digest(content: &[u8]) -> String {
    format!("{:x}", Sha256::digest(content))
}
