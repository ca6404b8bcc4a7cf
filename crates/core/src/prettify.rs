//! Output formatting for generated declarations.
//!
//! The style is resolved once per run: explicit compiler options win, then
//! the nearest repository config file found walking up from the working
//! directory, then the built-in defaults.

use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::options::CompilerOptions;

/// Repository config files probed in each directory, in order.
pub const STYLE_FILES: [&str; 4] = [".prettierrc", ".prettierrc.json", ".prettierrc.yaml", ".prettierrc.yml"];

/// Layout rules applied to generated text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Style {
    /// Spaces inside single-line import braces.
    pub bracket_spacing: bool,
    /// Widest single-line import list.
    pub print_width: usize,
    /// Keep statement semicolons.
    pub semi: bool,
    /// Prefer `'` for string literals.
    pub single_quote: bool,
    /// Spaces per indentation level.
    pub tab_width: usize,
    /// `"none"`, `"es5"` or `"all"`.
    pub trailing_comma: String,
    /// Indent with tabs instead of spaces.
    pub use_tabs: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            bracket_spacing: false,
            print_width: 120,
            semi: true,
            single_quote: false,
            tab_width: 2,
            trailing_comma: "none".to_string(),
            use_tabs: false,
        }
    }
}

/// Formats generated text; `None` passes text through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    style: Option<Style>,
}

impl Formatter {
    /// Formatter applying `style`.
    pub fn new(style: Style) -> Self {
        Self { style: Some(style) }
    }

    /// Formatter that leaves text untouched.
    pub fn disabled() -> Self {
        Self { style: None }
    }

    /// The active style, `None` when disabled.
    pub fn style(&self) -> Option<&Style> {
        self.style.as_ref()
    }

    /// Apply the style to `text`.
    pub fn format(&self, text: &str) -> String {
        match &self.style {
            Some(style) => format_with(style, text),
            None => text.to_string(),
        }
    }
}

/// Resolve the formatter for `options`.
pub async fn prettify(options: &CompilerOptions) -> Formatter {
    if !options.formatting_enabled() {
        return Formatter::disabled();
    }
    if let Some(style) = &options.style {
        return Formatter::new(style.clone());
    }

    let cwd = options.resolved_cwd();
    match load_style(Path::new(&cwd)).await {
        Some(style) => Formatter::new(style),
        None => Formatter::new(Style::default()),
    }
}

/// First parseable config file in `start` or one of its ancestors.
async fn load_style(start: &Path) -> Option<Style> {
    for dir in start.ancestors() {
        for name in STYLE_FILES {
            let path = dir.join(name);
            let text = match tokio::fs::read_to_string(&path).await {
                Ok(text) => text,
                Err(err) if err.kind() == ErrorKind::NotFound => continue,
                Err(err) => {
                    warn!("Ignoring unreadable {}: {err}", path.display());
                    continue;
                }
            };
            match parse_style(name, &text) {
                Ok(style) => {
                    debug!("Using formatter style from {}", path.display());
                    return Some(style);
                }
                Err(err) => warn!("Ignoring invalid {}: {err}", path.display()),
            }
        }
    }
    None
}

/// `.prettierrc` may hold JSON or YAML; the suffixed files hold one of them.
fn parse_style(name: &str, text: &str) -> Result<Style, String> {
    if Path::new(name).extension().is_some_and(|ext| ext == "json") {
        return serde_json::from_str(text).map_err(|e| e.to_string());
    }
    if name == ".prettierrc" {
        if let Ok(style) = serde_json::from_str(text) {
            return Ok(style);
        }
    }
    serde_yaml::from_str(text).map_err(|e| e.to_string())
}

fn format_with(style: &Style, text: &str) -> String {
    let lines = layout_imports(style, text);

    let mut output = String::with_capacity(text.len());
    let mut in_comment = false;
    let mut blank_run = 0;

    for line in lines {
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            blank_run += 1;
            continue;
        }

        let opens_comment = trimmed.trim_start().starts_with("/*");
        let is_comment = in_comment || opens_comment || trimmed.trim_start().starts_with("//");
        if opens_comment && !trimmed.contains("*/") {
            in_comment = true;
        } else if in_comment && trimmed.contains("*/") {
            in_comment = false;
        }

        // Leading blank lines are dropped, inner runs collapse to one.
        if blank_run > 0 && !output.is_empty() {
            output.push('\n');
        }
        blank_run = 0;

        let mut line = reindent(style, trimmed);
        if !is_comment {
            line = requote(&line, if style.single_quote { '\'' } else { '"' });
            if !style.semi && line.ends_with(';') {
                line.pop();
            }
        }
        output.push_str(&line);
        output.push('\n');
    }

    output
}

/// Re-lay `import { ... } from` lists, single line when they fit.
fn layout_imports(style: &Style, text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending: Option<String> = None;

    for line in text.lines() {
        if let Some(buffer) = pending.as_mut() {
            buffer.push(' ');
            buffer.push_str(line.trim());
            if line.contains('}') {
                let statement = std::mem::take(buffer);
                pending = None;
                lines.extend(render_import(style, &statement));
            }
            continue;
        }

        if line.starts_with("import") && line.contains('{') {
            if line.contains('}') {
                lines.extend(render_import(style, line));
            } else {
                pending = Some(line.trim_end().to_string());
            }
            continue;
        }

        lines.push(line.to_string());
    }

    if let Some(statement) = pending {
        lines.push(statement);
    }
    lines
}

fn render_import(style: &Style, statement: &str) -> Vec<String> {
    let (Some(open), Some(close)) = (statement.find('{'), statement.rfind('}')) else {
        return vec![statement.to_string()];
    };
    let head = &statement[..open];
    let tail = &statement[close + 1..];
    let items: Vec<&str> = statement[open + 1..close]
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect();

    let joined = items.join(", ");
    let single = if style.bracket_spacing {
        format!("{head}{{ {joined} }}{tail}")
    } else {
        format!("{head}{{{joined}}}{tail}")
    };
    if single.len() <= style.print_width {
        return vec![single];
    }

    let mut lines = vec![format!("{head}{{")];
    for (i, item) in items.iter().enumerate() {
        let last = i + 1 == items.len();
        let comma = if !last || style.trailing_comma != "none" { "," } else { "" };
        lines.push(format!("  {item}{comma}"));
    }
    lines.push(format!("}}{tail}"));
    lines
}

/// Map two-space indentation levels onto the style.
fn reindent(style: &Style, line: &str) -> String {
    let spaces = line.len() - line.trim_start_matches(' ').len();
    let (levels, rest) = (spaces / 2, spaces % 2);
    let unit = if style.use_tabs {
        "\t".to_string()
    } else {
        " ".repeat(style.tab_width)
    };
    format!("{}{}{}", unit.repeat(levels), " ".repeat(rest), line.trim_start_matches(' '))
}

/// Switch string literals to `quote` when no escaping is involved.
fn requote(line: &str, quote: char) -> String {
    let other = if quote == '"' { '\'' } else { '"' };
    let mut output = String::with_capacity(line.len());
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        if c != '"' && c != '\'' {
            output.push(c);
            continue;
        }

        let mut content = String::new();
        let mut closed = false;
        while let Some(d) = chars.next() {
            if d == '\\' {
                content.push(d);
                if let Some(escaped) = chars.next() {
                    content.push(escaped);
                }
                continue;
            }
            if d == c {
                closed = true;
                break;
            }
            content.push(d);
        }

        let delimiter = if closed && c == other && !content.contains(quote) && !content.contains('\\') {
            quote
        } else {
            c
        };
        output.push(delimiter);
        output.push_str(&content);
        if closed {
            output.push(delimiter);
        }
    }

    output
}
