//! Identifier and comment helpers shared by the compiler and the emitter.

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Route paths, status codes and other non-identifier keys must be quoted.
pub fn needs_quoting(name: &str) -> bool {
    match name.chars().next() {
        Some(first) if !first.is_ascii_digit() => !name.chars().all(is_identifier_char),
        _ => true,
    }
}

/// Escape `s` for a double-quoted literal.
///
/// Control characters and the two Unicode line terminators become escape
/// sequences, so the literal always stays on one line.
pub fn escape_js_string(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if c.is_control() || c == '\u{2028}' || c == '\u{2029}' => {
                escaped.push_str(&format!("\\u{:04x}", u32::from(c)));
            }
            c => escaped.push(c),
        }
    }
    escaped
}

/// Quote and escape `name` when it is not a plain identifier.
pub fn quote_if_needed(name: &str) -> String {
    if needs_quoting(name) {
        format!("\"{}\"", escape_js_string(name))
    } else {
        name.to_string()
    }
}

/// Turn a schema title or reference segment into a declaration name.
///
/// Words are split on anything that cannot appear in an identifier and
/// joined with their first letter uppercased. A leading digit gets a `T`
/// prefix.
pub fn to_safe_type_name(name: &str) -> String {
    let mut result: String = name
        .split(|c: char| !is_identifier_char(c))
        .filter(|part| !part.is_empty())
        .map(capitalize_first)
        .collect();

    if result.is_empty() {
        return "Type".to_string();
    }
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, 'T');
    }
    result
}

/// Uppercase the first character, leaving the rest untouched.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Render a `/** ... */` block at `indent`, one ` * ` line per text line.
pub fn doc_comment(text: &str, indent: &str) -> String {
    let text = text.replace("*/", "*\\/");
    let mut output = format!("{indent}/**\n");
    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            output.push_str(&format!("{indent} *\n"));
        } else {
            output.push_str(&format!("{indent} * {line}\n"));
        }
    }
    output.push_str(&format!("{indent} */\n"));
    output
}
