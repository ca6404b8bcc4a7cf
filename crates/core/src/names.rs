//! Identifier-safe names derived from route paths and schema titles.

use std::collections::HashMap;

/// Turn an arbitrary title into a PascalCase identifier fragment.
///
/// Characters outside `[0-9a-zA-Z ]` act as word breaks; each word gets
/// its first letter uppercased and the rest kept as is.
pub fn normalize_title(title: &str) -> String {
    title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(capitalize_first)
        .collect()
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Collision counters for generated endpoint names.
///
/// The first occurrence of a name is returned unsuffixed, each later one
/// gets the number of earlier occurrences appended. Callers that want
/// suffixes to keep counting across runs hold on to one registry.
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    generated: HashMap<String, usize>,
}

impl NameRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every generated name.
    pub fn reset(&mut self) {
        self.generated.clear();
    }

    /// Derive a type-name prefix from a URL pattern.
    ///
    /// `""` gives `Empty`, a path without any word gives `Root`; neither
    /// touches the counters.
    pub fn generate_endpoint_name(&mut self, endpoint: &str) -> String {
        if endpoint.is_empty() {
            return "Empty".to_string();
        }

        let endpoint = endpoint.replacen("/*", "/all", 1);
        let name: String = endpoint
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|part| !part.is_empty())
            .map(capitalize_first)
            .collect();

        if name.is_empty() {
            return "Root".to_string();
        }

        let counter = self.generated.entry(name.clone()).or_insert(0);
        let suffix = *counter;
        *counter += 1;

        if suffix == 0 {
            name
        } else {
            format!("{name}{suffix}")
        }
    }
}
