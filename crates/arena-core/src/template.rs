//! Exact-placeholder prompt templates.
//!
//! Templates use `{name}` placeholders and `{{` / `}}` for literal braces.
//! Every placeholder is checked against an allowed set when the template is
//! parsed, so a template that loads cleanly can always be fully rendered.

use crate::error::ArenaError;

pub const PH_ROLE: &str = "role";
pub const PH_BOARD: &str = "board";
pub const PH_PIECE_POSITIONS: &str = "piece_positions";
pub const PH_VALID_MOVES: &str = "valid_moves";
pub const PH_OBSERVATION: &str = "observation";
pub const PH_HISTORY: &str = "history";

/// Placeholders a per-turn prompt may reference.
pub const STEP_PLACEHOLDERS: &[&str] = &[
    PH_ROLE,
    PH_BOARD,
    PH_PIECE_POSITIONS,
    PH_VALID_MOVES,
    PH_OBSERVATION,
    PH_HISTORY,
];

/// An agent cannot be expected to pick a legal move without seeing them.
pub const STEP_REQUIRED: &[&str] = &[PH_VALID_MOVES];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Slot(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parse a per-turn prompt template.
    pub fn step(source: &str) -> Result<Self, ArenaError> {
        Self::parse(source, STEP_PLACEHOLDERS, STEP_REQUIRED)
    }

    /// Parse `source`, rejecting placeholders outside `allowed` and requiring
    /// each name in `required` to appear at least once.
    pub fn parse(source: &str, allowed: &[&str], required: &[&str]) -> Result<Self, ArenaError> {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    text.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    text.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for n in chars.by_ref() {
                        if n == '}' {
                            closed = true;
                            break;
                        }
                        name.push(n);
                    }
                    if !closed {
                        return Err(ArenaError::MalformedTemplate(format!(
                            "unclosed placeholder {{{name}"
                        )));
                    }
                    let name = name.trim().to_string();
                    if !allowed.contains(&name.as_str()) {
                        return Err(ArenaError::UnknownPlaceholder(name));
                    }
                    if !text.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut text)));
                    }
                    segments.push(Segment::Slot(name));
                }
                '}' => {
                    return Err(ArenaError::MalformedTemplate(
                        "unmatched '}' (use '}}' for a literal brace)".to_string(),
                    ));
                }
                _ => text.push(c),
            }
        }
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        let template = Self {
            source: source.to_string(),
            segments,
        };
        if let Some(missing) = required.iter().find(|r| !template.references(r)) {
            return Err(ArenaError::MissingPlaceholder(missing.to_string()));
        }
        Ok(template)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn references(&self, name: &str) -> bool {
        self.placeholders().any(|p| p == name)
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Slot(name) => Some(name.as_str()),
            Segment::Text(_) => None,
        })
    }

    /// Substitute every placeholder from `values`.
    pub fn render(&self, values: &[(&str, &str)]) -> Result<String, ArenaError> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Text(t) => out.push_str(t),
                Segment::Slot(name) => {
                    let value = values
                        .iter()
                        .find(|(k, _)| k == name)
                        .map(|(_, v)| *v)
                        .ok_or_else(|| ArenaError::UnresolvedPlaceholder(name.clone()))?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}
