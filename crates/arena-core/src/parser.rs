//! Move extraction from free-form agent output

use regex::Regex;
use std::sync::LazyLock;

use crate::types::MoveToken;

/// File, rank, file, rank, optional promotion piece; delimiters and inner
/// whitespace optional.
static UCI_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[?\s*([a-h][1-8][a-h][1-8][qrbn]?)\s*\]?").expect("UCI pattern is valid")
});

/// Extract the move an agent committed to.
///
/// The last coordinate-like token in reading order wins, so an agent may
/// mention other moves while reasoning and state its choice at the end.
/// Returns `None` when the text holds no candidate.
pub fn parse_action(raw: &str) -> Option<MoveToken> {
    UCI_PATTERN
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .last()
        .map(|m| MoveToken::from_uci(m.as_str()))
}
