use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::models::{AskResponse, Citation, ParsedAnswer};

/// Assigns each citation its 1-based position among citations that share the
/// same `filepath`, keeping input order. Citations without a filepath form a
/// group of their own.
pub fn enumerate_citations(citations: &[Citation]) -> Vec<Citation> {
    let mut counters: HashMap<Option<&str>, u32> = HashMap::new();

    citations
        .iter()
        .map(|citation| {
            let counter = counters.entry(citation.filepath.as_deref()).or_insert(0);
            *counter += 1;

            let mut annotated = citation.clone();
            annotated.part_index = Some(*counter);
            annotated
        })
        .collect()
}

/// Rewrites `[id]` reference tokens into `^n^` superscript markers, numbering
/// cited documents in order of first appearance.
///
/// Returns `None` when the response carries no answer text.
pub fn parse_answer(answer: &AskResponse) -> Option<ParsedAnswer> {
    let text = answer.answer.as_deref()?;

    let mut by_id: HashMap<&str, &Citation> = HashMap::new();
    for citation in &answer.citations {
        by_id.entry(citation.id.as_str()).or_insert(citation);
    }

    let mut numbers: HashMap<&str, usize> = HashMap::new();
    let mut citations: Vec<Citation> = Vec::new();
    let mut markdown = String::with_capacity(text.len());
    let mut tokens = 0usize;
    let mut last = 0;

    if let Some(re) = token_regex() {
        for captures in re.captures_iter(text) {
            let (Some(token), Some(id)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            let Some((id, citation)) = by_id.get_key_value(id.as_str()) else {
                continue;
            };

            tokens += 1;
            let number = *numbers.entry(*id).or_insert_with(|| {
                let mut cited = (*citation).clone();
                cited.reindex_id = Some((citations.len() + 1).to_string());
                citations.push(cited);
                citations.len()
            });

            markdown.push_str(&text[last..token.start()]);
            push_marker(&mut markdown, number, &text[token.end()..]);
            last = token.end();
        }
    }
    markdown.push_str(&text[last..]);

    tracing::debug!(
        tokens,
        cited = citations.len(),
        candidates = answer.citations.len(),
        "parsed answer citations"
    );

    Some(ParsedAnswer {
        citations,
        markdown_format_text: markdown,
    })
}

// Innermost `[...]` spans only, so `[[doc1]]` resolves the inner token and
// leaves the outer brackets as text.
fn token_regex() -> Option<&'static Regex> {
    static TOKEN_RE: OnceLock<Option<Regex>> = OnceLock::new();
    TOKEN_RE
        .get_or_init(|| Regex::new(r"\[([^\[\]]+)\]").ok())
        .as_ref()
}

// A marker glued to the following text would either fuse with the next marker
// (`^1^^2^`) or swallow punctuation into the superscript, so anything other
// than whitespace gets a single separating space.
fn push_marker(markdown: &mut String, number: usize, following: &str) {
    markdown.push('^');
    markdown.push_str(&number.to_string());
    markdown.push('^');

    if following
        .chars()
        .next()
        .is_some_and(|next| !next.is_whitespace())
    {
        markdown.push(' ');
    }
}
