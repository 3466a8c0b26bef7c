use serde::{Deserialize, Serialize};

use crate::citations::{enumerate_citations, parse_answer};
use crate::models::{AskResponse, Citation};

/// Everything an answer card needs to render: the rewritten markdown and the
/// cited chunks in display order, annotated with their part index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerView {
    pub message_id: Option<String>,
    pub markdown: String,
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReferenceEntry {
    pub index: usize,
    pub label: String,
    pub citation_id: String,
    pub filepath: Option<String>,
    pub part_index: Option<u32>,
}

/// Wire shape of an answer card: the view plus its reference list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderedAnswer {
    pub message_id: Option<String>,
    pub markdown: String,
    pub citations: Vec<Citation>,
    pub references: Vec<ReferenceEntry>,
}

impl From<AnswerView> for RenderedAnswer {
    fn from(view: AnswerView) -> Self {
        let references = view.references();
        Self {
            message_id: view.message_id,
            markdown: view.markdown,
            citations: view.citations,
            references,
        }
    }
}

impl AnswerView {
    pub fn from_response(response: &AskResponse) -> Option<Self> {
        let parsed = parse_answer(response)?;

        Some(Self {
            message_id: response.message_id.clone(),
            markdown: parsed.markdown_format_text,
            citations: enumerate_citations(&parsed.citations),
        })
    }

    pub fn references(&self) -> Vec<ReferenceEntry> {
        self.citations
            .iter()
            .enumerate()
            .map(|(idx, citation)| ReferenceEntry {
                index: idx + 1,
                label: format!("[{}] {}", idx + 1, reference_name(citation)),
                citation_id: citation.id.clone(),
                filepath: citation.filepath.clone(),
                part_index: citation.part_index,
            })
            .collect()
    }

    /// Resolves a superscript marker back to the citation it stands for.
    pub fn citation(&self, display_number: usize) -> Option<&Citation> {
        let wanted = display_number.to_string();
        self.citations
            .iter()
            .find(|citation| citation.reindex_id.as_deref() == Some(wanted.as_str()))
    }
}

fn reference_name(citation: &Citation) -> &str {
    citation
        .filepath
        .as_deref()
        .filter(|path| !path.trim().is_empty())
        .or_else(|| citation.title.as_deref().filter(|t| !t.trim().is_empty()))
        .unwrap_or(citation.id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(text: &str) -> AskResponse {
        let mut untitled = Citation::new("doc4", "");
        untitled.title = Some("Quarterly report".to_string());

        let mut response = AskResponse::new(
            text,
            vec![
                Citation::new("doc1", "file1.pdf"),
                Citation::new("doc2", "file1.pdf"),
                Citation::new("doc3", "file2.pdf"),
                untitled,
            ],
        );
        response.message_id = Some("msg-1".to_string());
        response
    }

    #[test]
    fn view_enumerates_only_cited_chunks() {
        let view = AnswerView::from_response(&response("Uses [doc2] and [doc3].")).unwrap();

        assert_eq!(view.markdown, "Uses ^1^ and ^2^ .");
        assert_eq!(view.citations.len(), 2);
        assert_eq!(view.citations[0].part_index, Some(1));
        assert_eq!(view.citations[1].part_index, Some(1));
        assert_eq!(view.message_id.as_deref(), Some("msg-1"));
    }

    #[test]
    fn references_are_labelled_in_display_order() {
        let view =
            AnswerView::from_response(&response("[doc3] then [doc1] then [doc2] [doc4]"))
                .unwrap();
        let labels: Vec<_> = view.references().into_iter().map(|r| r.label).collect();

        assert_eq!(
            labels,
            vec![
                "[1] file2.pdf",
                "[2] file1.pdf",
                "[3] file1.pdf",
                "[4] Quarterly report"
            ]
        );
        let refs = view.references();
        assert_eq!(refs[2].part_index, Some(2));
        assert_eq!(refs[2].citation_id, "doc2");
    }

    #[test]
    fn marker_click_resolves_citation() {
        let view = AnswerView::from_response(&response("a [doc3] b [doc1]")).unwrap();
        assert_eq!(view.citation(2).map(|c| c.id.as_str()), Some("doc1"));
        assert!(view.citation(3).is_none());
    }

    #[test]
    fn rendered_answer_carries_references() {
        let view = AnswerView::from_response(&response("only [doc2]")).unwrap();
        let rendered = RenderedAnswer::from(view);
        assert_eq!(rendered.references.len(), 1);
        assert_eq!(rendered.references[0].label, "[1] file1.pdf");
        assert_eq!(rendered.citations[0].reindex_id.as_deref(), Some("1"));
    }

    #[test]
    fn view_is_absent_without_answer_text() {
        let mut missing = response("ignored");
        missing.answer = None;
        assert!(AnswerView::from_response(&missing).is_none());
    }
}
