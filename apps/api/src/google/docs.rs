//! Google Docs v1: template documents are flattened to their paragraph text.

use serde::Deserialize;

/// The parts of a `documents.get` response that carry paragraph text.
#[derive(Debug, Deserialize)]
pub struct Document {
    pub body: Body,
}

#[derive(Debug, Deserialize)]
pub struct Body {
    pub content: Vec<StructuralElement>,
}

/// Tables, section breaks and tables of contents are ignored.
#[derive(Debug, Deserialize)]
pub struct StructuralElement {
    pub paragraph: Option<Paragraph>,
}

#[derive(Debug, Deserialize)]
pub struct Paragraph {
    pub elements: Vec<ParagraphElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphElement {
    pub text_run: Option<TextRun>,
}

#[derive(Debug, Deserialize)]
pub struct TextRun {
    pub content: String,
}

impl Document {
    /// Concatenates every text run of every top-level paragraph, in order.
    pub fn text(&self) -> String {
        self.body
            .content
            .iter()
            .filter_map(|element| element.paragraph.as_ref())
            .flat_map(|paragraph| &paragraph.elements)
            .filter_map(|element| element.text_run.as_ref())
            .map(|run| run.content.as_str())
            .collect()
    }
}
