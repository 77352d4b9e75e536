//! PDF text extraction.

use async_trait::async_trait;
use std::sync::Arc;

use crate::extractors::Extractor;
use crate::traits::fetcher::Fetcher;
use crate::types::extraction::ExtractionResult;

/// Pages decoded per document; PDFs beyond this are summarized from
/// their head.
const DEFAULT_PAGE_CAP: usize = 10;

/// Maximum lines captured under one section label.
const SECTION_LINE_CAP: usize = 30;

/// Section labels the structured summary looks for, as labeled lines.
const SECTION_LABELS: [&str; 6] = [
    "abstract",
    "introduction",
    "methodology",
    "methods",
    "conclusion",
    "keywords",
];

/// Extracts text from PDF documents page by page.
pub struct PdfExtractor<F: Fetcher> {
    fetcher: Arc<F>,
    page_cap: usize,
}

impl<F: Fetcher> PdfExtractor<F> {
    /// Create a PDF extractor with the default page cap.
    pub fn new(fetcher: Arc<F>) -> Self {
        Self {
            fetcher,
            page_cap: DEFAULT_PAGE_CAP,
        }
    }

    /// Set the page cap.
    pub fn with_page_cap(mut self, cap: usize) -> Self {
        self.page_cap = cap.max(1);
        self
    }
}

#[async_trait]
impl<F: Fetcher> Extractor for PdfExtractor<F> {
    async fn extract(&self, url: &str) -> ExtractionResult {
        let body = match self.fetcher.fetch(url).await {
            Ok(body) => body,
            Err(e) => return ExtractionResult::failure(url, e),
        };

        let document = match lopdf::Document::load_mem(&body.bytes) {
            Ok(doc) => doc,
            Err(e) => return ExtractionResult::failure(url, format!("malformed PDF ({e})")),
        };

        let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
        let total_pages = page_numbers.len();
        if total_pages == 0 {
            return ExtractionResult::failure(url, "PDF contains no pages");
        }

        let mut page_texts: Vec<String> = Vec::new();
        for number in page_numbers.into_iter().take(self.page_cap) {
            match document.extract_text(&[number]) {
                Ok(text) if !text.trim().is_empty() => page_texts.push(text),
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(url = %url, page = number, error = %e, "page text layer unreadable");
                }
            }
        }

        if page_texts.is_empty() {
            return ExtractionResult::failure(url, "no extractable text layer");
        }

        let text = page_texts.join("\n\n");
        let mut content = format!(
            "PDF document: {url}\nPages extracted: {} of {total_pages}\n",
            page_texts.len()
        );
        if let Some(language) = estimate_language(&text) {
            content.push_str(&format!("Language: {language}\n"));
        }
        content.push('\n');

        if let Some(summary) = structured_summary(&text) {
            content.push_str(&summary);
            content.push('\n');
        }
        content.push_str(text.trim());

        ExtractionResult::text(content)
    }
}

/// Estimate the document language from the ratio of Latin letters to
/// all letters. Informational only.
fn estimate_language(text: &str) -> Option<String> {
    let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() < 50 {
        return None;
    }
    let latin = letters.iter().filter(|c| c.is_ascii_alphabetic()).count();
    let ratio = latin as f64 / letters.len() as f64;
    Some(if ratio >= 0.8 {
        "Latin-script (likely English)".to_string()
    } else {
        "predominantly non-Latin script".to_string()
    })
}

/// Build a structured summary from labeled section lines. Returns
/// `None` unless at least two known labels are present.
fn structured_summary(text: &str) -> Option<String> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();

    let mut sections: Vec<(String, String)> = Vec::new();
    let mut current: Option<(String, Vec<String>)> = None;

    for line in &lines {
        if let Some(label) = match_label(line) {
            if let Some((name, body)) = current.take() {
                sections.push((name, body.join(" ")));
            }
            current = Some((label, Vec::new()));
        } else if let Some((_, body)) = current.as_mut() {
            if body.len() < SECTION_LINE_CAP && !line.is_empty() {
                body.push((*line).to_string());
            }
        }
    }
    if let Some((name, body)) = current.take() {
        sections.push((name, body.join(" ")));
    }

    sections.retain(|(_, body)| !body.is_empty());
    if sections.len() < 2 {
        return None;
    }

    let title = lines.iter().find(|l| !l.is_empty())?;
    let mut summary = format!("Document summary\nTitle: {title}\n");
    for (name, body) in &sections {
        let mut label = name.clone();
        if let Some(first) = label.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        summary.push_str(&format!("{label}: {body}\n"));
    }
    Some(summary)
}

fn match_label(line: &str) -> Option<String> {
    let lowered = line.to_ascii_lowercase();
    for label in SECTION_LABELS {
        if let Some(rest) = lowered.strip_prefix(label) {
            // A label line is the bare word, optionally punctuated
            if rest.trim_start_matches([':', '.', ' ']).is_empty() {
                return Some(label.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetcher;

    #[tokio::test]
    async fn malformed_pdf_downgrades_to_failure_text() {
        let fetcher = MockFetcher::new();
        fetcher.add_body(
            "https://papers.test/report.pdf",
            "application/pdf",
            b"this is not a pdf".to_vec(),
        );

        let extractor = PdfExtractor::new(Arc::new(fetcher));
        let result = extractor.extract("https://papers.test/report.pdf").await;

        assert!(result.content.contains("https://papers.test/report.pdf"));
        assert!(result.visualization.is_none());
    }

    #[tokio::test]
    async fn unreachable_pdf_downgrades_to_failure_text() {
        let fetcher = MockFetcher::new();
        fetcher.add_failure("https://papers.test/missing.pdf");

        let extractor = PdfExtractor::new(Arc::new(fetcher));
        let result = extractor.extract("https://papers.test/missing.pdf").await;

        assert!(result.content.contains("missing.pdf"));
    }

    #[test]
    fn structured_summary_requires_two_labeled_sections() {
        let text = "A Study of Widgets\n\nAbstract\nWidgets are useful.\n\nConclusion\nStill useful.";
        let summary = structured_summary(text).unwrap();
        assert!(summary.contains("Title: A Study of Widgets"));
        assert!(summary.contains("Abstract: Widgets are useful."));
        assert!(summary.contains("Conclusion: Still useful."));

        assert!(structured_summary("Title\n\nAbstract\nOnly one section here.").is_none());
        assert!(structured_summary("No labels at all\njust text\nmore text").is_none());
    }

    #[test]
    fn language_estimate_is_informational() {
        let latin = "The quick brown fox jumps over the lazy dog. ".repeat(5);
        assert_eq!(
            estimate_language(&latin).as_deref(),
            Some("Latin-script (likely English)")
        );
        assert!(estimate_language("short").is_none());
    }
}
