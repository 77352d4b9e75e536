//! HTML content parsing: visible text, links, and media references.

use scraper::{Html, Selector};
use url::Url;

/// Parsed content of one HTML page.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    pub title: Option<String>,
    pub text: String,
    pub links: Vec<String>,
    pub media: Vec<String>,
}

/// Parse a page: strip non-content markup down to readable text and
/// collect navigational and media links resolved against `base`.
pub fn parse_page(base: &Url, html: &str) -> PageContent {
    let document = Html::parse_document(html);

    PageContent {
        title: extract_title(&document),
        text: visible_text(html),
        links: extract_links(base, &document),
        media: extract_media(base, &document),
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").expect("static selector");
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Reduce HTML to visible text. Scripts, styles, navigation, headers,
/// footers, and asides are dropped before tags are flattened.
pub fn visible_text(html: &str) -> String {
    let mut text = html.to_string();

    // Drop non-content subtrees
    for tag in ["script", "style", "noscript", "nav", "header", "footer", "aside", "svg"] {
        let pattern = regex::Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}>"))
            .expect("static pattern");
        text = pattern.replace_all(&text, " ").to_string();
    }

    // Keep block boundaries as line breaks
    let break_pattern =
        regex::Regex::new(r"(?i)</(p|div|li|h[1-6]|tr|table|section|article)>|<br\s*/?>")
            .expect("static pattern");
    text = break_pattern.replace_all(&text, "\n").to_string();

    // Flatten remaining tags
    let tag_pattern = regex::Regex::new(r"<[^>]+>").expect("static pattern");
    text = tag_pattern.replace_all(&text, " ").to_string();

    text = decode_entities(&text);

    // Collapse runs of whitespace while preserving line structure
    let mut lines: Vec<String> = Vec::new();
    for line in text.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if !collapsed.is_empty() {
            lines.push(collapsed);
        }
    }
    lines.join("\n")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

fn extract_links(base: &Url, document: &Html) -> Vec<String> {
    let selector = Selector::parse("a[href]").expect("static selector");
    let mut links = Vec::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if href.starts_with('#')
            || href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
        {
            continue;
        }
        if let Ok(resolved) = base.join(href) {
            links.push(resolved.to_string());
        }
    }

    links
}

fn extract_media(base: &Url, document: &Html) -> Vec<String> {
    let selector =
        Selector::parse("img[src], video[src], audio[src], source[src]").expect("static selector");
    let mut media = Vec::new();

    for element in document.select(&selector) {
        let Some(src) = element.value().attr("src") else {
            continue;
        };
        if src.starts_with("data:") {
            continue;
        }
        if let Ok(resolved) = base.join(src) {
            media.push(resolved.to_string());
        }
    }

    media
}
