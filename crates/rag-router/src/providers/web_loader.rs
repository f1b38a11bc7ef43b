//! Web page loader: fetch a URL and extract its visible text

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Node, Selector};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::RawDocument;

use super::document_loader::DocumentLoader;

/// Elements whose text is never part of the page content
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Elements that break the text flow onto a new line
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "caption", "dd", "details", "div", "dl",
    "dt", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table", "td", "th", "tr", "ul",
];

/// HTTP page loader
pub struct WebLoader {
    client: Client,
}

impl WebLoader {
    /// Create a loader with the given user agent and fetch timeout
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent.to_string())
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Parse an HTML page into a document
    pub fn parse_html(source: &str, html: &str) -> RawDocument {
        let document = Html::parse_document(html);

        let content = extract_text(&document);
        let mut doc = RawDocument::new(source, content)
            .with_metadata("source", serde_json::json!(source));

        if let Some(title) = select_text(&document, "title") {
            doc = doc.with_metadata("title", serde_json::json!(title));
        }
        if let Some(description) = select_attr(&document, r#"meta[name="description"]"#, "content") {
            doc = doc.with_metadata("description", serde_json::json!(description));
        }
        if let Some(language) = select_attr(&document, "html", "lang") {
            doc = doc.with_metadata("language", serde_json::json!(language));
        }
        let hash = doc.content_hash.clone();
        doc.with_metadata("content_hash", serde_json::json!(hash))
    }
}

/// Visible text of the body (or the whole document if there is no body).
///
/// Inline runs are joined as written with whitespace collapsed; each
/// block-level element starts a new line.
fn extract_text(document: &Html) -> String {
    let root = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next().map(|body| *body))
        .unwrap_or_else(|| document.tree.root());

    let mut lines = Vec::new();
    let mut segment = String::new();
    let mut block = None;
    let mut preformatted = false;

    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        if node.ancestors().any(|a| is_element(a.value(), HIDDEN_ELEMENTS)) {
            continue;
        }

        let enclosing = node
            .ancestors()
            .find(|a| is_element(a.value(), BLOCK_ELEMENTS))
            .map(|a| a.id());
        if enclosing != block {
            push_line(&mut lines, &segment, preformatted);
            segment.clear();
            block = enclosing;
            preformatted = node.ancestors().any(|a| is_element(a.value(), &["pre"]));
        }
        segment.push_str(text);
    }
    push_line(&mut lines, &segment, preformatted);

    lines.join("\n")
}

fn is_element(node: &Node, names: &[&str]) -> bool {
    node.as_element().is_some_and(|e| names.contains(&e.name()))
}

fn push_line(lines: &mut Vec<String>, segment: &str, preformatted: bool) {
    let line = if preformatted {
        segment.trim().to_string()
    } else {
        segment.split_whitespace().collect::<Vec<_>>().join(" ")
    };
    if !line.is_empty() {
        lines.push(line);
    }
}

fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let text: String = document.select(&selector).next()?.text().collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn select_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()?
        .value()
        .attr(attr)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl DocumentLoader for WebLoader {
    async fn load(&self, source: &str) -> Result<Vec<RawDocument>> {
        let response = self
            .client
            .get(source)
            .send()
            .await
            .map_err(|e| Error::fetch(source, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(source, format!("HTTP {}", status)));
        }

        let html = response
            .text()
            .await
            .map_err(|e| Error::fetch(source, format!("Failed to read body: {}", e)))?;

        let doc = Self::parse_html(source, &html);
        tracing::debug!("Loaded {} ({} bytes of text)", source, doc.content.len());
        Ok(vec![doc])
    }

    fn name(&self) -> &str {
        "web"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <title> LLM Powered Autonomous Agents </title>
  <meta name="description" content="Agents with planning and memory">
  <style>body { color: red; }</style>
</head>
<body>
  <h1>Agent System Overview</h1>
  <p>Memory comes in <b>short-term</b> and long-term forms.</p>
  <script>var tracking = 1;</script>
  <noscript>Enable JavaScript</noscript>
</body>
</html>"#;

    #[test]
    fn test_parse_html_text() {
        let doc = WebLoader::parse_html("https://example.com/agent", PAGE);
        assert_eq!(
            doc.content,
            "Agent System Overview\nMemory comes in short-term and long-term forms."
        );
        assert!(!doc.content.contains("tracking"));
        assert!(!doc.content.contains("JavaScript"));
        assert!(!doc.content.contains("color"));
    }

    #[test]
    fn test_parse_html_metadata() {
        let doc = WebLoader::parse_html("https://example.com/agent", PAGE);
        assert_eq!(doc.source, "https://example.com/agent");
        assert_eq!(doc.title(), Some("LLM Powered Autonomous Agents"));
        assert_eq!(doc.metadata["description"], "Agents with planning and memory");
        assert_eq!(doc.metadata["language"], "en");
        assert_eq!(doc.metadata["content_hash"], doc.content_hash.as_str());
    }

    #[test]
    fn test_inline_markup_stays_on_one_line() {
        let html = r#"<body><div>See <a href="/x">the <em>survey</em></a>, then
            read on.<ul><li>Planning</li><li>Memory</li></ul>Done.</div>
            <pre>fn main() {
    run();
}</pre></body>"#;
        let doc = WebLoader::parse_html("mem://x", html);
        assert_eq!(
            doc.content,
            "See the survey, then read on.\nPlanning\nMemory\nDone.\nfn main() {\n    run();\n}"
        );
    }

    #[test]
    fn test_parse_fragment_without_body() {
        let doc = WebLoader::parse_html("mem://x", "plain <i>text</i>");
        assert_eq!(doc.content, "plain text");
        assert_eq!(doc.title(), None);
    }
}
