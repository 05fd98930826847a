//! Static visa page strategy
//!
//! Fetches a country-specific visa page by URL slug and extracts its visible
//! text, stripping scripts, styles and page chrome. The slug comes from a
//! small table of irregular country names with a lowercase/hyphenate
//! fallback for everything else.

use crate::config::VisaConfig;
use crate::provider::{FailureKind, ProviderError, ProviderResult};
use anyhow::Result;
use async_trait::async_trait;
use scraper::{Html, Node};
use tracing::{debug, instrument, warn};

use super::VisaStrategy;

pub(crate) const STATIC_STRATEGY_NAME: &str = "static_page";

/// Country names whose page slug does not follow the hyphenation rule
const IRREGULAR_SLUGS: &[(&str, &str)] = &[
    ("united kingdom", "uk"),
    ("united states", "usa"),
    ("united states of america", "usa"),
    ("united arab emirates", "uae"),
];

/// Elements whose text content is never page content
const SKIP_TAGS: &[&str] = &["script", "style", "nav", "header", "footer", "noscript"];

/// Build the URL slug for a destination country
pub(crate) fn country_slug(name: &str) -> String {
    let normalized = name.trim().to_lowercase();
    for (irregular, slug) in IRREGULAR_SLUGS {
        if normalized == *irregular {
            return (*slug).to_string();
        }
    }
    normalized.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Extract human-visible text from an HTML document
pub(crate) fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();

    let mut stack = vec![document.tree.root()];
    while let Some(node) = stack.pop() {
        match node.value() {
            Node::Element(element) if SKIP_TAGS.contains(&element.name()) => continue,
            Node::Text(text) => {
                let text = text.text.trim();
                if !text.is_empty() {
                    if !out.is_empty() {
                        out.push(' ');
                    }
                    out.push_str(text);
                }
            }
            _ => {}
        }
        // Reversed so children pop in document order
        let mut children: Vec<_> = node.children().collect();
        children.reverse();
        stack.extend(children);
    }

    out
}

/// Visa acquisition through a static country page
pub struct StaticPageStrategy {
    client: reqwest::Client,
    base_url: String,
}

impl StaticPageStrategy {
    pub fn new(config: &VisaConfig) -> Result<Self> {
        Ok(Self {
            client: crate::api::http_client(config.timeout_seconds)?,
            base_url: config.static_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl VisaStrategy for StaticPageStrategy {
    fn name(&self) -> &'static str {
        STATIC_STRATEGY_NAME
    }

    #[instrument(skip(self))]
    async fn acquire(&self, destination: &str, _passport: &str) -> ProviderResult<String> {
        let slug = country_slug(destination);
        let url = format!("{}/{}-visa/", self.base_url, urlencoding::encode(&slug));
        debug!(url, "fetching static visa page");

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(%e, "static visa page unreachable");
                return ProviderResult::failure(ProviderError::new(
                    FailureKind::UpstreamUnavailable,
                    format!("could not fetch visa page: {e}"),
                    destination,
                ));
            }
        };

        let status = response.status();
        if !status.is_success() {
            return ProviderResult::failure(ProviderError::new(
                FailureKind::UpstreamUnavailable,
                format!("visa page answered with status {status}"),
                destination,
            ));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return ProviderResult::failure(ProviderError::new(
                    FailureKind::MalformedResponse,
                    format!("could not read visa page body: {e}"),
                    destination,
                ));
            }
        };

        let text = visible_text(&body);
        if text.is_empty() {
            return ProviderResult::failure(ProviderError::new(
                FailureKind::MalformedResponse,
                "visa page contained no readable text",
                destination,
            ));
        }

        ProviderResult::success(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("United Kingdom", "uk")]
    #[case("united states", "usa")]
    #[case("United Arab Emirates", "uae")]
    #[case("Japan", "japan")]
    #[case("South Korea", "south-korea")]
    #[case("  New Zealand  ", "new-zealand")]
    fn test_country_slug(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(country_slug(name), expected);
    }

    #[test]
    fn test_visible_text_strips_chrome() {
        let html = r#"
            <html>
              <head><style>body { color: red; }</style></head>
              <body>
                <nav>Home | About</nav>
                <script>trackVisitor();</script>
                <h1>Japan Visa</h1>
                <p>Indian citizens require an e-visa.</p>
                <footer>© Visa Index</footer>
              </body>
            </html>"#;
        let text = visible_text(html);
        assert!(text.contains("Japan Visa"));
        assert!(text.contains("Indian citizens require an e-visa."));
        assert!(!text.contains("trackVisitor"));
        assert!(!text.contains("color: red"));
        assert!(!text.contains("Home | About"));
        assert!(!text.contains("Visa Index"));
    }

    #[test]
    fn test_visible_text_preserves_document_order() {
        let html = "<body><p>first</p><div><p>second</p></div><p>third</p></body>";
        assert_eq!(visible_text(html), "first second third");
    }

    #[test]
    fn test_visible_text_of_empty_page() {
        assert_eq!(visible_text("<html><body></body></html>"), "");
    }
}
