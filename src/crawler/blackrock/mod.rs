use anyhow::{anyhow, Result};
use async_trait::async_trait;
use scraper::Html;

use crate::{
    config,
    crawler::QuotationSource,
    series::Sample,
    util::{self, text},
};

/// Scrapes the published NAV from a BlackRock fund page.
///
/// The page shows it in the header as `USD 118.5825`.
pub struct BlackRock {
    source: config::Source,
}

impl BlackRock {
    pub fn new(source: config::Source) -> Self {
        BlackRock { source }
    }

    /// Extracts the unit value from an already downloaded page.
    pub fn parse_value(&self, html: &str) -> Result<f64> {
        let document = Html::parse_document(html);
        let raw = util::http::element::get_one_element_text(
            &document,
            &self.source.selector,
            &self.source.url,
        )?;
        let number = text::extract_number(&raw)
            .map_err(|why| anyhow!("{} from {}", why, self.source.url))?;

        text::parse_f64(number, None)
    }
}

#[async_trait]
impl QuotationSource for BlackRock {
    async fn fetch(&self) -> Result<Sample> {
        let html = util::http::get(&self.source.url, &self.source.user_agent).await?;
        let value = self.parse_value(&html)?;

        Ok(Sample::new(util::datetime::today_utc(), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<body>
  <ul class="header-nav">
    <li class="header-nav-label">NAV as of 31/May/2024</li>
    <li class="header-nav-data">
      USD 118.5825
    </li>
    <li class="header-nav-data">0.01 (0.01%)</li>
  </ul>
</body>
</html>"#;

    #[test]
    fn test_parse_value() {
        let crawler = BlackRock::new(config::Source::default());
        assert_eq!(crawler.parse_value(PAGE).unwrap(), 118.5825);
    }

    #[test]
    fn test_parse_value_custom_selector() {
        let crawler = BlackRock::new(config::Source {
            selector: "li.header-nav-data:nth-of-type(3)".to_string(),
            ..Default::default()
        });
        assert_eq!(crawler.parse_value(PAGE).unwrap(), 0.01);
    }

    #[test]
    fn test_parse_value_missing_element() {
        let crawler = BlackRock::new(config::Source::default());
        assert!(crawler
            .parse_value("<html><body><p>Maintenance</p></body></html>")
            .is_err());
    }

    #[test]
    fn test_parse_value_without_number() {
        let crawler = BlackRock::new(config::Source::default());
        let page = r#"<div class="header-nav-data">USD -</div>"#;
        assert!(crawler.parse_value(page).is_err());
    }

    #[test]
    fn test_parse_value_rejects_decimal_comma() {
        let crawler = BlackRock::new(config::Source::default());
        let page = r#"<div class="header-nav-data">USD 118,5825</div>"#;
        assert!(crawler.parse_value(page).is_err());
    }

    #[tokio::test]
    #[ignore]
    async fn test_fetch() {
        dotenv::dotenv().ok();
        let _ = rustls::crypto::ring::default_provider().install_default();
        let crawler = BlackRock::new(config::Source::default());
        match crawler.fetch().await {
            Ok(sample) => {
                dbg!(&sample);
                logging::debug_file_async(format!("sample : {:#?}", sample));
            }
            Err(why) => {
                logging::debug_file_async(format!("Failed to fetch because {:?}", why));
            }
        }
    }
}
