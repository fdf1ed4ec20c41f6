use anyhow::{anyhow, Result};
use scraper::{Html, Selector};

/// Returns the trimmed text of the first element in `document` matching `css_selector`.
///
/// Text of nested nodes is concatenated before trimming, so
/// `<span class="value">USD <b>118.58</b></span>` yields `"USD 118.58"`.
///
/// # Errors
///
/// An invalid selector, or a selector that matches nothing, is reported as an error that
/// names the selector and the page `url` it was applied to.
pub fn get_one_element_text(document: &Html, css_selector: &str, url: &str) -> Result<String> {
    let selector = Selector::parse(css_selector)
        .map_err(|why| anyhow!("Failed to Selector::parse({}) because: {:?}", css_selector, why))?;

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .ok_or_else(|| anyhow!("The element({}) not found from {}", css_selector, url))
}
