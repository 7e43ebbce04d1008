// Product page HTML parsing
use crate::model::{ParserError, PriceDocument, PricePair};
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

const NAME_SELECTOR: &str = r#"div[data-auto="product-name"]"#;
const ORIGINAL_PRICE_SELECTOR: &str = "div.c-strike";
const SALE_CONTAINER_SELECTOR: &str = "div.lowest-sale-price";
// Whole class attribute must equal "bold c-red", not just contain both classes.
const SALE_PRICE_SELECTOR: &str = r#"span[class="bold c-red"]"#;

/// Per-field outcome of parsing one product page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductExtraction {
    pub name: Result<String, ParserError>,
    /// Both prices or neither: a page without an active sale has no usable prices.
    pub prices: Result<PricePair, ParserError>,
}

impl ProductExtraction {
    /// Combines the fields into a document dated `date`, or returns the first missing field.
    pub fn into_document(self, date: NaiveDate) -> Result<PriceDocument, ParserError> {
        let product_name = self.name?;
        let PricePair {
            original_price,
            sale_price,
        } = self.prices?;

        Ok(PriceDocument {
            product_name,
            date,
            original_price,
            sale_price,
        })
    }
}

pub trait ProductParser {
    fn parse(&self, html: &str) -> ProductExtraction;
}

pub struct ProductPageParser;

impl ProductPageParser {
    pub fn new() -> Self {
        Self
    }

    fn product_name(document: &Html) -> Result<String, ParserError> {
        let selector = selector(NAME_SELECTOR)?;
        document
            .select(&selector)
            .next()
            .map(stripped_text)
            .ok_or_else(|| ParserError::MissingField("product_name".into()))
    }

    fn prices(document: &Html) -> Result<PricePair, ParserError> {
        let original_selector = selector(ORIGINAL_PRICE_SELECTOR)?;
        let container_selector = selector(SALE_CONTAINER_SELECTOR)?;
        let sale_selector = selector(SALE_PRICE_SELECTOR)?;

        let sale_node = document
            .select(&container_selector)
            .next()
            .and_then(|container| container.select(&sale_selector).next());
        let Some(sale_node) = sale_node else {
            debug!("No sales");
            return Err(ParserError::NotOnSale);
        };

        let original_node = document
            .select(&original_selector)
            .next()
            .ok_or_else(|| ParserError::MissingField("original_price".into()))?;

        Ok(PricePair {
            original_price: strip_currency(&stripped_text(original_node)),
            sale_price: strip_currency(&stripped_text(sale_node)),
        })
    }
}

impl Default for ProductPageParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductParser for ProductPageParser {
    fn parse(&self, html: &str) -> ProductExtraction {
        let document = Html::parse_document(html);
        ProductExtraction {
            name: Self::product_name(&document),
            prices: Self::prices(&document),
        }
    }
}

fn selector(css: &str) -> Result<Selector, ParserError> {
    Selector::parse(css).map_err(|e| ParserError::HtmlParseError(e.to_string()))
}

/// Text of every descendant, each piece trimmed, joined without separator.
fn stripped_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

fn strip_currency(price: &str) -> String {
    price.replace('$', "")
}
