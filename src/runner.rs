use crate::analyzer::{PriceTracker, UpsertOutcome};
use crate::config::{AppConfig, StoreConfig};
use crate::model::{FatalError, PriceDocument};
use crate::normalizer::normalize_all;
use crate::parser::ProductParser;
use crate::scraper::Scraper;
use crate::storage::{DocumentStore, SqliteStore};
use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

/// Counters for one batch run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub urls: usize,
    pub scraped: usize,
    pub skipped: usize,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Updated => self.updated += 1,
            UpsertOutcome::Unchanged => self.unchanged += 1,
            UpsertOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Runs one batch: connect, load seed urls, scrape each page in order, upsert, close.
///
/// Only store connection and seed lookup are fatal. Every per-product problem is
/// logged and skipped.
pub async fn run<S, P>(
    config: &AppConfig,
    store_config: &StoreConfig,
    scraper: &S,
    parser: &P,
    today: NaiveDate,
) -> Result<RunSummary, FatalError>
where
    S: Scraper + ?Sized,
    P: ProductParser + ?Sized,
{
    let store = SqliteStore::connect(store_config).map_err(FatalError::Connect)?;

    let urls = match store.load_seed_urls(&config.seed_document_id) {
        Ok(urls) => urls,
        Err(e) => {
            close_store(store);
            return Err(FatalError::Seed(e));
        }
    };
    info!("Loaded {} product urls", urls.len());

    let urls = normalize_all(&urls);
    let mut summary = RunSummary {
        urls: urls.len(),
        ..RunSummary::default()
    };

    let documents = collect_documents(scraper, parser, &urls, today).await;
    summary.scraped = documents.len();
    summary.skipped = urls.len() - documents.len();

    let tracker = PriceTracker::new(config.price_comparison);
    upsert_all(&store, &tracker, &documents, &mut summary);

    close_store(store);
    info!(
        "Run finished: {} urls, {} scraped, {} skipped, {} inserted, {} updated, {} unchanged, {} failed",
        summary.urls,
        summary.scraped,
        summary.skipped,
        summary.inserted,
        summary.updated,
        summary.unchanged,
        summary.failed
    );

    Ok(summary)
}

/// Fetches and parses every url in order, keeping only pages with all fields present.
pub async fn collect_documents<S, P>(
    scraper: &S,
    parser: &P,
    urls: &[String],
    today: NaiveDate,
) -> Vec<PriceDocument>
where
    S: Scraper + ?Sized,
    P: ProductParser + ?Sized,
{
    let mut documents = Vec::new();

    for url in urls {
        let html = match scraper.fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Unable to get product details for {}: {}", url, e);
                continue;
            }
        };

        debug!("Fetching product details for {}", url);
        match parser.parse(&html).into_document(today) {
            Ok(doc) => documents.push(doc),
            Err(e) => debug!("Skipping {}: {}", url, e),
        }
    }

    documents
}

pub fn upsert_all<D: DocumentStore + ?Sized>(
    store: &D,
    tracker: &PriceTracker,
    documents: &[PriceDocument],
    summary: &mut RunSummary,
) {
    for doc in documents {
        let outcome = tracker.apply(store, doc);
        summary.record(&outcome);
    }
}

fn close_store(store: SqliteStore) {
    if let Err(e) = store.close() {
        error!("Failed to close store: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::PriceComparison;
    use crate::model::ScraperError;
    use crate::parser::ProductPageParser;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const WIDGET_PAGE: &str = r#"
        <div data-auto="product-name">Widget</div>
        <div class="c-strike">$19.99</div>
        <div class="lowest-sale-price"><span class="bold c-red">$14.99</span></div>"#;

    const FULL_PRICE_PAGE: &str = r#"
        <div data-auto="product-name">Gadget</div>
        <div class="c-strike">$29.99</div>"#;

    /// Serves canned pages and remembers which urls were requested.
    #[derive(Default)]
    struct CannedScraper {
        pages: HashMap<String, String>,
        fetched: Mutex<Vec<String>>,
    }

    impl CannedScraper {
        fn with_pages(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, html)| (url.to_string(), html.to_string()))
                    .collect(),
                fetched: Mutex::new(Vec::new()),
            }
        }

        fn fetched(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Scraper for CannedScraper {
        async fn fetch(&self, url: &str) -> Result<String, ScraperError> {
            self.fetched.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or(ScraperError::InvalidResponse(404))
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
    }

    fn config(seed_id: &str) -> AppConfig {
        AppConfig {
            seed_document_id: seed_id.into(),
            ..AppConfig::default()
        }
    }

    fn file_store(dir: &tempfile::TempDir) -> StoreConfig {
        StoreConfig {
            url: dir.path().join("prices.db").to_string_lossy().into_owned(),
        }
    }

    fn seed(store_config: &StoreConfig, seed_id: &str, urls: &[&str]) {
        let store = SqliteStore::connect(store_config).unwrap();
        store.put_seed_document(seed_id, &json!({ "product_urls": urls }));
        store.close().unwrap();
    }

    #[tokio::test]
    async fn run_stores_only_products_on_sale() {
        let dir = tempfile::tempdir().unwrap();
        let store_config = file_store(&dir);
        seed(
            &store_config,
            "seed",
            &[
                "https://shop.example/widget?ID=1&cm_sp=nav",
                "https://shop.example/gadget?ID=2",
            ],
        );
        let scraper = CannedScraper::with_pages(&[
            ("https://shop.example/widget?ID=1", WIDGET_PAGE),
            ("https://shop.example/gadget?ID=2", FULL_PRICE_PAGE),
        ]);

        let summary = run(
            &config("seed"),
            &store_config,
            &scraper,
            &ProductPageParser::new(),
            today(),
        )
        .await
        .unwrap();

        assert_eq!(
            scraper.fetched(),
            vec![
                "https://shop.example/widget?ID=1",
                "https://shop.example/gadget?ID=2",
            ]
        );
        assert_eq!(
            summary,
            RunSummary {
                urls: 2,
                scraped: 1,
                skipped: 1,
                inserted: 1,
                ..RunSummary::default()
            }
        );

        let store = SqliteStore::connect(&store_config).unwrap();
        assert_eq!(
            store.all_documents(),
            vec![PriceDocument {
                product_name: "Widget".into(),
                date: today(),
                original_price: "19.99".into(),
                sale_price: "14.99".into(),
            }]
        );
    }

    #[tokio::test]
    async fn second_run_updates_only_on_lower_price() {
        let dir = tempfile::tempdir().unwrap();
        let store_config = file_store(&dir);
        let url = "https://shop.example/widget?ID=1";
        seed(&store_config, "seed", &[url]);
        let parser = ProductPageParser::new();

        let first = CannedScraper::with_pages(&[(url, WIDGET_PAGE)]);
        run(&config("seed"), &store_config, &first, &parser, today())
            .await
            .unwrap();

        let same = run(&config("seed"), &store_config, &first, &parser, today())
            .await
            .unwrap();
        assert_eq!(same.unchanged, 1);

        let cheaper_page = WIDGET_PAGE.replace("$14.99", "$12.49");
        let cheaper = CannedScraper::with_pages(&[(url, cheaper_page.as_str())]);
        let later = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let summary = run(&config("seed"), &store_config, &cheaper, &parser, later)
            .await
            .unwrap();
        assert_eq!(summary.updated, 1);

        let store = SqliteStore::connect(&store_config).unwrap();
        let stored = store.all_documents();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].sale_price, "12.49");
        assert_eq!(stored[0].date, later);
    }

    #[tokio::test]
    async fn connection_failure_stops_before_any_fetch() {
        let store_config = StoreConfig {
            url: "/nonexistent-dir/deeper/prices.db".into(),
        };
        let scraper = CannedScraper::default();

        let result = run(
            &config("seed"),
            &store_config,
            &scraper,
            &ProductPageParser::new(),
            today(),
        )
        .await;

        assert!(matches!(result, Err(FatalError::Connect(_))));
        assert!(scraper.fetched().is_empty());
    }

    #[tokio::test]
    async fn missing_seed_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let store_config = file_store(&dir);
        let scraper = CannedScraper::default();

        let result = run(
            &config("absent"),
            &store_config,
            &scraper,
            &ProductPageParser::new(),
            today(),
        )
        .await;

        assert!(matches!(result, Err(FatalError::Seed(_))));
        assert!(scraper.fetched().is_empty());
    }

    #[tokio::test]
    async fn fetch_errors_skip_only_that_url() {
        let scraper = CannedScraper::with_pages(&[("https://shop.example/w?ID=1", WIDGET_PAGE)]);
        let urls = vec![
            "https://shop.example/missing?ID=9".to_string(),
            "https://shop.example/w?ID=1".to_string(),
        ];

        let docs = collect_documents(&scraper, &ProductPageParser::new(), &urls, today()).await;

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].product_name, "Widget");
        assert_eq!(scraper.fetched(), urls);
    }

    #[test]
    fn upsert_all_counts_outcomes_in_order() {
        let store = SqliteStore::in_memory();
        let tracker = PriceTracker::new(PriceComparison::Lexicographic);
        let doc = |sale: &str| PriceDocument {
            product_name: "Widget".into(),
            date: today(),
            original_price: "19.99".into(),
            sale_price: sale.into(),
        };
        let mut summary = RunSummary::default();

        upsert_all(
            &store,
            &tracker,
            &[doc("14.99"), doc("14.99"), doc("13.99"), doc("15.99")],
            &mut summary,
        );

        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.unchanged, 2);
        assert_eq!(summary.failed, 0);
        assert_eq!(store.fetch("Widget").unwrap(), Some(doc("13.99")));
    }
}
