//! DuckDuckGo search client
//!
//! Queries the HTML endpoint and scrapes the result list. Basic searches run with
//! worldwide defaults; detailed searches pass region, recency and the news filter.

use crate::config::SearchConfig;
use crate::error::{MarketError, Result};
use crate::search::{SearchMode, SearchRequest};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

/// Region code DuckDuckGo uses for "no region"
const WORLDWIDE_REGION: &str = "wt-wt";

/// One search result record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchHit {
    /// Result headline
    pub title: String,
    /// Short excerpt
    pub snippet: String,
    /// Destination URL
    pub link: String,
}

/// A search provider
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run a normalized search and return ordered results
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// DuckDuckGo HTML search client
pub struct DuckDuckGoClient {
    client: Client,
    base_url: String,
}

impl DuckDuckGoClient {
    /// Create a client from search settings
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Query string parameters for a request
    fn query_params(request: &SearchRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![("q", request.query.clone())];

        match request.mode {
            SearchMode::Basic => {
                params.push(("kl", WORLDWIDE_REGION.to_string()));
            }
            SearchMode::Detailed => {
                params.push(("kl", region_code(&request.region)));
                params.push(("df", request.recency.code().to_string()));
                if request.backend.eq_ignore_ascii_case("news") {
                    params.push(("iar", "news".to_string()));
                }
            }
        }

        params
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoClient {
    #[instrument(skip(self, request), fields(query = %request.query, mode = ?request.mode))]
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>> {
        debug!("Sending search request to DuckDuckGo");

        let response = self
            .client
            .get(&self.base_url)
            .query(&Self::query_params(request))
            .send()
            .await
            .map_err(|e| MarketError::SearchError(format!("DuckDuckGo request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(MarketError::SearchError(format!(
                "DuckDuckGo returned HTTP {status}"
            )));
        }

        let body = response.text().await?;
        let hits = parse_results(&body, request.max_results)?;

        debug!("DuckDuckGo returned {} results", hits.len());
        Ok(hits)
    }

    fn name(&self) -> &'static str {
        "duckduckgo"
    }
}

/// Map the caller's region onto a DuckDuckGo `kl` code
fn region_code(region: &str) -> String {
    let region = region.trim();
    if region.is_empty() || region.eq_ignore_ascii_case("all") {
        WORLDWIDE_REGION.to_string()
    } else {
        region.to_ascii_lowercase()
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| MarketError::SearchError(format!("Bad selector {css}: {e}")))
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract result records from a DuckDuckGo HTML page, skipping ads
///
/// `limit` of 0 keeps every result.
pub fn parse_results(html: &str, limit: usize) -> Result<Vec<SearchHit>> {
    let document = Html::parse_document(html);
    let result_selector = selector("div.result")?;
    let title_selector = selector("a.result__a")?;
    let snippet_selector = selector(".result__snippet")?;

    let hits = document
        .select(&result_selector)
        .filter(|result| !result.value().classes().any(|c| c == "result--ad"))
        .filter_map(|result| {
            let anchor = result.select(&title_selector).next()?;
            let href = anchor.value().attr("href")?;
            Some(SearchHit {
                title: element_text(anchor),
                snippet: result
                    .select(&snippet_selector)
                    .next()
                    .map(element_text)
                    .unwrap_or_default(),
                link: resolve_link(href),
            })
        });

    Ok(if limit == 0 {
        hits.collect()
    } else {
        hits.take(limit).collect()
    })
}

/// Unwrap DuckDuckGo redirect links (`/l/?uddg=<target>`) into their target
fn resolve_link(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{href}")
    } else {
        href.to_string()
    };

    match Url::parse(&absolute) {
        Ok(url) if url.path().starts_with("/l/") => url
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map_or(absolute.clone(), |(_, target)| target.into_owned()),
        _ => absolute,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::Recency;
    use httpmock::{Method::GET, MockServer};
    use std::time::Duration;

    const RESULTS_PAGE: &str = r#"
        <html><body>
          <div class="result results_links result--ad">
            <a class="result__a" href="https://ads.example.com">Sponsored</a>
            <a class="result__snippet">Buy now</a>
          </div>
          <div class="result results_links">
            <h2><a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fnews.example.com%2Fnvs&amp;rut=abc">Novartis  shares rise</a></h2>
            <a class="result__snippet">Novartis stock gained
              after trial data.</a>
          </div>
          <div class="result results_links">
            <h2><a class="result__a" href="https://markets.example.com/nvs">NVS outlook</a></h2>
            <a class="result__snippet">Analysts weigh in.</a>
          </div>
        </body></html>
    "#;

    fn config(base_url: String) -> SearchConfig {
        SearchConfig {
            base_url,
            request_timeout: Duration::from_secs(5),
            ..SearchConfig::default()
        }
    }

    #[test]
    fn test_parse_results_skips_ads_and_unwraps_links() {
        let hits = parse_results(RESULTS_PAGE, 0).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Novartis shares rise");
        assert_eq!(hits[0].snippet, "Novartis stock gained after trial data.");
        assert_eq!(hits[0].link, "https://news.example.com/nvs");
        assert_eq!(hits[1].link, "https://markets.example.com/nvs");
    }

    #[test]
    fn test_parse_results_honors_limit() {
        let hits = parse_results(RESULTS_PAGE, 1).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(parse_results("<html></html>", 5).unwrap().is_empty());
    }

    #[test]
    fn test_query_params_by_mode() {
        let mut request = SearchRequest::with_query("NVS news");
        request.recency = Recency::Week;
        request.region = "us-en".to_string();

        let detailed = DuckDuckGoClient::query_params(&request);
        assert!(detailed.contains(&("kl", "us-en".to_string())));
        assert!(detailed.contains(&("df", "w".to_string())));
        assert!(detailed.contains(&("iar", "news".to_string())));

        request.mode = SearchMode::Basic;
        let basic = DuckDuckGoClient::query_params(&request);
        assert_eq!(
            basic,
            vec![("q", "NVS news".to_string()), ("kl", "wt-wt".to_string())]
        );
    }

    #[test]
    fn test_region_code() {
        assert_eq!(region_code("all"), "wt-wt");
        assert_eq!(region_code(""), "wt-wt");
        assert_eq!(region_code("DE-de"), "de-de");
    }

    #[tokio::test]
    async fn test_search_sends_expected_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/html/")
                    .query_param("q", "NVS stock news")
                    .query_param("kl", "wt-wt")
                    .query_param("df", "d")
                    .query_param("iar", "news");
                then.status(200).body(RESULTS_PAGE);
            })
            .await;

        let client = DuckDuckGoClient::new(&config(server.url("/html/"))).unwrap();
        let hits = client
            .search(&SearchRequest::with_query("NVS stock news"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_search_http_error_is_search_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/html/");
                then.status(503);
            })
            .await;

        let client = DuckDuckGoClient::new(&config(server.url("/html/"))).unwrap();
        let result = client.search(&SearchRequest::with_query("x")).await;

        match result {
            Err(MarketError::SearchError(msg)) => assert!(msg.contains("503")),
            other => panic!("Expected SearchError, got {other:?}"),
        }
    }
}
