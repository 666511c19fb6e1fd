use crate::config::Settings;
use crate::domain::market::Headline;
use crate::ingest::quotes::{DEFAULT_QUOTE_BASE_URL, USER_AGENT};
use crate::ingest::types::{NewsItem, RssDocument, SearchResponse};
use crate::report::html;
use anyhow::{Context, Result};
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_RSS_BASE_URL: &str = "https://news.google.com";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[async_trait::async_trait]
pub trait NewsSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    /// Most recent items first.
    async fn fetch_news(&self, symbol: &str) -> Result<Vec<NewsItem>>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NewsSourceKind {
    #[default]
    Rss,
    Yahoo,
}

impl FromStr for NewsSourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rss" | "google" => Ok(Self::Rss),
            "yahoo" => Ok(Self::Yahoo),
            other => anyhow::bail!("NEWS_SOURCE must be rss or yahoo (got {other})"),
        }
    }
}

pub fn build_news_source(settings: &Settings, kind: NewsSourceKind) -> Result<Box<dyn NewsSource>> {
    let timeout_secs = std::env::var("NEWS_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build news http client")?;

    Ok(match kind {
        NewsSourceKind::Rss => Box::new(RssSearchClient {
            http,
            base_url: settings
                .news_rss_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_RSS_BASE_URL.to_string()),
        }),
        NewsSourceKind::Yahoo => Box::new(YahooNewsClient {
            http,
            base_url: settings
                .quote_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_QUOTE_BASE_URL.to_string()),
        }),
    })
}

/// Public RSS search feed keyed by `"<symbol> stock"`.
#[derive(Debug, Clone)]
pub struct RssSearchClient {
    http: reqwest::Client,
    base_url: String,
}

impl RssSearchClient {
    /// `GET {base}/rss/search?q=<symbol>+stock&hl=en-US&gl=US&ceid=US:en`
    fn search_request(&self, symbol: &str) -> reqwest::Result<reqwest::Request> {
        let url = format!("{}/rss/search", self.base_url.trim_end_matches('/'));
        let query = format!("{symbol} stock");
        self.http
            .get(url)
            .query(&[
                ("q", query.as_str()),
                ("hl", "en-US"),
                ("gl", "US"),
                ("ceid", "US:en"),
            ])
            .build()
    }
}

#[async_trait::async_trait]
impl NewsSource for RssSearchClient {
    fn source_name(&self) -> &'static str {
        "rss_search"
    }

    async fn fetch_news(&self, symbol: &str) -> Result<Vec<NewsItem>> {
        let request = self
            .search_request(symbol)
            .context("failed to build rss request")?;
        let res = self
            .http
            .execute(request)
            .await
            .context("rss request failed")?;

        let status = res.status();
        anyhow::ensure!(status.is_success(), "rss HTTP {status}");

        let text = res.text().await.context("failed to read rss response")?;
        let doc = quick_xml::de::from_str::<RssDocument>(&text).context("rss feed is not valid XML")?;
        Ok(doc.channel.items.into_iter().map(NewsItem::from).collect())
    }
}

/// News field of the financial-data provider's search endpoint.
#[derive(Debug, Clone)]
pub struct YahooNewsClient {
    http: reqwest::Client,
    base_url: String,
}

#[async_trait::async_trait]
impl NewsSource for YahooNewsClient {
    fn source_name(&self) -> &'static str {
        "yahoo_search"
    }

    async fn fetch_news(&self, symbol: &str) -> Result<Vec<NewsItem>> {
        let url = format!("{}/v1/finance/search", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .get(url)
            .query(&[("q", symbol), ("quotesCount", "0"), ("newsCount", "3")])
            .send()
            .await
            .context("news search request failed")?;

        let status = res.status();
        anyhow::ensure!(status.is_success(), "news search HTTP {status}");

        let parsed = res
            .json::<SearchResponse>()
            .await
            .context("failed to decode news search response")?;
        Ok(parsed.news.into_iter().map(NewsItem::from).collect())
    }
}

/// First usable item for `symbol`. Failures and empty feeds yield `None`.
pub async fn fetch_headline(source: &dyn NewsSource, symbol: &str) -> Option<Headline> {
    let items = match source.fetch_news(symbol).await {
        Ok(items) => items,
        Err(err) => {
            tracing::warn!(
                %symbol,
                source = source.source_name(),
                error = %format!("{err:#}"),
                "headline fetch failed; skipping symbol"
            );
            return None;
        }
    };

    let item = items.into_iter().next()?;
    let title = item.title.unwrap_or_default().trim().to_string();
    if title.is_empty() {
        tracing::debug!(%symbol, "first news item has no title; skipping symbol");
        return None;
    }

    Some(Headline {
        symbol: symbol.to_string(),
        title,
        link: item.link.unwrap_or_default().trim().to_string(),
    })
}

pub async fn collect_headlines(source: &dyn NewsSource, symbols: &[String]) -> Vec<Headline> {
    let mut out = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        if let Some(headline) = fetch_headline(source, symbol).await {
            out.push(headline);
        }
    }
    tracing::info!(
        collected = out.len(),
        requested = symbols.len(),
        source = source.source_name(),
        "headlines collected"
    );
    out
}

pub fn render_headline(headline: &Headline) -> String {
    let title = html::escape(&headline.title);
    if headline.link.is_empty() {
        format!("<li>[{}] {}</li>", html::escape(&headline.symbol), title)
    } else {
        format!(
            "<li>[{}] <a href=\"{}\">{}</a></li>",
            html::escape(&headline.symbol),
            html::escape(&headline.link),
            title
        )
    }
}

pub fn render_headline_fragment(headlines: &[Headline]) -> String {
    headlines
        .iter()
        .map(render_headline)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct ScriptedNews {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl NewsSource for ScriptedNews {
        fn source_name(&self) -> &'static str {
            "scripted"
        }

        async fn fetch_news(&self, symbol: &str) -> Result<Vec<NewsItem>> {
            self.seen.lock().unwrap().push(symbol.to_string());
            match symbol {
                "AAA" => Ok(vec![
                    NewsItem {
                        title: Some("First <story>".to_string()),
                        link: Some("https://example.com/1?a=1&b=2".to_string()),
                    },
                    NewsItem {
                        title: Some("Second".to_string()),
                        link: None,
                    },
                ]),
                "BBB" => anyhow::bail!("connection reset"),
                "CCC" => Ok(vec![]),
                "DDD" => Ok(vec![NewsItem {
                    title: Some("No link".to_string()),
                    link: None,
                }]),
                _ => Ok(vec![NewsItem::default()]),
            }
        }
    }

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn takes_first_item_and_isolates_failures() {
        let source = ScriptedNews {
            seen: Mutex::new(Vec::new()),
        };
        let headlines =
            collect_headlines(&source, &symbols(&["AAA", "BBB", "CCC", "DDD", "EEE"])).await;

        assert_eq!(
            *source.seen.lock().unwrap(),
            symbols(&["AAA", "BBB", "CCC", "DDD", "EEE"])
        );
        assert_eq!(headlines.len(), 2);
        assert_eq!(headlines[0].symbol, "AAA");
        assert_eq!(headlines[0].title, "First <story>");
        assert_eq!(headlines[1].symbol, "DDD");
        assert_eq!(headlines[1].link, "");
    }

    #[test]
    fn renders_escaped_title_and_link() {
        let fragment = render_headline_fragment(&[
            Headline {
                symbol: "AAA".to_string(),
                title: "First <story>".to_string(),
                link: "https://example.com/1?a=1&b=2".to_string(),
            },
            Headline {
                symbol: "DDD".to_string(),
                title: "No link".to_string(),
                link: String::new(),
            },
        ]);
        assert_eq!(
            fragment,
            "<li>[AAA] <a href=\"https://example.com/1?a=1&amp;b=2\">First &lt;story&gt;</a></li>\n<li>[DDD] No link</li>"
        );
    }

    #[test]
    fn no_headlines_render_empty() {
        assert_eq!(render_headline_fragment(&[]), "");
    }

    #[test]
    fn rss_request_targets_us_english_search() {
        let client = RssSearchClient {
            http: reqwest::Client::new(),
            base_url: "https://news.test/".to_string(),
        };
        let request = client.search_request("NVDA").unwrap();

        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(
            request.url().as_str(),
            "https://news.test/rss/search?q=NVDA+stock&hl=en-US&gl=US&ceid=US%3Aen"
        );
        let pairs: Vec<(String, String)> = request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(pairs[0], ("q".to_string(), "NVDA stock".to_string()));
        assert_eq!(pairs[3], ("ceid".to_string(), "US:en".to_string()));
    }

    #[test]
    fn parses_source_kind() {
        assert_eq!("RSS".parse::<NewsSourceKind>().unwrap(), NewsSourceKind::Rss);
        assert_eq!(" yahoo ".parse::<NewsSourceKind>().unwrap(), NewsSourceKind::Yahoo);
        assert!("bing".parse::<NewsSourceKind>().is_err());
    }
}
