use serde::Deserialize;

// Yahoo Finance chart endpoint (v8/finance/chart/{ticker}).

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartBody {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<YahooError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    pub indicators: ChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<QuoteIndicator>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteIndicator {
    /// Oldest first; sessions without a print come back as null.
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YahooError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ChartResponse {
    pub fn into_closes(self) -> anyhow::Result<Vec<f64>> {
        if let Some(err) = self.chart.error {
            anyhow::bail!(
                "chart error {}: {}",
                err.code.unwrap_or_default(),
                err.description.unwrap_or_default()
            );
        }

        let closes = self
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .and_then(|r| r.indicators.quote.into_iter().next())
            .map(|q| q.close.into_iter().flatten().collect())
            .unwrap_or_default();
        Ok(closes)
    }
}

// Yahoo Finance search endpoint (v1/finance/search), news field only.

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub news: Vec<SearchNewsItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchNewsItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

// RSS 2.0 search feed. Only the fields the report reads are mapped.

#[derive(Debug, Clone, Deserialize)]
pub struct RssDocument {
    pub channel: RssChannel,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RssChannel {
    #[serde(default, rename = "item")]
    pub items: Vec<RssItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RssItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// Source-neutral news entry; fields are whatever the source supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsItem {
    pub title: Option<String>,
    pub link: Option<String>,
}

impl From<SearchNewsItem> for NewsItem {
    fn from(item: SearchNewsItem) -> Self {
        Self {
            title: item.title,
            link: item.link,
        }
    }
}

impl From<RssItem> for NewsItem {
    fn from(item: RssItem) -> Self {
        Self {
            title: item.title,
            link: item.link,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chart_closes_skip_null_sessions() {
        let v = json!({
            "chart": {
                "result": [{
                    "meta": {"symbol": "^GSPC"},
                    "timestamp": [1, 2, 3],
                    "indicators": {"quote": [{"close": [5000.5, null, 5100.25], "open": [1, 2, 3]}]}
                }],
                "error": null
            }
        });
        let parsed: ChartResponse = serde_json::from_value(v).unwrap();
        assert_eq!(parsed.into_closes().unwrap(), vec![5000.5, 5100.25]);
    }

    #[test]
    fn chart_error_payload_is_an_error() {
        let v = json!({
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
            }
        });
        let parsed: ChartResponse = serde_json::from_value(v).unwrap();
        let err = parsed.into_closes().unwrap_err();
        assert!(err.to_string().contains("delisted"));
    }

    #[test]
    fn search_news_tolerates_missing_fields() {
        let v = json!({"quotes": [], "news": [{"uuid": "a", "publisher": "Reuters"}]});
        let parsed: SearchResponse = serde_json::from_value(v).unwrap();
        assert_eq!(parsed.news.len(), 1);
        assert!(parsed.news[0].title.is_none());
    }

    #[test]
    fn rss_items_parse_with_extra_elements() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>"NVDA stock" - Google News</title>
    <link>https://news.google.com/search?q=NVDA+stock</link>
    <item>
      <title>Nvidia rallies &amp; chip stocks follow</title>
      <link>https://example.com/a</link>
      <pubDate>Mon, 12 Oct 2026 13:00:00 GMT</pubDate>
      <source url="https://example.com">Example</source>
    </item>
    <item>
      <title>Second item</title>
      <link>https://example.com/b</link>
    </item>
  </channel>
</rss>"#;
        let doc: RssDocument = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(doc.channel.items.len(), 2);
        assert_eq!(
            doc.channel.items[0].title.as_deref(),
            Some("Nvidia rallies & chip stocks follow")
        );
        assert_eq!(doc.channel.items[0].link.as_deref(), Some("https://example.com/a"));
    }

    #[test]
    fn rss_without_items_is_empty() {
        let xml = r#"<rss version="2.0"><channel><title>empty</title></channel></rss>"#;
        let doc: RssDocument = quick_xml::de::from_str(xml).unwrap();
        assert!(doc.channel.items.is_empty());
    }
}
