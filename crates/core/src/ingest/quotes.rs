use crate::config::Settings;
use crate::domain::market::{IndexSymbol, QuoteSample};
use crate::ingest::types::ChartResponse;
use crate::report::html;
use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_QUOTE_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
// A few sessions so that weekends and holidays still leave two closes.
const DEFAULT_RANGE: &str = "5d";
pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (compatible; market-report/0.1)";

#[async_trait::async_trait]
pub trait QuoteSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    /// Recent daily closes for `ticker`, oldest first.
    async fn fetch_daily_closes(&self, ticker: &str) -> Result<Vec<f64>>;
}

#[derive(Debug, Clone)]
pub struct YahooChartClient {
    http: reqwest::Client,
    base_url: String,
    range: String,
}

impl YahooChartClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings
            .quote_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_QUOTE_BASE_URL.to_string());

        let timeout_secs = std::env::var("QUOTE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let range = std::env::var("QUOTE_RANGE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_RANGE.to_string());

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build quote http client")?;

        Ok(Self {
            http,
            base_url,
            range,
        })
    }

    fn url(&self, ticker: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}",
            self.base_url.trim_end_matches('/'),
            ticker
        )
    }
}

#[async_trait::async_trait]
impl QuoteSource for YahooChartClient {
    fn source_name(&self) -> &'static str {
        "yahoo_chart"
    }

    async fn fetch_daily_closes(&self, ticker: &str) -> Result<Vec<f64>> {
        let res = self
            .http
            .get(self.url(ticker))
            .query(&[("range", self.range.as_str()), ("interval", "1d")])
            .send()
            .await
            .context("quote request failed")?;

        let status = res.status();
        let text = res.text().await.context("failed to read quote response")?;
        let parsed = serde_json::from_str::<ChartResponse>(&text)
            .with_context(|| format!("quote response is not a chart payload (HTTP {status})"))?;
        let closes = parsed.into_closes()?;

        if !status.is_success() {
            anyhow::bail!("quote HTTP {status}");
        }
        Ok(closes)
    }
}

/// One symbol, best effort. Any failure or a short history yields `None`.
pub async fn fetch_quote(source: &dyn QuoteSource, symbol: &IndexSymbol) -> Option<QuoteSample> {
    match source.fetch_daily_closes(&symbol.ticker).await {
        Ok(closes) => {
            let sample = QuoteSample::from_closes(&symbol.name, &closes);
            if sample.is_none() {
                tracing::warn!(
                    ticker = %symbol.ticker,
                    sessions = closes.len(),
                    "no two usable closes; skipping index"
                );
            }
            sample
        }
        Err(err) => {
            tracing::warn!(
                ticker = %symbol.ticker,
                source = source.source_name(),
                error = %format!("{err:#}"),
                "quote fetch failed; skipping index"
            );
            None
        }
    }
}

/// Samples for every symbol that produced one, in `symbols` order. Never fails.
pub async fn collect_quotes(source: &dyn QuoteSource, symbols: &[IndexSymbol]) -> Vec<QuoteSample> {
    let mut out = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        if let Some(sample) = fetch_quote(source, symbol).await {
            out.push(sample);
        }
    }
    tracing::info!(
        collected = out.len(),
        requested = symbols.len(),
        "index quotes collected"
    );
    out
}

/// `<span style="color:..">▲ S&amp;P 500: 5,123.45 (+1.23%)</span>`
pub fn render_quote_line(sample: &QuoteSample) -> String {
    let direction = sample.direction();
    format!(
        "<span style=\"color:{}\">{} {}: {} ({:+.2}%)</span>",
        direction.color(),
        direction.arrow(),
        html::escape(&sample.symbol_name),
        format_price(sample.last_close),
        sample.percent_change()
    )
}

pub fn render_quote_fragment(samples: &[QuoteSample]) -> String {
    samples
        .iter()
        .map(render_quote_line)
        .collect::<Vec<_>>()
        .join("<br>\n")
}

/// Two decimals with thousands separators.
pub fn format_price(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i != 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedQuotes {
        closes: HashMap<&'static str, Result<Vec<f64>, &'static str>>,
        calls: AtomicUsize,
    }

    impl FixedQuotes {
        fn new(entries: Vec<(&'static str, Result<Vec<f64>, &'static str>)>) -> Self {
            Self {
                closes: entries.into_iter().collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl QuoteSource for FixedQuotes {
        fn source_name(&self) -> &'static str {
            "fixed"
        }

        async fn fetch_daily_closes(&self, ticker: &str) -> Result<Vec<f64>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.closes.get(ticker) {
                Some(Ok(v)) => Ok(v.clone()),
                Some(Err(e)) => Err(anyhow::anyhow!(*e)),
                None => Ok(Vec::new()),
            }
        }
    }

    fn symbols() -> Vec<IndexSymbol> {
        vec![
            IndexSymbol::new("Alpha", "^A"),
            IndexSymbol::new("Beta", "^B"),
            IndexSymbol::new("Gamma", "^C"),
            IndexSymbol::new("Delta", "^D"),
        ]
    }

    #[tokio::test]
    async fn short_history_and_failures_are_omitted_in_order() {
        let source = FixedQuotes::new(vec![
            ("^A", Ok(vec![100.0, 101.0])),
            ("^B", Ok(vec![100.0])),
            ("^C", Err("timeout")),
            ("^D", Ok(vec![200.0, 190.0])),
        ]);

        let samples = collect_quotes(&source, &symbols()).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 4);
        let names: Vec<_> = samples.iter().map(|s| s.symbol_name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Delta"]);
        assert!((samples[0].percent_change() - 1.0).abs() < 1e-9);
        assert!((samples[1].percent_change() + 5.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn zero_prior_close_never_reaches_the_fragment() {
        let source = FixedQuotes::new(vec![
            ("^A", Ok(vec![0.0, 10.0])),
            ("^B", Ok(vec![0.0, 0.0])),
            ("^C", Ok(vec![50.0, 55.0])),
        ]);

        let samples = collect_quotes(&source, &symbols()).await;
        let fragment = render_quote_fragment(&samples);

        assert_eq!(samples.len(), 1);
        assert!(fragment.contains("Gamma: 55.00 (+10.00%)"));
        assert!(!fragment.contains("inf"));
        assert!(!fragment.contains("NaN"));
    }

    #[tokio::test]
    async fn empty_collection_renders_empty_fragment() {
        let source = FixedQuotes::new(vec![]);
        let samples = collect_quotes(&source, &symbols()).await;
        assert!(samples.is_empty());
        assert_eq!(render_quote_fragment(&samples), "");
    }

    #[test]
    fn renders_up_and_down_colors() {
        let up = QuoteSample::from_closes("X", &[100.0, 110.0]).unwrap();
        let flat = QuoteSample::from_closes("Y", &[100.0, 100.0]).unwrap();
        let down = QuoteSample::from_closes("S&P 500", &[5000.0, 4750.0]).unwrap();

        let up_line = render_quote_line(&up);
        assert!(up_line.contains("+10.00%"));
        assert!(up_line.contains("#d32f2f"));

        assert!(render_quote_line(&flat).contains("#1565c0"));

        let down_line = render_quote_line(&down);
        assert!(down_line.contains("-5.00%"));
        assert!(down_line.contains("#1565c0"));
        assert!(down_line.contains("S&amp;P 500: 4,750.00"));
    }

    #[test]
    fn fragment_joins_lines_with_breaks() {
        let a = QuoteSample::from_closes("A", &[1.0, 2.0]).unwrap();
        let b = QuoteSample::from_closes("B", &[2.0, 1.0]).unwrap();
        let fragment = render_quote_fragment(&[a, b]);
        assert_eq!(fragment.matches("<br>\n").count(), 1);
        assert!(fragment.find("A:").unwrap() < fragment.find("B:").unwrap());
    }

    #[test]
    fn formats_prices_with_grouping() {
        assert_eq!(format_price(0.0), "0.00");
        assert_eq!(format_price(999.999), "1,000.00");
        assert_eq!(format_price(42123.456), "42,123.46");
        assert_eq!(format_price(1234567.0), "1,234,567.00");
        assert_eq!(format_price(-1234.5), "-1,234.50");
    }
}
