use crate::domain::market::{IndexSymbol, INDEX_SYMBOLS, NEWS_SYMBOLS};
use crate::ingest::news::NewsSourceKind;
use crate::llm::{self, GenerationCandidate};
use crate::pipeline::ExitPolicy;
use anyhow::Context;

const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_REPORT_LANGUAGE: &str = "Korean";
const DEFAULT_UTC_OFFSET_HOURS: i32 = 9;

#[derive(Debug, Clone)]
pub struct Settings {
    pub email_user: Option<String>,
    pub email_password: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: Option<String>,
    pub generation_candidates: Option<String>,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<String>,
    pub news_source: Option<String>,
    pub news_rss_base_url: Option<String>,
    pub quote_base_url: Option<String>,
    pub report_language: Option<String>,
    pub report_utc_offset_hours: Option<String>,
    pub exit_policy: Option<String>,
    pub sentry_dsn: Option<String>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Ok(Self {
            email_user: get("EMAIL_USER"),
            email_password: get("EMAIL_PASSWORD"),
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_base_url: get("GEMINI_BASE_URL"),
            generation_candidates: get("GENERATION_CANDIDATES"),
            smtp_host: get("SMTP_HOST"),
            smtp_port: get("SMTP_PORT"),
            news_source: get("NEWS_SOURCE"),
            news_rss_base_url: get("NEWS_RSS_BASE_URL"),
            quote_base_url: get("QUOTE_BASE_URL"),
            report_language: get("REPORT_LANGUAGE"),
            report_utc_offset_hours: get("REPORT_UTC_OFFSET_HOURS"),
            exit_policy: get("EXIT_POLICY"),
            sentry_dsn: get("SENTRY_DSN"),
        })
    }

    pub fn require_email_user(&self) -> anyhow::Result<&str> {
        self.email_user.as_deref().context("EMAIL_USER is required")
    }

    pub fn require_email_password(&self) -> anyhow::Result<&str> {
        self.email_password
            .as_deref()
            .context("EMAIL_PASSWORD is required")
    }

    pub fn require_gemini_api_key(&self) -> anyhow::Result<&str> {
        self.gemini_api_key
            .as_deref()
            .context("GEMINI_API_KEY is required")
    }

    /// Checks every secret the run needs before any network traffic happens.
    pub fn require_secrets(&self) -> anyhow::Result<()> {
        self.require_email_user()?;
        self.require_email_password()?;
        self.require_gemini_api_key()?;
        Ok(())
    }

    pub fn smtp_host(&self) -> &str {
        self.smtp_host.as_deref().unwrap_or(DEFAULT_SMTP_HOST)
    }

    pub fn smtp_port(&self) -> anyhow::Result<u16> {
        match self.smtp_port.as_deref() {
            Some(s) => s
                .trim()
                .parse::<u16>()
                .with_context(|| format!("SMTP_PORT must be a port number (got {s})")),
            None => Ok(DEFAULT_SMTP_PORT),
        }
    }

    pub fn report_utc_offset_hours(&self) -> anyhow::Result<i32> {
        match self.report_utc_offset_hours.as_deref() {
            Some(s) => {
                let hours = s
                    .trim()
                    .parse::<i32>()
                    .with_context(|| format!("REPORT_UTC_OFFSET_HOURS must be an integer (got {s})"))?;
                anyhow::ensure!(
                    (-12..=14).contains(&hours),
                    "REPORT_UTC_OFFSET_HOURS must be in -12..=14 (got {hours})"
                );
                Ok(hours)
            }
            None => Ok(DEFAULT_UTC_OFFSET_HOURS),
        }
    }

    pub fn exit_policy(&self) -> anyhow::Result<ExitPolicy> {
        match self.exit_policy.as_deref() {
            Some(s) => s.parse(),
            None => Ok(ExitPolicy::default()),
        }
    }
}

/// Everything a run needs besides secrets and transports. Built once at startup.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub index_symbols: Vec<IndexSymbol>,
    pub news_symbols: Vec<String>,
    pub candidates: Vec<GenerationCandidate>,
    pub news_source: NewsSourceKind,
    pub language: String,
}

impl ReportConfig {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let base_url = settings
            .gemini_base_url
            .as_deref()
            .unwrap_or(llm::DEFAULT_BASE_URL);

        let candidates = match settings.generation_candidates.as_deref() {
            Some(list) => llm::parse_candidates(list, base_url)?,
            None => llm::default_candidates(base_url),
        };

        let news_source = match settings.news_source.as_deref() {
            Some(s) => s.parse()?,
            None => NewsSourceKind::default(),
        };

        Ok(Self {
            index_symbols: INDEX_SYMBOLS
                .iter()
                .map(|(name, ticker)| IndexSymbol::new(*name, *ticker))
                .collect(),
            news_symbols: NEWS_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            candidates,
            news_source,
            language: settings
                .report_language
                .clone()
                .unwrap_or_else(|| DEFAULT_REPORT_LANGUAGE.to_string()),
        })
    }
}
