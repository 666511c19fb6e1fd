use crate::config::ReportConfig;
use crate::domain::report::{OutboundMessage, Report, ReportOrigin};
use crate::ingest::news::{collect_headlines, render_headline_fragment, NewsSource};
use crate::ingest::quotes::{collect_quotes, render_quote_fragment, QuoteSource};
use crate::llm::{FallbackChain, GenerationBackend, GenerationResult};
use crate::mail::{self, MailTransport};
use crate::report::{build_prompt, render_fallback};
use chrono::NaiveDate;
use std::str::FromStr;

/// The read-only external collaborators of one run.
pub struct Sources<'a> {
    pub quotes: &'a dyn QuoteSource,
    pub news: &'a dyn NewsSource,
    pub generator: &'a dyn GenerationBackend,
}

pub struct MailTarget<'a> {
    pub transport: &'a dyn MailTransport,
    pub mailbox: &'a str,
}

#[derive(Debug)]
pub enum DispatchStatus {
    Sent,
    /// Dry run: nothing was handed to the mail transport.
    Skipped,
    Failed(anyhow::Error),
}

#[derive(Debug)]
pub struct RunSummary {
    pub report: Report,
    pub dispatch: DispatchStatus,
}

impl RunSummary {
    /// Error-report text for a run that fell back, carrying the last generation failure.
    pub fn fallback_alert(&self) -> Option<String> {
        match &self.report.origin {
            ReportOrigin::Fallback { reason } => Some(format!(
                "all generation candidates failed for {}: {reason}",
                self.report.report_date
            )),
            ReportOrigin::Generated { .. } => None,
        }
    }
}

/// Collect, prompt, generate, and fall back if needed. Always yields a non-empty report.
pub async fn compose_report(
    config: &ReportConfig,
    sources: &Sources<'_>,
    report_date: NaiveDate,
) -> Report {
    let quotes = collect_quotes(sources.quotes, &config.index_symbols).await;
    let quote_fragment = render_quote_fragment(&quotes);

    let headlines = collect_headlines(sources.news, &config.news_symbols).await;
    let headline_fragment = render_headline_fragment(&headlines);

    let prompt = build_prompt(&quote_fragment, &headline_fragment, report_date, &config.language);

    let chain = FallbackChain::new(config.candidates.clone());
    match chain.run(sources.generator, &prompt).await {
        GenerationResult::Success { text, candidate, .. } => Report {
            report_date,
            html: text,
            origin: ReportOrigin::Generated {
                candidate: candidate.label(),
            },
        },
        failure => {
            let reason = failure
                .last_reason()
                .unwrap_or_else(|| "no generation candidates configured".to_string());
            tracing::warn!(%report_date, reason = %reason, "using static fallback report");
            Report {
                report_date,
                html: render_fallback(&quote_fragment, &headline_fragment, report_date, Some(reason.as_str())),
                origin: ReportOrigin::Fallback { reason },
            }
        }
    }
}

/// One full run. Dispatch failures are recorded in the summary, never raised.
pub async fn run_once(
    config: &ReportConfig,
    sources: &Sources<'_>,
    mail_target: Option<MailTarget<'_>>,
    report_date: NaiveDate,
) -> RunSummary {
    let report = compose_report(config, sources, report_date).await;

    let dispatch = match mail_target {
        None => DispatchStatus::Skipped,
        Some(target) => {
            let message = OutboundMessage::for_report(target.mailbox, &report);
            match mail::dispatch(target.transport, &message).await {
                Ok(()) => DispatchStatus::Sent,
                Err(err) => {
                    tracing::error!(%report_date, error = %format!("{err:#}"), "report dispatch failed");
                    DispatchStatus::Failed(err)
                }
            }
        }
    };

    RunSummary { report, dispatch }
}

/// Whether a degraded run should surface as a non-zero exit status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExitPolicy {
    /// Log only; the process exits successfully.
    #[default]
    Relaxed,
    /// Fail the process when the mail was not sent or the fallback report was used.
    Strict,
}

impl FromStr for ExitPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relaxed" => Ok(Self::Relaxed),
            "strict" => Ok(Self::Strict),
            other => anyhow::bail!("EXIT_POLICY must be relaxed or strict (got {other})"),
        }
    }
}

impl ExitPolicy {
    pub fn check(self, summary: &RunSummary) -> anyhow::Result<()> {
        if self == ExitPolicy::Relaxed {
            return Ok(());
        }
        if let DispatchStatus::Failed(err) = &summary.dispatch {
            anyhow::bail!("report was not delivered: {err:#}");
        }
        if let ReportOrigin::Fallback { reason } = &summary.report.origin {
            anyhow::bail!("report fell back to the static template: {reason}");
        }
        Ok(())
    }
}
