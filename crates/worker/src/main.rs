use clap::Parser;
use market_report_core::config::{ReportConfig, Settings};
use market_report_core::ingest::news::build_news_source;
use market_report_core::ingest::quotes::YahooChartClient;
use market_report_core::llm::gemini::GeminiClient;
use market_report_core::mail::smtp::SmtpMailer;
use market_report_core::pipeline::{self, DispatchStatus, MailTarget, Sources};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "market_report_worker")]
struct Args {
    /// Report date (YYYY-MM-DD). Defaults to today at REPORT_UTC_OFFSET_HOURS.
    #[arg(long)]
    as_of_date: Option<String>,

    /// Build the report but print it instead of mailing it.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    // Missing secrets abort before any network traffic.
    settings.require_secrets()?;
    let mailbox = settings.require_email_user()?.to_string();
    let exit_policy = settings.exit_policy()?;

    let report_date = market_report_core::time::report_date::resolve_report_date(
        args.as_of_date.as_deref(),
        chrono::Utc::now(),
        settings.report_utc_offset_hours()?,
    )?;

    let config = ReportConfig::from_settings(&settings)?;
    let quotes = YahooChartClient::from_settings(&settings)?;
    let news = build_news_source(&settings, config.news_source)?;
    let generator = GeminiClient::from_settings(&settings)?;
    let mailer = SmtpMailer::from_settings(&settings)?;

    tracing::info!(
        %report_date,
        dry_run = args.dry_run,
        candidates = config.candidates.len(),
        news_source = ?config.news_source,
        "market report run started"
    );

    let sources = Sources {
        quotes: &quotes,
        news: news.as_ref(),
        generator: &generator,
    };
    let mail_target = (!args.dry_run).then(|| MailTarget {
        transport: &mailer,
        mailbox: &mailbox,
    });

    let summary = pipeline::run_once(&config, &sources, mail_target, report_date).await;

    if let Some(alert) = summary.fallback_alert() {
        sentry_anyhow::capture_anyhow(&anyhow::anyhow!(alert));
    }

    match &summary.dispatch {
        DispatchStatus::Sent => {
            tracing::info!(%report_date, origin = ?summary.report.origin, "market report delivered");
        }
        DispatchStatus::Skipped => {
            println!("{}", summary.report.html);
            tracing::info!(%report_date, origin = ?summary.report.origin, "dry run; report printed");
        }
        DispatchStatus::Failed(err) => {
            sentry_anyhow::capture_anyhow(err);
        }
    }

    exit_policy.check(&summary)
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
