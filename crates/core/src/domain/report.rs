use chrono::NaiveDate;

/// How the report body came to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOrigin {
    Generated { candidate: String },
    Fallback { reason: String },
}

#[derive(Debug, Clone)]
pub struct Report {
    pub report_date: NaiveDate,
    pub html: String,
    pub origin: ReportOrigin,
}

impl Report {
    pub fn is_fallback(&self) -> bool {
        matches!(self.origin, ReportOrigin::Fallback { .. })
    }
}

/// A self-addressed report mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

impl OutboundMessage {
    pub fn for_report(mailbox: &str, report: &Report) -> Self {
        Self {
            from: mailbox.to_string(),
            to: mailbox.to_string(),
            subject: subject_for(report.report_date),
            html_body: report.html.clone(),
        }
    }
}

pub fn subject_for(report_date: NaiveDate) -> String {
    format!(
        "🇺🇸 [Morning Report] {} US market recap",
        report_date.format("%m/%d")
    )
}
