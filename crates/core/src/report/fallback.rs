use crate::report::html;
use crate::report::prompt::{INDEX_HEADING, NEWS_HEADING, TITLE_HEADING};
use chrono::NaiveDate;

/// Static report built straight from the collected fragments. Used when generation fails.
pub fn render_fallback(
    quote_fragment: &str,
    headline_fragment: &str,
    report_date: NaiveDate,
    last_error: Option<&str>,
) -> String {
    let date = report_date.format("%Y-%m-%d");

    let mut body = String::new();
    body.push_str(&format!(
        "<h2 style=\"color:#222\">{date} {TITLE_HEADING}</h2>\n"
    ));

    body.push_str(&format!("<h3>{INDEX_HEADING}</h3>\n"));
    if quote_fragment.trim().is_empty() {
        body.push_str("<p style=\"color:#777\">Index data was unavailable for this run.</p>\n");
    } else {
        body.push_str(&format!(
            "<div style=\"font-size:15px;line-height:1.8\">\n{quote_fragment}\n</div>\n"
        ));
    }

    if !headline_fragment.trim().is_empty() {
        body.push_str(&format!("<h3>{NEWS_HEADING}</h3>\n"));
        body.push_str(&format!("<ul style=\"line-height:1.6\">\n{headline_fragment}\n</ul>\n"));
    }

    body.push_str("<hr style=\"border:none;border-top:1px solid #ddd\">\n");
    body.push_str(
        "<p style=\"color:#777;font-size:12px\">The AI summary could not be generated today; this is the raw data report.</p>\n",
    );
    if let Some(err) = last_error.map(str::trim).filter(|e| !e.is_empty()) {
        body.push_str(&format!(
            "<p style=\"color:#999;font-size:11px\">Last error: {}</p>\n",
            html::escape(err)
        ));
    }

    format!(
        "<html>\n<head><meta charset=\"utf-8\"><title>{date} {TITLE_HEADING}</title></head>\n\
<body style=\"font-family:Arial,sans-serif;max-width:640px;margin:0 auto;padding:16px\">\n\
{body}</body>\n</html>\n"
    )
}
