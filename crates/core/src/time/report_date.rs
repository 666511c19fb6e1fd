use anyhow::Context;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// Report date: an explicit `YYYY-MM-DD` override, else today's date at `utc_offset_hours`.
pub fn resolve_report_date(
    as_of_date_arg: Option<&str>,
    now_utc: DateTime<Utc>,
    utc_offset_hours: i32,
) -> anyhow::Result<NaiveDate> {
    if let Some(s) = as_of_date_arg {
        return NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .with_context(|| format!("invalid --as-of-date {s:?}; expected YYYY-MM-DD"));
    }

    let offset = FixedOffset::east_opt(utc_offset_hours * 3600)
        .with_context(|| format!("invalid UTC offset {utc_offset_hours}h"))?;
    Ok(now_utc.with_timezone(&offset).date_naive())
}
