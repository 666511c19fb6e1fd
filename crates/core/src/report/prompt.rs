use crate::domain::market::Direction;
use chrono::NaiveDate;

pub const TITLE_HEADING: &str = "US market summary";
pub const INDEX_HEADING: &str = "1. Market indices";
pub const NEWS_HEADING: &str = "2. Key news & issues";
pub const COMMENT_HEADING: &str = "3. Analyst commentary";

/// Instruction handed verbatim to the generation chain.
pub fn build_prompt(
    quote_fragment: &str,
    headline_fragment: &str,
    report_date: NaiveDate,
    language: &str,
) -> String {
    let date = report_date.format("%Y-%m-%d");
    let quotes = if quote_fragment.trim().is_empty() {
        "(no index data was collected today)"
    } else {
        quote_fragment
    };
    let headlines = if headline_fragment.trim().is_empty() {
        "(no headlines were collected today)"
    } else {
        headline_fragment
    };

    [
        "You are a Wall Street market analyst. Using the data below, write a US stock market morning report for busy office workers.".to_string(),
        String::new(),
        "[Output rules]".to_string(),
        "1. Output HTML only. Do not use markdown and do not wrap the answer in code fences such as ```html. Start with <html> and end with </html>.".to_string(),
        "2. Design: a clean email-newsletter style using inline CSS only.".to_string(),
        "3. Sections, in exactly this order:".to_string(),
        format!("   - <h2>{date} {TITLE_HEADING}</h2>"),
        format!("   - <h3>{INDEX_HEADING}</h3>: summarize the index data as a table or list and explain the moves."),
        format!("   - <h3>{NEWS_HEADING}</h3>: pick the three most important issues from the headlines and analyze them."),
        format!("   - <h3>{COMMENT_HEADING}</h3>: the current market mood and one piece of advice."),
        format!(
            "4. Show rising values in red ({}) text and falling values in blue ({}) text.",
            Direction::Up.color(),
            Direction::Down.color()
        ),
        format!("5. Write the report in {language}."),
        String::new(),
        "[Market data]".to_string(),
        quotes.to_string(),
        String::new(),
        "[News headlines]".to_string(),
        headlines.to_string(),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn embeds_fragments_and_date() {
        let prompt = build_prompt("<span>Q</span>", "<li>H</li>", date(), "Korean");
        assert!(prompt.contains("<span>Q</span>"));
        assert!(prompt.contains("<li>H</li>"));
        assert!(prompt.contains("2026-10-16"));
        assert!(prompt.contains("Write the report in Korean."));
    }

    #[test]
    fn states_html_only_and_section_order() {
        let prompt = build_prompt("q", "h", date(), "English");
        assert!(prompt.contains("Output HTML only"));
        assert!(prompt.contains("code fences"));

        let positions: Vec<usize> = [TITLE_HEADING, INDEX_HEADING, NEWS_HEADING, COMMENT_HEADING]
            .iter()
            .map(|h| prompt.find(h).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn states_color_convention() {
        let prompt = build_prompt("q", "h", date(), "English");
        assert!(prompt.contains("rising values in red (#d32f2f)"));
        assert!(prompt.contains("falling values in blue (#1565c0)"));
    }

    #[test]
    fn empty_fragments_get_a_note() {
        let prompt = build_prompt("", " ", date(), "English");
        assert!(prompt.contains("(no index data was collected today)"));
        assert!(prompt.contains("(no headlines were collected today)"));
    }
}
