const FENCE: &str = "```";

/// Removes a markdown code fence (with or without a language tag) wrapped around the text.
/// Surrounding whitespace and the inner content are left untouched.
pub fn strip_code_fences(text: &str) -> String {
    let mut out = text;

    let lead = out.len() - out.trim_start().len();
    if out[lead..].starts_with(FENCE) {
        let after = &out[lead + FENCE.len()..];
        let tag_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(after.len());
        out = &after[tag_len..];
    }

    let body = out.trim_end();
    if body.ends_with(FENCE) {
        let trail = &out[body.len()..];
        let kept = &body[..body.len() - FENCE.len()];
        return format!("{kept}{trail}");
    }

    out.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tagged_fence() {
        assert_eq!(strip_code_fences("```html\n<p>x</p>\n```"), "\n<p>x</p>\n");
    }

    #[test]
    fn strips_untagged_fence() {
        assert_eq!(strip_code_fences("```\n<html></html>\n```\n"), "\n<html></html>\n\n");
    }

    #[test]
    fn clean_input_is_unchanged() {
        let clean = "<html><body><p>x</p></body></html>";
        assert_eq!(strip_code_fences(clean), clean);
        let once = strip_code_fences("```html\n<p>x</p>\n```");
        assert_eq!(strip_code_fences(&once), once);
    }

    #[test]
    fn interior_backticks_survive() {
        let text = "<p>use ``` for code</p>";
        assert_eq!(strip_code_fences(text), text);
    }

    #[test]
    fn fence_only_becomes_empty() {
        assert_eq!(strip_code_fences("```html```").trim(), "");
    }
}
