//! Heading adjustment for the rendered answer

use regex::Regex;
use std::sync::LazyLock;

static HASH_RUN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new("#+").ok());

/// Demote `####` headings to `###`
///
/// Every maximal run of exactly four `#` becomes three; shorter and longer
/// runs and all other text are left alone. The result never contains a new
/// run of four, so applying it twice changes nothing more.
///
/// # Example
///
/// ```
/// use advisor_finance::adjust_markdown_headings;
///
/// assert_eq!(adjust_markdown_headings("Q1 ####Revenue"), "Q1 ###Revenue");
/// assert_eq!(adjust_markdown_headings("##### kept"), "##### kept");
/// ```
pub fn adjust_markdown_headings(text: &str) -> String {
    let Some(re) = HASH_RUN.as_ref() else {
        return text.to_string();
    };
    re.replace_all(text, |caps: &regex::Captures<'_>| {
        let run = &caps[0];
        if run.len() == 4 {
            "###".to_string()
        } else {
            run.to_string()
        }
    })
    .into_owned()
}
