use regex::Regex;
use std::sync::LazyLock;

static TOTAL_COST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Total estimated cost.*?([£$€])(\d[\d,]*(?:\.\d+)?)").unwrap()
});

/// First "Total estimated cost ... £1,234.56" amount across the comments,
/// in comment order, formatted with its currency symbol.
pub fn extract_cost<S: AsRef<str>>(comments: &[S]) -> Option<String> {
    comments.iter().find_map(|comment| {
        TOTAL_COST_RE
            .captures(comment.as_ref())
            .map(|caps| format!("{}{}", &caps[1], &caps[2]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_amount_with_thousands_separator() {
        let comments = ["Total estimated cost for March: £1,234.56"];
        assert_eq!(extract_cost(&comments).as_deref(), Some("£1,234.56"));
    }

    #[test]
    fn case_insensitive_and_whole_pounds() {
        let comments = ["TOTAL ESTIMATED COST is £80"];
        assert_eq!(extract_cost(&comments).as_deref(), Some("£80"));
    }

    #[test]
    fn first_matching_comment_wins() {
        let comments = [
            "Thanks, looking into it",
            "Total estimated cost: £12.50",
            "Total estimated cost: £99.00",
        ];
        assert_eq!(extract_cost(&comments).as_deref(), Some("£12.50"));
    }

    #[test]
    fn other_currency_symbols() {
        let comments = ["Total estimated cost (approx) $2,000"];
        assert_eq!(extract_cost(&comments).as_deref(), Some("$2,000"));
    }

    #[test]
    fn no_matching_phrase() {
        let comments = ["Cost is £100", "LGTM"];
        assert_eq!(extract_cost(&comments), None);
        assert_eq!(extract_cost::<&str>(&[]), None);
    }
}
