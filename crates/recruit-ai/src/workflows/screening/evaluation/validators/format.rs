use std::sync::LazyLock;

use regex::Regex;

use super::super::super::domain::Answer;
use super::super::rules::FormatRule;
use super::super::RuleVerdict;
use super::Validate;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s()+-]{7,20}$").expect("valid phone pattern"));
static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?([\da-z.-]+)\.([a-z.]{2,6})([/\w .-]*)*/?$").expect("valid url pattern")
});

impl Validate for FormatRule {
    fn validate(&self, answer: &Answer) -> RuleVerdict {
        let (pattern, name) = match self.format.trim().to_ascii_lowercase().as_str() {
            "email" => (&*EMAIL, "email"),
            "phone" | "telephone" => (&*PHONE, "phone"),
            "url" => (&*URL, "URL"),
            other => return RuleVerdict::fail(format!("unknown format: '{other}'")),
        };

        let text = answer.as_text();
        if pattern.is_match(text.trim()) {
            RuleVerdict::pass(format!("valid {name} format"))
        } else {
            RuleVerdict::fail(format!("invalid {name} format"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(format: &str) -> FormatRule {
        FormatRule {
            format: format.to_string(),
        }
    }

    #[test]
    fn email_format() {
        assert!(rule("email").validate(&Answer::from("dev@example.com")).complies);
        assert!(!rule("email").validate(&Answer::from("dev@example")).complies);
        assert!(!rule("email").validate(&Answer::from("dev @example.com")).complies);
    }

    #[test]
    fn phone_format() {
        assert!(rule("phone").validate(&Answer::from("+56 9 1234 5678")).complies);
        assert!(rule("phone").validate(&Answer::from("(02) 555-0100")).complies);
        assert!(!rule("phone").validate(&Answer::from("call me")).complies);
        assert!(!rule("phone").validate(&Answer::from("12345")).complies);
    }

    #[test]
    fn url_format() {
        assert!(rule("url").validate(&Answer::from("https://github.com/dev")).complies);
        assert!(rule("url").validate(&Answer::from("portfolio.dev")).complies);
        assert!(!rule("url").validate(&Answer::from("not a url")).complies);
    }

    #[test]
    fn unknown_format_fails_closed() {
        let verdict = rule("postcode").validate(&Answer::from("8320000"));
        assert!(!verdict.complies);
        assert_eq!(verdict.score, 0.0);
        assert!(verdict.reason.contains("unknown format"));
    }
}
