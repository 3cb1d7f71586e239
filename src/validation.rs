//! Field validators for form input.
//!
//! Each validator returns the cleaned value or the list of user-facing
//! messages for that field. [`FieldErrors`] collects them per field name so
//! a view can be re-rendered with inline errors.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const USERNAME_MAX_LENGTH: usize = 150;

pub const REQUIRED: &str = "This field is required.";

/// Field name → messages, serialized as a JSON object.
#[derive(Debug, Default, Clone, PartialEq, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn extend(&mut self, field: &str, messages: Vec<String>) {
        for message in messages {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Record the error side of a field result and hand back the value.
    pub fn check<T>(&mut self, field: &str, result: Result<T, Vec<String>>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(messages) => {
                self.extend(field, messages);
                None
            }
        }
    }
}

/// Shape of a fixed-point decimal field.
#[derive(Debug, Clone, Copy)]
pub struct DecimalRule {
    pub max_digits: u32,
    pub decimal_places: u32,
    pub min_value: Decimal,
}

/// Bid amounts: 10 digits, 2 places, at least 0.01.
pub const BID_AMOUNT: DecimalRule = DecimalRule {
    max_digits: 10,
    decimal_places: 2,
    min_value: Decimal::from_parts(1, 0, 0, false, 2),
};

/// Listing starting bids: 12 digits, 2 places, at least 0.01.
pub const STARTING_BID: DecimalRule = DecimalRule {
    max_digits: 12,
    decimal_places: 2,
    min_value: Decimal::from_parts(1, 0, 0, false, 2),
};

/// Parse `raw` as a decimal obeying `rule`.
pub fn decimal(raw: &str, rule: DecimalRule) -> Result<Decimal, Vec<String>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(vec![REQUIRED.to_string()]);
    }
    let value = Decimal::from_str(raw).map_err(|_| vec!["Enter a number.".to_string()])?;

    let mut errors = Vec::new();
    if value < rule.min_value {
        errors.push(format!(
            "Ensure this value is greater than or equal to {}.",
            rule.min_value
        ));
    }

    let decimals = value.scale();
    let mantissa_digits = value.mantissa().unsigned_abs().to_string().len() as u32;
    let digits = mantissa_digits.max(decimals);
    let whole_digits = digits - decimals;

    if digits > rule.max_digits {
        errors.push(format!(
            "Ensure that there are no more than {} digits in total.",
            rule.max_digits
        ));
    } else if decimals > rule.decimal_places {
        errors.push(format!(
            "Ensure that there are no more than {} decimal places.",
            rule.decimal_places
        ));
    } else if whole_digits > rule.max_digits - rule.decimal_places {
        errors.push(format!(
            "Ensure that there are no more than {} digits before the decimal point.",
            rule.max_digits - rule.decimal_places
        ));
    }

    if errors.is_empty() { Ok(value) } else { Err(errors) }
}

/// Required free text; surrounding whitespace is stripped.
pub fn required_text(raw: &str) -> Result<String, Vec<String>> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(vec![REQUIRED.to_string()]);
    }
    Ok(value.to_string())
}

/// Required text of at most `max_len` characters.
pub fn bounded_text(raw: &str, max_len: usize) -> Result<String, Vec<String>> {
    let value = required_text(raw)?;
    let len = value.chars().count();
    if len > max_len {
        return Err(vec![format!(
            "Ensure this value has at most {max_len} characters (it has {len})."
        )]);
    }
    Ok(value)
}

/// Optional http(s) URL; blank input yields `None`.
pub fn optional_url(raw: &str, max_len: usize) -> Result<Option<String>, Vec<String>> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(None);
    }
    let len = value.chars().count();
    if len > max_len {
        return Err(vec![format!(
            "Ensure this value has at most {max_len} characters (it has {len})."
        )]);
    }
    let host = value
        .strip_prefix("http://")
        .or_else(|| value.strip_prefix("https://"))
        .map(|rest| rest.split(['/', '?', '#']).next().unwrap_or(""));
    match host {
        Some(host) if !host.is_empty() && !host.contains(char::is_whitespace) => {
            Ok(Some(value.to_string()))
        }
        _ => Err(vec!["Enter a valid URL.".to_string()]),
    }
}

/// Usernames: 1..=150 characters drawn from letters, digits and `@.+-_`.
pub fn username(raw: &str) -> Result<String, String> {
    if raw.is_empty() {
        return Err(REQUIRED.to_string());
    }
    let len = raw.chars().count();
    if len > USERNAME_MAX_LENGTH {
        return Err(format!(
            "Ensure this value has at most {USERNAME_MAX_LENGTH} characters (it has {len})."
        ));
    }
    let valid = raw
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if !valid {
        return Err("Enter a valid username. This value may contain only letters, \
                    numbers, and @/./+/-/_ characters."
            .to_string());
    }
    Ok(raw.to_string())
}

/// Password must equal its confirmation and reach the minimum length.
pub fn password(password: &str, confirmation: &str) -> Result<(), String> {
    if password != confirmation {
        return Err("Passwords must match.".to_string());
    }
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(format!(
            "Passwords must be at least {PASSWORD_MIN_LENGTH} characters long."
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn bid_amount_accepts_two_places() {
        assert_eq!(decimal("15.00", BID_AMOUNT).unwrap(), dec("15.00"));
        assert_eq!(decimal(" 0.01 ", BID_AMOUNT).unwrap(), dec("0.01"));
        assert_eq!(decimal("12345678", BID_AMOUNT).unwrap(), dec("12345678"));
    }

    #[test]
    fn bid_amount_rejects_bad_input() {
        assert_eq!(decimal("", BID_AMOUNT).unwrap_err(), vec![REQUIRED]);
        assert_eq!(decimal("ten", BID_AMOUNT).unwrap_err(), vec!["Enter a number."]);
        assert_eq!(
            decimal("1.005", BID_AMOUNT).unwrap_err(),
            vec!["Ensure that there are no more than 2 decimal places."]
        );
        assert_eq!(
            decimal("0", BID_AMOUNT).unwrap_err(),
            vec!["Ensure this value is greater than or equal to 0.01."]
        );
        assert_eq!(
            decimal("123456789", BID_AMOUNT).unwrap_err(),
            vec!["Ensure that there are no more than 8 digits before the decimal point."]
        );
        assert_eq!(
            decimal("12345678901", BID_AMOUNT).unwrap_err(),
            vec!["Ensure that there are no more than 10 digits in total."]
        );
    }

    #[test]
    fn negative_amount_reports_minimum() {
        let errors = decimal("-5", BID_AMOUNT).unwrap_err();
        assert_eq!(errors, vec!["Ensure this value is greater than or equal to 0.01."]);
    }

    #[test]
    fn starting_bid_allows_wider_amounts() {
        assert!(decimal("1234567890.50", STARTING_BID).is_ok());
        assert!(decimal("1234567890.50", BID_AMOUNT).is_err());
    }

    #[test]
    fn text_validators() {
        assert_eq!(required_text("  hello ").unwrap(), "hello");
        assert_eq!(required_text("   ").unwrap_err(), vec![REQUIRED]);
        assert!(bounded_text(&"x".repeat(128), 128).is_ok());
        assert!(bounded_text(&"x".repeat(129), 128).is_err());
    }

    #[test]
    fn url_validator() {
        assert_eq!(optional_url("", 500).unwrap(), None);
        assert_eq!(
            optional_url("https://img.example/a.png", 500).unwrap().as_deref(),
            Some("https://img.example/a.png")
        );
        assert!(optional_url("ftp://img.example/a.png", 500).is_err());
        assert!(optional_url("https:///a.png", 500).is_err());
        assert!(optional_url(&format!("https://a.example/{}", "x".repeat(500)), 500).is_err());
    }

    #[test]
    fn username_policy() {
        assert!(username("alice.b+c-d_e@x").is_ok());
        assert!(username("jürgen").is_ok());
        assert!(username("bad name").is_err());
        assert!(username("semi;colon").is_err());
        assert_eq!(username("").unwrap_err(), REQUIRED);
        assert!(username(&"a".repeat(151)).is_err());
    }

    #[test]
    fn password_rules_in_order() {
        assert_eq!(
            password("short", "other").unwrap_err(),
            "Passwords must match."
        );
        assert_eq!(
            password("short", "short").unwrap_err(),
            "Passwords must be at least 8 characters long."
        );
        assert!(password("longenough", "longenough").is_ok());
    }

    #[test]
    fn field_errors_collect_per_field() {
        let mut errors = FieldErrors::new();
        assert!(errors.check("bid", decimal("7", BID_AMOUNT)).is_some());
        assert!(errors.check("bid", decimal("x", BID_AMOUNT)).is_none());
        errors.add("comment", REQUIRED);
        assert_eq!(errors.get("bid"), Some(&["Enter a number.".to_string()][..]));
        assert_eq!(errors.get("comment").map(|m| m.len()), Some(1));
        assert!(!errors.is_empty());
    }

    #[test]
    fn field_errors_serialize_as_an_object() {
        let mut errors = FieldErrors::new();
        errors.add("bid", "Enter a number.");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({ "bid": ["Enter a number."] }));
    }
}
