//! Interaction helpers shared by scenarios, and money parsing.

use crate::driver::Session;
use crate::locator::Role;
use crate::result::{E2eError, E2eResult};
use regex::Regex;

/// Type into the input with the given placeholder, replacing its value
///
/// # Errors
///
/// Returns error if no unique editable input carries the placeholder
pub async fn type_text(session: &Session, placeholder: &str, text: &str) -> E2eResult<()> {
    session.get_by_placeholder(placeholder).fill(text).await
}

/// Click the button whose accessible name contains `name`
///
/// # Errors
///
/// Returns error if no unique enabled button matches
pub async fn click_button(session: &Session, name: &str) -> E2eResult<()> {
    session.get_by_role(Role::Button, name).click().await
}

/// Extract the first amount from text such as `"$100"` or `"Total: $1,230.50"`
///
/// # Errors
///
/// Returns [`E2eError::ValueAssertion`] if the text holds no number
pub fn parse_price(text: &str) -> E2eResult<f64> {
    let pattern = Regex::new(r"\d[\d,]*(?:\.\d+)?")?;
    let found = pattern
        .find(text)
        .ok_or_else(|| E2eError::value(format!("no amount in {text:?}")))?;
    found
        .as_str()
        .replace(',', "")
        .parse()
        .map_err(|_| E2eError::value(format!("unparseable amount in {text:?}")))
}

/// Discount amount for a course tag.
///
/// Percentage tags (`"10% OFF"`) are applied to `price`; anything else is
/// read as an amount (`"$10"`).
///
/// # Errors
///
/// Returns [`E2eError::ValueAssertion`] if the tag holds no number
pub fn parse_discount(text: &str, price: f64) -> E2eResult<f64> {
    let value = parse_price(text)?;
    if text.contains('%') {
        Ok(price * value / 100.0)
    } else {
        Ok(value)
    }
}

/// Keep only digits and dollar signs (`"Total: $0"` becomes `"$0"`)
///
/// # Errors
///
/// Returns [`E2eError::Regex`] only if the built-in pattern fails to compile
pub fn money_digits(text: &str) -> E2eResult<String> {
    Ok(Regex::new(r"[^\d$]")?.replace_all(text, "").into_owned())
}
