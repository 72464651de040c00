use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How to find an element in the rendered page
///
/// Serialized externally tagged, e.g. `{"xpath": "//td[1]"}` or `{"css": "a.view"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Locator {
    /// CSS selector
    Css(String),
    /// XPath expression
    XPath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Locator::XPath(expr.into())
    }

    /// Table cell immediately after the cell whose text contains `label`
    pub fn cell_after_label(label: &str) -> Self {
        Locator::XPath(format!(
            "//td[contains(normalize-space(.), {})]/following-sibling::td[1]",
            xpath_literal(label)
        ))
    }

    /// First sibling element after the innermost element labelled exactly `label`
    ///
    /// An element is labelled when its whole text, or one of its own text
    /// nodes, normalizes to `label`. Inline markup such as `<sup>*</sup>` after
    /// the label text does not prevent a match.
    pub fn sibling_of_text(label: &str) -> Self {
        let lit = xpath_literal(label);
        Locator::XPath(format!(
            "//*[(normalize-space(.)={lit} or text()[normalize-space(.)={lit}]) \
             and not(.//*[normalize-space(.)={lit}])]/following-sibling::*[1]"
        ))
    }

    /// Div immediately after the div whose own text contains `label`
    pub fn block_after_label(label: &str) -> Self {
        Locator::XPath(format!(
            "//div[contains(normalize-space(text()), {})]/following-sibling::div[1]",
            xpath_literal(label)
        ))
    }

    /// Anchor whose visible text contains `text`
    pub fn link_with_text(text: &str) -> Self {
        Locator::XPath(format!("//a[contains(normalize-space(.), {})]", xpath_literal(text)))
    }

    /// Any element whose own text node contains `text`
    pub fn any_with_text(text: &str) -> Self {
        Locator::XPath(format!("//*[contains(normalize-space(text()), {})]", xpath_literal(text)))
    }

    /// The raw expression, without its kind
    pub fn expr(&self) -> &str {
        match self {
            Locator::Css(s) | Locator::XPath(s) => s,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css={}", s),
            Locator::XPath(s) => write!(f, "xpath={}", s),
        }
    }
}

/// Quote a string as an XPath 1.0 literal
///
/// XPath has no escape sequences, so a value holding both quote kinds is split
/// into a `concat()` of pieces.
fn xpath_literal(value: &str) -> String {
    if !value.contains('"') {
        return format!("\"{}\"", value);
    }
    if !value.contains('\'') {
        return format!("'{}'", value);
    }

    let parts: Vec<String> = value.split('"').map(|part| format!("\"{}\"", part)).collect();
    format!("concat({})", parts.join(", '\"', "))
}
