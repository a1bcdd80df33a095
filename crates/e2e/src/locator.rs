//! Element locators
//!
//! The app's UI contract is mostly expressed as "an element of this kind
//! with this visible text", so locators pair a CSS selector with an optional
//! text match. `Display` renders the short `tag=text` / `tag*=text` form used
//! in logs and failure messages.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// Plain CSS selector
    Css(String),

    /// Elements matching `selector` whose visible text equals (or contains) `text`
    Text {
        selector: String,
        text: String,
        exact: bool,
    },
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    /// Link with exactly this text
    pub fn link(text: impl Into<String>) -> Self {
        Self::with_text("a", text)
    }

    /// Button with exactly this text
    pub fn button(text: impl Into<String>) -> Self {
        Self::with_text("button", text)
    }

    pub fn with_text(selector: impl Into<String>, text: impl Into<String>) -> Self {
        Locator::Text {
            selector: selector.into(),
            text: text.into(),
            exact: true,
        }
    }

    pub fn containing(selector: impl Into<String>, text: impl Into<String>) -> Self {
        Locator::Text {
            selector: selector.into(),
            text: text.into(),
            exact: false,
        }
    }

    /// CSS part of the locator
    pub fn selector(&self) -> &str {
        match self {
            Locator::Css(selector) => selector,
            Locator::Text { selector, .. } => selector,
        }
    }

    /// Whether an element with `visible` text satisfies the text part
    pub fn matches_text(&self, visible: &str) -> bool {
        match self {
            Locator::Css(_) => true,
            Locator::Text { text, exact: true, .. } => visible.trim() == text,
            Locator::Text { text, exact: false, .. } => visible.contains(text.as_str()),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(selector) => write!(f, "{}", selector),
            Locator::Text { selector, text, exact: true } => write!(f, "{}={}", selector, text),
            Locator::Text { selector, text, exact: false } => write!(f, "{}*={}", selector, text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Locator::link("Logout"), "a=Logout" ; "link")]
    #[test_case(Locator::button("Local File"), "button=Local File" ; "button")]
    #[test_case(Locator::containing("p", "You must be logged in"), "p*=You must be logged in" ; "partial")]
    #[test_case(Locator::css("#scene-0-title"), "#scene-0-title" ; "css")]
    fn renders_short_form(locator: Locator, expected: &str) {
        assert_eq!(locator.to_string(), expected);
    }

    #[test]
    fn exact_match_ignores_surrounding_whitespace_only() {
        let locator = Locator::with_text("strong", "Delete me :(");
        assert!(locator.matches_text("  Delete me :(\n"));
        assert!(!locator.matches_text("Delete me :( please"));
    }

    #[test]
    fn partial_match_finds_substring() {
        let locator = Locator::containing(".autocomplete__menu-item", "Loading...");
        assert!(locator.matches_text("Loading... results"));
        assert!(!locator.matches_text("Mount Everest"));
        assert_eq!(locator.selector(), ".autocomplete__menu-item");
    }
}
