//! Element locators and wait conditions

use std::fmt;

/// How a page element is looked up
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// Element id attribute
    Id(String),
    /// Exact text of a link
    LinkText(String),
    /// XPath expression
    XPath(String),
}

impl Locator {
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    pub fn link_text(text: impl Into<String>) -> Self {
        Self::LinkText(text.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// XPath for a `<button>` with the given title attribute
    pub fn button_titled(title: &str) -> Self {
        Self::XPath(format!(r#"//button[@title="{}"]"#, title))
    }

    /// Selector understood by agent-browser (Playwright syntax)
    pub fn to_selector(&self) -> String {
        match self {
            Self::Id(id) => format!("#{}", id),
            Self::LinkText(text) => format!("a:text-is(\"{}\")", text.replace('"', "\\\"")),
            Self::XPath(expr) => format!("xpath={}", expr),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id '{}'", id),
            Self::LinkText(text) => write!(f, "link '{}'", text),
            Self::XPath(expr) => write!(f, "xpath {}", expr),
        }
    }
}

/// Page state a wait polls for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Page title equals the text
    TitleIs(String),
    /// Element is attached to the page
    PresenceOf(Locator),
    /// Element is attached and visible
    VisibilityOf(Locator),
    /// An alert or confirm dialog is open
    AlertPresent,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TitleIs(title) => write!(f, "title '{}'", title),
            Self::PresenceOf(locator) => write!(f, "presence of {}", locator),
            Self::VisibilityOf(locator) => write!(f, "visibility of {}", locator),
            Self::AlertPresent => write!(f, "alert"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selectors() {
        assert_eq!(Locator::id("loginButton").to_selector(), "#loginButton");
        assert_eq!(
            Locator::link_text("forgot password?").to_selector(),
            r#"a:text-is("forgot password?")"#
        );
        assert_eq!(
            Locator::button_titled("share project").to_selector(),
            r#"xpath=//button[@title="share project"]"#
        );
    }

    #[test]
    fn test_link_text_quotes_escaped() {
        assert_eq!(
            Locator::link_text(r#"say "hi""#).to_selector(),
            r#"a:text-is("say \"hi\"")"#
        );
    }

    #[test]
    fn test_condition_display() {
        let condition = Condition::VisibilityOf(Locator::id("uploadTitle"));
        assert_eq!(condition.to_string(), "visibility of id 'uploadTitle'");
    }
}
