//! Polling waits

use std::time::Duration;
use tokio::time::Instant;

use crate::core::{ElmAppError, Result};
use crate::uitest::browser::Browser;
use crate::uitest::locator::Condition;

/// Whether `condition` holds right now
pub async fn check(browser: &dyn Browser, condition: &Condition) -> Result<bool> {
    match condition {
        Condition::TitleIs(title) => Ok(browser.title().await? == *title),
        Condition::PresenceOf(locator) => browser.is_present(locator).await,
        Condition::VisibilityOf(locator) => browser.is_visible(locator).await,
        Condition::AlertPresent => Ok(browser.alert_text().await?.is_some()),
    }
}

/// Poll `condition` every `poll` until it holds or `timeout` elapses.
///
/// Driver errors while polling count as "not yet"; the page may be
/// mid-navigation.
pub async fn wait_until(
    browser: &dyn Browser,
    condition: &Condition,
    timeout: Duration,
    poll: Duration,
) -> Result<()> {
    let deadline = Instant::now() + timeout;

    loop {
        match check(browser, condition).await {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(e) => tracing::debug!("Polling {} failed: {}", condition, e),
        }

        if Instant::now() >= deadline {
            return Err(ElmAppError::WaitTimeout {
                condition: condition.to_string(),
                timeout,
            });
        }

        tokio::time::sleep(poll).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uitest::testing::FakeBrowser;
    use crate::uitest::Locator;

    const SHORT: Duration = Duration::from_millis(100);
    const POLL: Duration = Duration::from_millis(5);

    #[tokio::test]
    async fn test_title_condition() {
        let browser = FakeBrowser::new();
        browser.set_title("anvio user home");

        let condition = Condition::TitleIs("anvio user home".to_string());
        assert!(check(&browser, &condition).await.unwrap());

        let other = Condition::TitleIs("anvio".to_string());
        assert!(!check(&browser, &other).await.unwrap());
    }

    #[tokio::test]
    async fn test_wait_succeeds_once_element_appears() {
        let browser = FakeBrowser::new();
        let locator = Locator::id("pfc3");
        browser.show_after(&locator, 3);

        tokio_test::assert_ok!(
            wait_until(
                &browser,
                &Condition::PresenceOf(locator),
                Duration::from_secs(5),
                POLL,
            )
            .await
        );
    }

    #[tokio::test]
    async fn test_wait_times_out() {
        let browser = FakeBrowser::new();

        let err = tokio_test::assert_err!(
            wait_until(&browser, &Condition::AlertPresent, SHORT, POLL).await
        );

        match err {
            ElmAppError::WaitTimeout { condition, timeout } => {
                assert_eq!(condition, "alert");
                assert_eq!(timeout, SHORT);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_driver_errors_keep_polling() {
        let browser = FakeBrowser::new();
        browser.fail_title_times(2);
        browser.set_title("anvio forgot password");

        wait_until(
            &browser,
            &Condition::TitleIs("anvio forgot password".to_string()),
            Duration::from_secs(5),
            POLL,
        )
        .await
        .unwrap();
    }
}
