//! UI regression suite against a live instance
//!
//! Needs agent-browser and an instance listening on the configured base URL
//! (ELMAPP_BASE_URL, default http://0.0.0.0:8080).

use elmapp::uitest::{check_reachable, AgentBrowser, AnvioCases, CaseOutcome, Suite};
use elmapp::Config;

/// Build the suite, or explain why it cannot run here
async fn live_suite() -> Result<(Suite, bool), Box<dyn std::error::Error>> {
    if !AgentBrowser::is_available().await {
        return Err("agent-browser not available".into());
    }

    let config = Config::default();
    let anvio = AnvioCases::new(&config.suite)?;
    check_reachable(anvio.base_url()).await?;

    Ok((
        Suite::new(anvio.all(), &config.browser),
        config.browser.headed,
    ))
}

#[tokio::test]
#[ignore] // Requires agent-browser and a running instance
async fn test_full_workflow() {
    let (suite, headed) = match live_suite().await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Skipping test: {}", e);
            return;
        }
    };

    let report = suite
        .run(|session| AgentBrowser::new(session).with_headed(headed))
        .await;

    println!("{}", report.format_for_display());
    assert!(report.success(), "{} case(s) failed", report.failed());
}

#[tokio::test]
#[ignore]
async fn test_invalid_password_reset_only() {
    let (suite, headed) = match live_suite().await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Skipping test: {}", e);
            return;
        }
    };

    let suite = suite
        .select(&["03_forgot_password_invalid".to_string()])
        .unwrap();
    let report = suite
        .run(|session| AgentBrowser::new(session).with_headed(headed))
        .await;

    assert_eq!(
        report.outcome("03_forgot_password_invalid"),
        Some(&CaseOutcome::Passed)
    );
}
