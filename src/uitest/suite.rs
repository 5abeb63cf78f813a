//! Ordered regression suite
//!
//! Cases run in declaration order and build on the state earlier cases
//! leave behind (a registered user, an uploaded project). A failed case
//! therefore skips every case after it.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use rand::Rng;

use crate::core::config::BrowserConfig;
use crate::core::{ElmAppError, Result};
use crate::uitest::browser::Browser;
use crate::uitest::locator::{Condition, Locator};
use crate::uitest::wait::wait_until;

/// One interaction or assertion
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Open(String),
    Click(Locator),
    Fill(Locator, String),
    Upload(Locator, PathBuf),
    Wait(Condition),
    AssertTitleContains(String),
    AssertPresent(Locator),
    AssertAlertText(String),
    AcceptAlert,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open(url) => write!(f, "open {}", url),
            Self::Click(locator) => write!(f, "click {}", locator),
            Self::Fill(locator, text) => write!(f, "fill {} with '{}'", locator, text),
            Self::Upload(locator, path) => write!(f, "upload {} to {}", path.display(), locator),
            Self::Wait(condition) => write!(f, "wait for {}", condition),
            Self::AssertTitleContains(text) => write!(f, "assert title contains '{}'", text),
            Self::AssertPresent(locator) => write!(f, "assert {} present", locator),
            Self::AssertAlertText(text) => write!(f, "assert alert text '{}'", text),
            Self::AcceptAlert => write!(f, "accept alert"),
        }
    }
}

/// A named sequence of steps run in one browser session
#[derive(Debug, Clone)]
pub struct Case {
    pub name: String,
    pub steps: Vec<Step>,
}

impl Case {
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }
}

/// Result of one case
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseOutcome {
    Passed,
    Failed(String),
    Skipped(String),
}

/// Outcomes of a suite run, in run order
#[derive(Debug, Clone, Default)]
pub struct SuiteReport {
    pub results: Vec<(String, CaseOutcome)>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, CaseOutcome::Passed))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, CaseOutcome::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, CaseOutcome::Skipped(_)))
    }

    /// True when nothing failed or was skipped
    pub fn success(&self) -> bool {
        self.failed() == 0 && self.skipped() == 0
    }

    pub fn outcome(&self, name: &str) -> Option<&CaseOutcome> {
        self.results
            .iter()
            .find(|(case, _)| case == name)
            .map(|(_, outcome)| outcome)
    }

    fn count(&self, pred: impl Fn(&CaseOutcome) -> bool) -> usize {
        self.results.iter().filter(|(_, o)| pred(o)).count()
    }

    /// Format the report for display
    pub fn format_for_display(&self) -> String {
        let mut output = String::new();

        for (name, outcome) in &self.results {
            let line = match outcome {
                CaseOutcome::Passed => format!("  ok       {}\n", name),
                CaseOutcome::Failed(reason) => format!("  FAILED   {}: {}\n", name, reason),
                CaseOutcome::Skipped(reason) => format!("  skipped  {}: {}\n", name, reason),
            };
            output.push_str(&line);
        }

        output.push_str(&format!(
            "\n{} passed, {} failed, {} skipped\n",
            self.passed(),
            self.failed(),
            self.skipped()
        ));
        output
    }
}

/// Ordered list of cases plus wait settings
#[derive(Debug, Clone)]
pub struct Suite {
    cases: Vec<Case>,
    session_prefix: String,
    timeout: Duration,
    poll: Duration,
}

impl Suite {
    pub fn new(cases: Vec<Case>, browser: &BrowserConfig) -> Self {
        Self {
            cases,
            session_prefix: browser.session_prefix.clone(),
            timeout: Duration::from_millis(browser.timeout_ms),
            poll: Duration::from_millis(browser.poll_ms),
        }
    }

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn case(&self, name: &str) -> Option<&Case> {
        self.cases.iter().find(|c| c.name == name)
    }

    /// Keep only the named cases, preserving suite order
    pub fn select(mut self, names: &[String]) -> Result<Self> {
        if names.is_empty() {
            return Ok(self);
        }

        if let Some(unknown) = names.iter().find(|n| self.case(n).is_none()) {
            return Err(ElmAppError::config(format!("Unknown case: {}", unknown)));
        }

        self.cases.retain(|c| names.contains(&c.name));
        Ok(self)
    }

    /// Run every case in order, each in a fresh session from `launch`
    pub async fn run<F, B>(&self, launch: F) -> SuiteReport
    where
        F: Fn(&str) -> B,
        B: Browser,
    {
        let mut report = SuiteReport::default();
        let mut blocker: Option<&str> = None;

        for case in &self.cases {
            if let Some(failed) = blocker {
                tracing::warn!("Skipping {}: {} failed", case.name, failed);
                report.results.push((
                    case.name.clone(),
                    CaseOutcome::Skipped(format!("depends on failed case {}", failed)),
                ));
                continue;
            }

            let session = format!(
                "{}-{}-{:06x}",
                self.session_prefix,
                case.name,
                rand::rng().random_range(0..0x100_0000u32)
            );
            tracing::info!("Running {} (session {})", case.name, session);

            let browser = launch(&session);
            let result = self.run_case(&browser, case).await;

            if let Err(e) = browser.close().await {
                tracing::warn!("Failed to close session {}: {}", session, e);
            }

            let outcome = match result {
                Ok(()) => CaseOutcome::Passed,
                Err(e) => {
                    tracing::error!("{} failed: {}", case.name, e);
                    blocker = Some(case.name.as_str());
                    CaseOutcome::Failed(e.to_string())
                }
            };
            report.results.push((case.name.clone(), outcome));
        }

        report
    }

    async fn run_case(&self, browser: &dyn Browser, case: &Case) -> Result<()> {
        for (index, step) in case.steps.iter().enumerate() {
            tracing::debug!("{} step {}: {}", case.name, index, step);
            self.run_step(browser, step).await.map_err(|e| {
                ElmAppError::with_context(format!("step {} ({})", index, step), e)
            })?;
        }
        Ok(())
    }

    async fn run_step(&self, browser: &dyn Browser, step: &Step) -> Result<()> {
        match step {
            Step::Open(url) => browser.open(url).await,
            Step::Click(locator) => browser.click(locator).await,
            Step::Fill(locator, text) => browser.fill(locator, text).await,
            Step::Upload(locator, path) => browser.upload(locator, path).await,
            Step::Wait(condition) => wait_until(browser, condition, self.timeout, self.poll).await,
            Step::AssertTitleContains(text) => {
                let title = browser.title().await?;
                if title.contains(text.as_str()) {
                    Ok(())
                } else {
                    Err(ElmAppError::assertion(format!(
                        "title '{}' does not contain '{}'",
                        title, text
                    )))
                }
            }
            Step::AssertPresent(locator) => {
                if browser.is_present(locator).await? {
                    Ok(())
                } else {
                    Err(ElmAppError::assertion(format!("{} not found", locator)))
                }
            }
            Step::AssertAlertText(expected) => match browser.alert_text().await? {
                Some(text) if text == *expected => Ok(()),
                Some(text) => Err(ElmAppError::assertion(format!(
                    "alert text '{}' != '{}'",
                    text, expected
                ))),
                None => Err(ElmAppError::assertion("no alert open")),
            },
            Step::AcceptAlert => browser.accept_alert().await,
        }
    }
}

/// Fail unless the instance under test answers HTTP
pub async fn check_reachable(url: &str) -> Result<()> {
    let response = reqwest::Client::new()
        .get(url)
        .timeout(Duration::from_secs(5))
        .send()
        .await?;

    tracing::debug!("{} answered {}", url, response.status());
    Ok(())
}
