//! UI regression module
//!
//! Drives a browser through the hosting instance's user-facing workflows
//! and asserts on the resulting page state.

mod browser;
pub mod cases;
mod locator;
mod suite;
mod wait;

pub use browser::{AgentBrowser, Browser};
pub use cases::AnvioCases;
pub use locator::{Condition, Locator};
pub use suite::{check_reachable, Case, CaseOutcome, Step, Suite, SuiteReport};
pub use wait::wait_until;
