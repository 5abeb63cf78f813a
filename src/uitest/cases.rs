//! Regression cases for the anvio user-facing workflows
//!
//! Registration, login, password reset, project upload, sharing and
//! deletion, in the order they depend on each other.

use std::path::{Path, PathBuf};

use url::Url;

use crate::core::config::SuiteConfig;
use crate::core::{ElmAppError, Result};
use crate::uitest::locator::{Condition, Locator};
use crate::uitest::suite::{Case, Step};

pub const SUCCESS_BANNER: &str = r#"//div[@class="alert alert-success col-sm-6"]"#;
pub const TITLE_REGISTRATION: &str = "anvio account registration";
pub const TITLE_USER_HOME: &str = "anvio user home";
pub const TITLE_FORGOT_PASSWORD: &str = "anvio forgot password";
pub const INVALID_EMAIL: &str = "invalid@email.com";
pub const PROJECT_ALL_FILES: &str = "test_project_with_all_files";
pub const PROJECT_MINIMAL: &str = "test_project_minimal";

/// Alert shown when resetting the password of an unknown address
pub fn reset_failed_message(email: &str) -> String {
    format!(
        "Resetting password failed: No user has been found for email address \"{}\"",
        email
    )
}

/// Normalize a base URL; a bare `host:port` gets `http://`
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };

    Url::parse(&with_scheme)
        .map_err(|e| ElmAppError::config(format!("Invalid base URL '{}': {}", raw, e)))
}

/// Builds the anvio cases from suite settings
pub struct AnvioCases {
    base_url: String,
    user: String,
    email: String,
    password: String,
    fixtures: PathBuf,
}

impl AnvioCases {
    pub fn new(config: &SuiteConfig) -> Result<Self> {
        let base_url = parse_base_url(&config.base_url)?;
        let fixtures = std::path::absolute(&config.fixtures_dir)?;

        Ok(Self {
            base_url: base_url.to_string(),
            user: config.user.clone(),
            email: config.email.clone(),
            password: config.password.clone(),
            fixtures,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn fixture(&self, name: &str) -> PathBuf {
        self.fixtures.join(name)
    }

    fn open(&self) -> Step {
        Step::Open(self.base_url.clone())
    }

    fn login(&self) -> Vec<Step> {
        vec![
            self.open(),
            Step::Fill(Locator::id("login"), self.user.clone()),
            Step::Fill(Locator::id("password"), self.password.clone()),
            Step::Click(Locator::id("loginButton")),
        ]
    }

    /// Every case, in run order
    pub fn all(&self) -> Vec<Case> {
        vec![
            self.register_new_user(),
            self.login_case(),
            self.forgot_password_invalid(),
            self.forgot_password_valid(),
            self.create_project_with_all_files(),
            self.create_project_with_minimal_input(),
            self.select_project(),
            self.share_project(),
            self.add_additional_data_file(),
            self.delete_project(),
            Case::new("10_delete_user", Vec::new()),
        ]
    }

    fn register_new_user(&self) -> Case {
        let banner = Locator::xpath(SUCCESS_BANNER);
        let mut steps = vec![
            self.open(),
            Step::Click(Locator::link_text("Register")),
            Step::Wait(Condition::TitleIs(TITLE_REGISTRATION.to_string())),
        ];

        let fields = [
            ("inputFirstname", "Test"),
            ("inputLastname", "User"),
            ("inputAffiliation", "anvio"),
            ("inputLogin", self.user.as_str()),
            ("inputPassword", self.password.as_str()),
            ("inputRepeatPassword", self.password.as_str()),
            ("inputEmail", self.email.as_str()),
        ];
        for (id, value) in fields {
            steps.push(Step::Fill(Locator::id(id), value.to_string()));
        }

        steps.extend([
            Step::Click(Locator::id("submit")),
            Step::Wait(Condition::PresenceOf(banner.clone())),
            Step::AssertPresent(banner),
        ]);

        Case::new("00_register_new_user", steps)
    }

    fn login_case(&self) -> Case {
        let mut steps = self.login();
        steps.extend([
            Step::Wait(Condition::TitleIs(TITLE_USER_HOME.to_string())),
            Step::AssertTitleContains(TITLE_USER_HOME.to_string()),
        ]);
        Case::new("02_login", steps)
    }

    fn forgot_password(&self, email: &str) -> Vec<Step> {
        vec![
            self.open(),
            Step::Click(Locator::link_text("forgot password?")),
            Step::Wait(Condition::TitleIs(TITLE_FORGOT_PASSWORD.to_string())),
            Step::Fill(Locator::id("inputEmail"), email.to_string()),
            Step::Click(Locator::id("submit")),
        ]
    }

    fn forgot_password_invalid(&self) -> Case {
        let mut steps = self.forgot_password(INVALID_EMAIL);
        steps.extend([
            Step::Wait(Condition::AlertPresent),
            Step::AssertAlertText(reset_failed_message(INVALID_EMAIL)),
        ]);
        Case::new("03_forgot_password_invalid", steps)
    }

    fn forgot_password_valid(&self) -> Case {
        let banner = Locator::xpath(SUCCESS_BANNER);
        let mut steps = self.forgot_password(&self.email);
        steps.extend([
            Step::Wait(Condition::PresenceOf(banner.clone())),
            Step::AssertPresent(banner),
        ]);
        Case::new("04_forgot_password_valid", steps)
    }

    fn create_project(&self, name: &str, title: &str, files: &[(&str, &str)]) -> Case {
        let upload = Locator::button_titled("upload data files");
        let link = Locator::link_text(title);

        let mut steps = self.login();
        steps.extend([
            Step::Wait(Condition::VisibilityOf(upload.clone())),
            Step::Click(upload),
            Step::Wait(Condition::VisibilityOf(Locator::id("uploadTitle"))),
            Step::Fill(Locator::id("uploadTitle"), title.to_string()),
            Step::Fill(
                Locator::id("uploadDescription"),
                "description of test project".to_string(),
            ),
        ]);

        for (input, file) in files {
            steps.push(Step::Upload(Locator::id(*input), self.fixture(file)));
        }

        steps.extend([
            Step::Click(Locator::id("uploadFiles")),
            Step::Wait(Condition::PresenceOf(link.clone())),
            Step::AssertPresent(link),
        ]);

        Case::new(name, steps)
    }

    fn create_project_with_all_files(&self) -> Case {
        self.create_project(
            "05_create_project_with_all_files",
            PROJECT_ALL_FILES,
            &[
                ("treeFileSelect", "tree.txt"),
                ("fastaFileSelect", "fasta.fa"),
                ("dataFileSelect", "view_data.txt"),
                ("samplesOrderFileSelect", "samples-order.txt"),
                ("samplesInformationFileSelect", "samples-information.txt"),
            ],
        )
    }

    fn create_project_with_minimal_input(&self) -> Case {
        self.create_project(
            "05_create_project_with_minimal_input",
            PROJECT_MINIMAL,
            &[
                ("treeFileSelect", "tree.txt"),
                ("dataFileSelect", "view_data.txt"),
            ],
        )
    }

    fn select_project(&self) -> Case {
        let link = Locator::link_text(PROJECT_ALL_FILES);
        let mut steps = self.login();
        steps.extend([
            Step::Wait(Condition::PresenceOf(link.clone())),
            Step::Click(link),
            Step::Wait(Condition::TitleIs(PROJECT_ALL_FILES.to_string())),
            Step::AssertTitleContains(PROJECT_ALL_FILES.to_string()),
        ]);
        Case::new("06_select_project", steps)
    }

    fn share_project(&self) -> Case {
        let share = Locator::button_titled("share project");
        let description = Locator::id("projectDescription");
        let mut steps = self.login();
        steps.extend([
            Step::Wait(Condition::PresenceOf(share.clone())),
            Step::Click(share),
            Step::Wait(Condition::VisibilityOf(Locator::id("projectName"))),
            Step::Fill(Locator::id("projectName"), "testShare".to_string()),
            Step::Click(Locator::id("shareProject")),
            Step::Wait(Condition::VisibilityOf(description.clone())),
            Step::AssertPresent(description),
        ]);
        Case::new("07_share_project", steps)
    }

    fn add_additional_data_file(&self) -> Case {
        let add = Locator::button_titled("add data");
        let settings = Locator::button_titled("project settings");
        let mut steps = self.login();
        steps.extend([
            Step::Wait(Condition::PresenceOf(add.clone())),
            Step::Click(add),
            Step::Wait(Condition::VisibilityOf(Locator::id("additionalFileType"))),
            Step::Upload(
                Locator::id("additionalFileSelect"),
                self.fixture("additional_view_data.txt"),
            ),
            Step::Click(Locator::id("uploadAdditional")),
            Step::Wait(Condition::VisibilityOf(settings.clone())),
            Step::Click(settings),
            Step::Wait(Condition::PresenceOf(Locator::id("pfc3"))),
            Step::AssertPresent(Locator::id("pfc3")),
        ]);
        Case::new("08_add_additional_data_file", steps)
    }

    fn delete_project(&self) -> Case {
        let delete = Locator::button_titled("delete project");
        let mut steps = self.login();
        steps.extend([
            Step::Wait(Condition::PresenceOf(delete.clone())),
            Step::Click(delete),
            Step::Wait(Condition::AlertPresent),
            Step::AcceptAlert,
            Step::Wait(Condition::VisibilityOf(Locator::button_titled(
                "upload data files",
            ))),
        ]);
        Case::new("09_delete_project", steps)
    }
}

/// Fixture files the upload cases need, missing ones first
pub fn missing_fixtures(dir: &Path) -> Vec<PathBuf> {
    [
        "tree.txt",
        "fasta.fa",
        "view_data.txt",
        "samples-order.txt",
        "samples-information.txt",
        "additional_view_data.txt",
    ]
    .iter()
    .map(|name| dir.join(name))
    .filter(|path| !path.exists())
    .collect()
}
