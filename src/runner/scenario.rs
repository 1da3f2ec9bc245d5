use anyhow::Result;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use super::context::ScenarioContext;
use crate::driver::BrowserType;
use crate::report::allure::{Label, Parameter, TestMetadata};

pub type ScenarioFn = for<'a> fn(&'a ScenarioContext) -> BoxFuture<'a, Result<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Blocker,
    Critical,
    Normal,
    Minor,
    Trivial,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Blocker => "blocker",
            Severity::Critical => "critical",
            Severity::Normal => "normal",
            Severity::Minor => "minor",
            Severity::Trivial => "trivial",
        }
    }
}

/// A registered test scenario and its report metadata
pub struct Scenario {
    /// Test case ID, e.g. `TC-001`
    pub id: &'static str,
    /// Function name, e.g. `test_login_with_unactivated_account`
    pub name: &'static str,
    pub module: &'static str,
    pub class: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub parent_suite: &'static str,
    pub suite: &'static str,
    pub sub_suite: &'static str,
    pub owner: &'static str,
    pub severity: Severity,
    pub tags: &'static [&'static str],
    pub markers: &'static [&'static str],
    /// Reason the scenario is skipped unconditionally
    pub skip: Option<&'static str>,
    pub run: ScenarioFn,
}

impl Scenario {
    pub fn full_name(&self) -> String {
        format!("{}.{}#{}", self.module, self.class, self.name)
    }

    pub fn labels(&self) -> Vec<Label> {
        let mut labels = vec![
            Label::new("AS_ID", self.id),
            Label::new("parentSuite", self.parent_suite),
            Label::new("suite", self.suite),
            Label::new("subSuite", self.sub_suite),
            Label::new("owner", self.owner),
            Label::new("severity", self.severity.as_str()),
            Label::new("package", self.module),
            Label::new("testClass", self.class),
            Label::new("testMethod", self.name),
            Label::new("framework", env!("CARGO_PKG_NAME")),
            Label::new("language", "rust"),
        ];
        labels.extend(self.tags.iter().map(|t| Label::new("tag", t)));
        labels
    }

    /// `-k` selection: every space-separated term must match the name, class or
    /// module (case-insensitive); `not <term>` negates a term
    pub fn matches_keyword(&self, expression: &str) -> bool {
        let haystack = format!("{} {} {}", self.module, self.class, self.name).to_lowercase();
        evaluate_terms(expression, |term| haystack.contains(&term.to_lowercase()))
    }

    /// `-m` selection: `auth`, `not flaky`, `auth and smoke`
    pub fn has_marker(&self, expression: &str) -> bool {
        evaluate_terms(expression, |term| self.markers.iter().any(|m| *m == term))
    }
}

fn evaluate_terms(expression: &str, matches: impl Fn(&str) -> bool) -> bool {
    expression
        .split(" and ")
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .all(|term| match term.strip_prefix("not ") {
            Some(negated) => !matches(negated.trim()),
            None => matches(term),
        })
}

/// One scenario parameterized by browser
#[derive(Clone)]
pub struct TestItem {
    pub scenario: &'static Scenario,
    pub browser: BrowserType,
    /// `test_x[chromium]`
    pub name: String,
}

impl TestItem {
    pub fn new(scenario: &'static Scenario, browser: BrowserType) -> Self {
        Self {
            scenario,
            browser,
            name: format!("{}[{}]", scenario.name, browser),
        }
    }

    /// Expand scenarios over browsers and apply the keyword and marker filters
    pub fn collect(
        scenarios: &[&'static Scenario],
        browsers: &[BrowserType],
        keyword: Option<&str>,
        marker: Option<&str>,
    ) -> Vec<TestItem> {
        let mut items = Vec::new();
        for &scenario in scenarios {
            if keyword.is_some_and(|k| !scenario.matches_keyword(k)) {
                continue;
            }
            if marker.is_some_and(|m| !scenario.has_marker(m)) {
                continue;
            }
            for browser in browsers {
                items.push(TestItem::new(scenario, *browser));
            }
        }
        items
    }

    pub fn class_name(&self) -> String {
        format!("{}.{}", self.scenario.module, self.scenario.class)
    }

    /// Per-invocation artifact folder: the slugified test node ID
    pub fn artifact_folder_name(&self) -> String {
        let node_id = format!(
            "{}.rs::{}::{}",
            self.scenario.module, self.scenario.class, self.name
        );
        slugify(&node_id)
    }

    pub fn metadata(&self) -> TestMetadata {
        TestMetadata {
            name: self.scenario.title.to_string(),
            full_name: self.scenario.full_name(),
            description: Some(self.scenario.description.trim().to_string())
                .filter(|d| !d.is_empty()),
            labels: self.scenario.labels(),
            parameters: vec![Parameter {
                name: "browser_name".to_string(),
                value: self.browser.to_string(),
            }],
        }
    }
}

/// Lowercase, with every run of non-alphanumeric characters collapsed to `-`
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}
