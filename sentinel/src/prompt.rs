//! Generation contexts handed to the provider.
//!
//! Both contexts carry the rule set (as YAML) so the provider sees the same
//! governance rules the pipeline loaded.

use anyhow::{Context, Result};
use minijinja::{Environment, context};
use serde::Serialize;

use crate::core::rules::RuleSet;

const TESTS_TEMPLATE: &str = include_str!("prompts/tests.md");
const CODE_TEMPLATE: &str = include_str!("prompts/code.md");

/// Template engine wrapper around minijinja.
pub struct PromptEngine {
    env: Environment<'static>,
}

impl Default for PromptEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("tests", TESTS_TEMPLATE)
            .expect("tests template should be valid");
        env.add_template("code", CODE_TEMPLATE)
            .expect("code template should be valid");
        Self { env }
    }

    /// Context for the test-generation stage.
    pub fn test_context(&self, rules: &RuleSet) -> Result<String> {
        let template = self.env.get_template("tests")?;
        let rendered = template.render(context! {
            summary => rules.summary(),
            rules_yaml => rules_yaml(rules)?,
            owasp => rules.owasp,
            atomic_design => rules.atomic_design,
        })?;
        Ok(rendered)
    }

    /// Context for the code-generation stage, embedding the generated tests.
    pub fn code_context(&self, rules: &RuleSet, tests: &str) -> Result<String> {
        let template = self.env.get_template("code")?;
        let rendered = template.render(context! {
            summary => rules.summary(),
            rules_yaml => rules_yaml(rules)?,
            tests => tests.trim_end(),
            owasp => rules.owasp,
            atomic_design => rules.atomic_design,
            documentation => rules.documentation.as_str(),
        })?;
        Ok(rendered)
    }
}

/// Request text for the test-generation stage.
pub fn test_request(prompt: &str) -> String {
    format!("Write tests for: {prompt}")
}

#[derive(Serialize)]
struct RulesDocument<'a> {
    rules: &'a RuleSet,
}

fn rules_yaml(rules: &RuleSet) -> Result<String> {
    serde_yaml::to_string(&RulesDocument { rules }).context("serialize rules")
}
