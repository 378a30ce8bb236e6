use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use wb_domain::types::*;

#[derive(Debug, Error)]
pub enum SkipError {
    #[error("Invalid regex in skip condition: {0}")]
    InvalidRegex(#[from] regex::Error),
}

/// A reason to leave a page untouched. Conditions are checked in order and
/// the first one that fires wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipCondition {
    Missing,
    IsRedirect,
    Namespace { allowed: HashSet<Namespace> },
    RegexMatch { pattern: String, invert: bool },
}

pub struct SkipEngine {
    conditions: Vec<SkipCondition>,
    compiled_regexes: Vec<(usize, regex::Regex)>,
}

impl SkipEngine {
    pub fn new(conditions: Vec<SkipCondition>) -> Result<Self, SkipError> {
        let mut compiled = Vec::new();
        for (i, cond) in conditions.iter().enumerate() {
            if let SkipCondition::RegexMatch { pattern, .. } = cond {
                compiled.push((i, regex::Regex::new(pattern)?));
            }
        }
        Ok(Self {
            conditions,
            compiled_regexes: compiled,
        })
    }

    /// Existing, non-redirect pages only, then `extra` in order.
    pub fn existing_non_redirect(extra: Vec<SkipCondition>) -> Result<Self, SkipError> {
        let mut conditions = vec![SkipCondition::Missing, SkipCondition::IsRedirect];
        conditions.extend(extra);
        Self::new(conditions)
    }

    pub fn evaluate(&self, page: &PageContent) -> SkipDecision {
        for (i, cond) in self.conditions.iter().enumerate() {
            match cond {
                SkipCondition::Missing => {
                    if !page.exists {
                        return SkipDecision::Skip("page does not exist");
                    }
                }
                SkipCondition::IsRedirect => {
                    if page.is_redirect {
                        return SkipDecision::Skip("is redirect");
                    }
                }
                SkipCondition::Namespace { allowed } => {
                    if !allowed.contains(&page.title.namespace) {
                        return SkipDecision::Skip("namespace filtered");
                    }
                }
                SkipCondition::RegexMatch { invert, .. } => {
                    if let Some((_, re)) = self.compiled_regexes.iter().find(|(idx, _)| *idx == i)
                    {
                        let matches = re.is_match(&page.wikitext);
                        if *invert && matches {
                            return SkipDecision::Skip("regex match (inverted)");
                        }
                        if !invert && !matches {
                            return SkipDecision::Skip("regex no match");
                        }
                    }
                }
            }
        }
        SkipDecision::Process
    }
}
