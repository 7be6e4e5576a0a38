//! Rule-based auto-categorization of transactions.

use regex::RegexBuilder;
use uuid::Uuid;

use crate::domain::{CategoryRule, Profile, Transaction};

use super::{ServiceError, ServiceResult};

/// Outcome of running the rule set over stored transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleApplication {
    pub processed: usize,
    pub categorized: usize,
    pub skipped: usize,
}

pub struct RuleService;

impl RuleService {
    pub fn add(profile: &mut Profile, rule: CategoryRule) -> ServiceResult<Uuid> {
        Self::validate(profile, &rule, None)?;
        Ok(profile.add_rule(rule))
    }

    pub fn edit(profile: &mut Profile, id: Uuid, changes: CategoryRule) -> ServiceResult<()> {
        Self::validate(profile, &changes, Some(id))?;
        let rule = profile
            .rule_mut(id)
            .ok_or_else(|| ServiceError::NotFound(format!("rule {id}")))?;
        rule.category_id = changes.category_id;
        rule.name = changes.name;
        rule.description_pattern = changes.description_pattern;
        rule.merchant_pattern = changes.merchant_pattern;
        rule.min_amount = changes.min_amount;
        rule.max_amount = changes.max_amount;
        rule.kind = changes.kind;
        rule.priority = changes.priority;
        rule.is_active = changes.is_active;
        profile.touch();
        Ok(())
    }

    pub fn remove(profile: &mut Profile, id: Uuid) -> ServiceResult<()> {
        let before = profile.rules.len();
        profile.rules.retain(|rule| rule.id != id);
        if profile.rules.len() == before {
            return Err(ServiceError::NotFound(format!("rule {id}")));
        }
        profile.touch();
        Ok(())
    }

    /// All rules, highest priority first.
    pub fn list<'a>(profile: &'a Profile) -> Vec<&'a CategoryRule> {
        let mut rules: Vec<&CategoryRule> = profile.rules.iter().collect();
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        rules
    }

    /// True when every condition the rule carries holds for the transaction.
    /// A pattern condition fails when the transaction lacks that field.
    pub fn matches(rule: &CategoryRule, txn: &Transaction) -> bool {
        if let Some(kind) = &rule.kind {
            if &txn.kind != kind {
                return false;
            }
        }
        if let Some(min) = rule.min_amount {
            if txn.amount < min {
                return false;
            }
        }
        if let Some(max) = rule.max_amount {
            if txn.amount > max {
                return false;
            }
        }
        if let Some(pattern) = &rule.description_pattern {
            if !Self::pattern_matches(pattern, Some(&txn.description)) {
                return false;
            }
        }
        if let Some(pattern) = &rule.merchant_pattern {
            if !Self::pattern_matches(pattern, txn.merchant.as_deref()) {
                return false;
            }
        }
        true
    }

    /// Category assigned by the first matching active rule, highest priority
    /// first. Rules pointing at a removed category are ignored.
    pub fn categorize(profile: &Profile, txn: &Transaction) -> Option<Uuid> {
        let mut rules: Vec<&CategoryRule> = profile
            .rules
            .iter()
            .filter(|rule| rule.is_active)
            .filter(|rule| profile.category(rule.category_id).is_some())
            .collect();
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        rules
            .into_iter()
            .find(|rule| Self::matches(rule, txn))
            .map(|rule| rule.category_id)
    }

    /// Runs the rule set over stored transactions. Categorized transactions
    /// are left alone unless `override_existing` is set.
    pub fn apply_to_existing(profile: &mut Profile, override_existing: bool) -> RuleApplication {
        let mut outcome = RuleApplication::default();
        let mut assignments: Vec<(usize, Uuid)> = Vec::new();

        for (index, txn) in profile.transactions.iter().enumerate() {
            outcome.processed += 1;
            if txn.category_id.is_some() && !override_existing {
                outcome.skipped += 1;
                continue;
            }
            match Self::categorize(profile, txn) {
                Some(category_id) => assignments.push((index, category_id)),
                None => outcome.skipped += 1,
            }
        }

        outcome.categorized = assignments.len();
        for (index, category_id) in assignments {
            profile.transactions[index].category_id = Some(category_id);
        }
        if outcome.categorized > 0 {
            profile.touch();
        }
        outcome
    }

    fn pattern_matches(pattern: &str, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(regex) => regex.is_match(value),
            Err(_) => false,
        }
    }

    fn validate(
        profile: &Profile,
        rule: &CategoryRule,
        exclude: Option<Uuid>,
    ) -> ServiceResult<()> {
        if rule.name.trim().is_empty() {
            return Err(ServiceError::Invalid("Rule name cannot be empty".into()));
        }
        let normalized = rule.name.trim().to_lowercase();
        let duplicate = profile.rules.iter().any(|existing| {
            existing.name.trim().to_lowercase() == normalized
                && exclude.map_or(true, |id| existing.id != id)
        });
        if duplicate {
            return Err(ServiceError::Invalid(format!(
                "Rule `{}` already exists",
                rule.name
            )));
        }
        if profile.category(rule.category_id).is_none() {
            return Err(ServiceError::NotFound(format!(
                "category {}",
                rule.category_id
            )));
        }
        for pattern in [&rule.description_pattern, &rule.merchant_pattern]
            .into_iter()
            .flatten()
        {
            if let Err(err) = RegexBuilder::new(pattern).case_insensitive(true).build() {
                return Err(ServiceError::Invalid(format!("Invalid pattern: {err}")));
            }
        }
        if let (Some(min), Some(max)) = (rule.min_amount, rule.max_amount) {
            if min > max {
                return Err(ServiceError::Invalid(
                    "Minimum amount cannot exceed maximum".into(),
                ));
            }
        }
        Ok(())
    }
}
