//! Validated CRUD, filtering, and totals for profile transactions.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{Profile, Transaction, TransactionKind};

use super::{RuleService, ServiceError, ServiceResult};

/// Criteria for selecting transactions. Empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category_ids: Vec<Uuid>,
    pub kind: Option<TransactionKind>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    /// Case-insensitive substring over description and merchant.
    pub search: Option<String>,
    pub tags: Vec<String>,
    pub account: Option<String>,
    pub is_recurring: Option<bool>,
}

#[derive(Debug)]
pub struct TransactionPage<'a> {
    pub transactions: Vec<&'a Transaction>,
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionTotals {
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
    pub count: usize,
}

pub struct TransactionService;

impl TransactionService {
    /// Adds a transaction, categorizing it through the rule set when no
    /// category was given.
    pub fn add(profile: &mut Profile, mut transaction: Transaction) -> ServiceResult<Uuid> {
        Self::validate(profile, &transaction)?;
        transaction.tags = Self::normalize_tags(&transaction.tags);
        if transaction.category_id.is_none() {
            transaction.category_id = RuleService::categorize(profile, &transaction);
        }
        Ok(profile.add_transaction(transaction))
    }

    pub fn get<'a>(profile: &'a Profile, id: Uuid) -> ServiceResult<&'a Transaction> {
        profile
            .transaction(id)
            .ok_or_else(|| ServiceError::NotFound(format!("transaction {id}")))
    }

    pub fn edit(profile: &mut Profile, id: Uuid, changes: Transaction) -> ServiceResult<()> {
        Self::validate(profile, &changes)?;
        let tags = Self::normalize_tags(&changes.tags);
        let transaction = profile
            .transaction_mut(id)
            .ok_or_else(|| ServiceError::NotFound(format!("transaction {id}")))?;
        transaction.category_id = changes.category_id;
        transaction.amount = changes.amount;
        transaction.occurred_on = changes.occurred_on;
        transaction.description = changes.description;
        transaction.kind = changes.kind;
        transaction.account = changes.account;
        transaction.merchant = changes.merchant;
        transaction.notes = changes.notes;
        transaction.tags = tags;
        transaction.is_recurring = changes.is_recurring;
        profile.touch();
        Ok(())
    }

    pub fn remove(profile: &mut Profile, id: Uuid) -> ServiceResult<()> {
        let before = profile.transactions.len();
        profile.transactions.retain(|txn| txn.id != id);
        if profile.transactions.len() == before {
            return Err(ServiceError::NotFound(format!("transaction {id}")));
        }
        profile.touch();
        Ok(())
    }

    /// Filters, sorts newest-first, and paginates.
    pub fn list<'a>(
        profile: &'a Profile,
        filter: &TransactionFilter,
        offset: usize,
        limit: Option<usize>,
    ) -> TransactionPage<'a> {
        let mut matches: Vec<&Transaction> = profile
            .transactions
            .iter()
            .filter(|txn| Self::matches(filter, txn))
            .collect();
        matches.sort_by(|a, b| {
            b.occurred_on
                .cmp(&a.occurred_on)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = matches.len();
        let transactions = matches
            .into_iter()
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .collect();
        TransactionPage {
            transactions,
            total,
        }
    }

    pub fn totals(profile: &Profile, filter: &TransactionFilter) -> TransactionTotals {
        let mut totals = TransactionTotals::default();
        for txn in profile
            .transactions
            .iter()
            .filter(|txn| Self::matches(filter, txn))
        {
            match txn.kind {
                TransactionKind::Income => totals.income += txn.amount,
                TransactionKind::Expense => totals.expense += txn.amount,
                TransactionKind::Transfer => {}
            }
            totals.count += 1;
        }
        totals.net = totals.income - totals.expense;
        totals
    }

    fn matches(filter: &TransactionFilter, txn: &Transaction) -> bool {
        if let Some(start) = filter.start_date {
            if txn.occurred_on < start {
                return false;
            }
        }
        if let Some(end) = filter.end_date {
            if txn.occurred_on > end {
                return false;
            }
        }
        if !filter.category_ids.is_empty() {
            match txn.category_id {
                Some(id) if filter.category_ids.contains(&id) => {}
                _ => return false,
            }
        }
        if let Some(kind) = &filter.kind {
            if &txn.kind != kind {
                return false;
            }
        }
        if let Some(min) = filter.min_amount {
            if txn.amount < min {
                return false;
            }
        }
        if let Some(max) = filter.max_amount {
            if txn.amount > max {
                return false;
            }
        }
        if let Some(search) = &filter.search {
            let needle = search.to_lowercase();
            let in_description = txn.description.to_lowercase().contains(&needle);
            let in_merchant = txn
                .merchant
                .as_deref()
                .map_or(false, |merchant| merchant.to_lowercase().contains(&needle));
            if !in_description && !in_merchant {
                return false;
            }
        }
        if !filter.tags.is_empty() {
            let any = filter
                .tags
                .iter()
                .any(|tag| txn.has_tag(&tag.trim().to_lowercase()));
            if !any {
                return false;
            }
        }
        if let Some(account) = &filter.account {
            match txn.account.as_deref() {
                Some(name) if name.eq_ignore_ascii_case(account) => {}
                _ => return false,
            }
        }
        if let Some(recurring) = filter.is_recurring {
            if txn.is_recurring != recurring {
                return false;
            }
        }
        true
    }

    fn normalize_tags(tags: &[String]) -> Vec<String> {
        let mut normalized: Vec<String> = Vec::new();
        for tag in tags {
            let tag = tag.trim().to_lowercase();
            if !tag.is_empty() && !normalized.contains(&tag) {
                normalized.push(tag);
            }
        }
        normalized
    }

    fn validate(profile: &Profile, txn: &Transaction) -> ServiceResult<()> {
        if txn.amount < Decimal::ZERO {
            return Err(ServiceError::Invalid(
                "Transaction amount cannot be negative".into(),
            ));
        }
        if txn.description.trim().is_empty() {
            return Err(ServiceError::Invalid(
                "Transaction description cannot be empty".into(),
            ));
        }
        if let Some(category_id) = txn.category_id {
            if profile.category(category_id).is_none() {
                return Err(ServiceError::NotFound(format!("category {category_id}")));
            }
        }
        Ok(())
    }
}
