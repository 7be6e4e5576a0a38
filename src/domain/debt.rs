use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{Identifiable, NamedEntity};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debt {
    pub id: Uuid,
    pub name: String,
    pub kind: DebtKind,
    pub status: DebtStatus,
    pub original_amount: Decimal,
    pub current_balance: Decimal,
    /// Annual percentage rate as a percent value, e.g. `18.5` for 18.5%.
    pub interest_rate: Decimal,
    pub minimum_payment: Decimal,
    /// Day of month the payment is due (1-31).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_day: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub opened_on: NaiveDate,
    pub is_active: bool,
    #[serde(default)]
    pub payments: Vec<DebtPayment>,
}

impl Debt {
    pub fn new(
        name: impl Into<String>,
        kind: DebtKind,
        original_amount: Decimal,
        current_balance: Decimal,
        interest_rate: Decimal,
        minimum_payment: Decimal,
        opened_on: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            status: DebtStatus::Active,
            original_amount,
            current_balance,
            interest_rate,
            minimum_payment,
            due_day: None,
            lender: None,
            notes: None,
            opened_on,
            is_active: true,
            payments: Vec::new(),
        }
    }

    pub fn is_paid_off(&self) -> bool {
        matches!(self.status, DebtStatus::PaidOff)
    }

    /// Sum of all recorded payment amounts.
    pub fn total_paid(&self) -> Decimal {
        self.payments.iter().map(|payment| payment.amount).sum()
    }

    /// Sum of the interest portion across recorded payments.
    pub fn total_interest_paid(&self) -> Decimal {
        self.payments
            .iter()
            .map(|payment| payment.interest_amount)
            .sum()
    }
}

impl Identifiable for Debt {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Debt {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebtKind {
    CreditCard,
    PersonalLoan,
    StudentLoan,
    Mortgage,
    AutoLoan,
    MedicalDebt,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DebtStatus {
    Active,
    PaidOff,
    InCollections,
    WrittenOff,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtPayment {
    pub id: Uuid,
    pub debt_id: Uuid,
    pub amount: Decimal,
    pub paid_on: NaiveDate,
    pub principal_amount: Decimal,
    pub interest_amount: Decimal,
    #[serde(default)]
    pub is_extra: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl DebtPayment {
    pub fn new(
        debt_id: Uuid,
        amount: Decimal,
        paid_on: NaiveDate,
        principal_amount: Decimal,
        interest_amount: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            debt_id,
            amount,
            paid_on,
            principal_amount,
            interest_amount,
            is_extra: false,
            notes: None,
        }
    }
}

impl Identifiable for DebtPayment {
    fn id(&self) -> Uuid {
        self.id
    }
}
