//! Purchase transactions and their converted form.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PurchaseError, Result};
use crate::identifiers::TransactionId;

/// Maximum description length, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 50;

/// Annotation appended to the description of a purchase that has no usable rate.
pub const UNCONVERTIBLE_SUFFIX: &str = " (Cannot be converted to the target currency)";

/// Decimal places of a converted amount.
pub const CONVERTED_AMOUNT_DP: u32 = 2;

/// A stored purchase, denominated in USD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub description: String,
    pub transaction_date: NaiveDate,
    pub amount_usd: Decimal,
}

/// A purchase that has not been stored yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    pub description: String,
    pub transaction_date: NaiveDate,
    pub amount_usd: Decimal,
}

impl NewTransaction {
    /// Create a new purchase request.
    pub fn new(
        description: impl Into<String>,
        transaction_date: NaiveDate,
        amount_usd: Decimal,
    ) -> Self {
        Self {
            description: description.into(),
            transaction_date,
            amount_usd,
        }
    }

    /// Check the creation rules.
    pub fn validate(&self) -> Result<()> {
        if self.amount_usd <= Decimal::ZERO {
            return Err(PurchaseError::invalid_field(
                "amount_usd",
                "Purchase amount must be positive",
            ));
        }

        if self.description.trim().is_empty()
            || self.description.chars().count() > MAX_DESCRIPTION_LEN
        {
            return Err(PurchaseError::invalid_field(
                "description",
                "Description is invalid or too long",
            ));
        }

        Ok(())
    }

    /// Assign an identifier. Does not validate.
    pub fn into_transaction(self) -> Transaction {
        Transaction {
            id: TransactionId::new(),
            description: self.description,
            transaction_date: self.transaction_date,
            amount_usd: self.amount_usd,
        }
    }
}

/// A purchase expressed in a target currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertedTransaction {
    pub id: TransactionId,
    pub description: String,
    pub transaction_date: NaiveDate,
    pub amount_usd: Decimal,
    /// Zero when no rate applied.
    pub rate_applied: Decimal,
    /// Zero when no rate applied.
    pub converted_amount: Decimal,
    pub target_currency: String,
}

impl ConvertedTransaction {
    /// Convert at `rate` (target units per USD), rounding to cents.
    pub fn converted(
        transaction: &Transaction,
        rate: Decimal,
        target_currency: &str,
    ) -> Result<Self> {
        let converted_amount = transaction
            .amount_usd
            .checked_mul(rate)
            .ok_or_else(|| {
                PurchaseError::InternalError(format!(
                    "amount overflow converting transaction {}",
                    transaction.id
                ))
            })?
            .round_dp(CONVERTED_AMOUNT_DP);
        Ok(Self {
            id: transaction.id,
            description: transaction.description.clone(),
            transaction_date: transaction.transaction_date,
            amount_usd: transaction.amount_usd,
            rate_applied: rate,
            converted_amount,
            target_currency: target_currency.to_string(),
        })
    }

    /// Zeroed record for a purchase with no rate in its lookback window.
    pub fn unconvertible(transaction: &Transaction, target_currency: &str) -> Self {
        Self {
            id: transaction.id,
            description: format!("{}{}", transaction.description, UNCONVERTIBLE_SUFFIX),
            transaction_date: transaction.transaction_date,
            amount_usd: transaction.amount_usd,
            rate_applied: Decimal::ZERO,
            converted_amount: Decimal::ZERO,
            target_currency: target_currency.to_string(),
        }
    }
}
