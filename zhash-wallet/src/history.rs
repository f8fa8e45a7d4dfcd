//! Transaction history
//!
//! The log is static sample data, stamped relative to when it is built.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::TokenSymbol;

/// Transaction kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Shield,
    Transfer,
    Deshield,
}

impl TransactionKind {
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Shield => "Shielded Assets",
            TransactionKind::Transfer => "Private Transfer",
            TransactionKind::Deshield => "Deshield Assets",
        }
    }
}

/// Transaction status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

/// Transaction record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub kind: TransactionKind,
    pub token: TokenSymbol,
    pub amount: String,
    /// Royalty charged, transfers only
    pub fee: Option<String>,
    pub status: TransactionStatus,
    /// Epoch milliseconds
    pub timestamp: i64,
    pub hash: String,
    pub is_private: bool,
}

impl Transaction {
    /// Royalty line as shown under the amount
    pub fn fee_display(&self) -> &str {
        self.fee.as_deref().unwrap_or("0.00")
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

/// Sample log as of `now`
pub fn sample_transactions(now: DateTime<Utc>) -> Vec<Transaction> {
    let at = |hours: i64| (now - Duration::hours(hours)).timestamp_millis();

    vec![
        Transaction {
            id: "1".to_string(),
            kind: TransactionKind::Transfer,
            token: TokenSymbol::Usdt,
            amount: "250.00".to_string(),
            fee: Some("0.025000".to_string()),
            status: TransactionStatus::Completed,
            timestamp: at(2),
            hash: "0x32a...98f1".to_string(),
            is_private: true,
        },
        Transaction {
            id: "2".to_string(),
            kind: TransactionKind::Shield,
            token: TokenSymbol::Eth,
            amount: "0.50".to_string(),
            fee: None,
            status: TransactionStatus::Completed,
            timestamp: at(24),
            hash: "0x1c4...e32d".to_string(),
            is_private: true,
        },
        Transaction {
            id: "3".to_string(),
            kind: TransactionKind::Transfer,
            token: TokenSymbol::Usdc,
            amount: "1,200.00".to_string(),
            fee: Some("0.120000".to_string()),
            status: TransactionStatus::Completed,
            timestamp: at(48),
            hash: "0x7e2...b5a1".to_string(),
            is_private: true,
        },
        Transaction {
            id: "4".to_string(),
            kind: TransactionKind::Deshield,
            token: TokenSymbol::Eth,
            amount: "0.10".to_string(),
            fee: None,
            status: TransactionStatus::Failed,
            timestamp: at(72),
            hash: "0x992...c012".to_string(),
            is_private: false,
        },
    ]
}

/// Read-only transaction log
#[derive(Debug, Clone)]
pub struct History {
    transactions: Vec<Transaction>,
}

impl History {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    /// The sample log stamped at the current time
    pub fn sample() -> Self {
        Self::new(sample_transactions(Utc::now()))
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Transactions for `token`, or all of them
    pub fn filter(&self, token: Option<TokenSymbol>) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|tx| token.map_or(true, |t| tx.token == t))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_is_newest_first() {
        let now = Utc::now();
        let txs = sample_transactions(now);

        assert_eq!(txs.len(), 4);
        assert!(txs.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
        assert_eq!(txs[0].timestamp, now.timestamp_millis() - 2 * 3_600_000);
    }

    #[test]
    fn test_filter_by_token() {
        let history = History::sample();
        assert_eq!(history.filter(None).len(), 4);

        let eth = history.filter(Some(TokenSymbol::Eth));
        assert_eq!(eth.len(), 2);
        assert!(eth.iter().all(|tx| tx.token == TokenSymbol::Eth));

        assert_eq!(history.filter(Some(TokenSymbol::Usdc))[0].fee_display(), "0.120000");
    }

    #[test]
    fn test_labels_and_fees() {
        let history = History::sample();
        let labels: Vec<_> = history.transactions().iter().map(|tx| tx.kind.label()).collect();
        assert_eq!(
            labels,
            vec!["Private Transfer", "Shielded Assets", "Private Transfer", "Deshield Assets"]
        );
        assert_eq!(history.transactions()[1].fee_display(), "0.00");
        assert!(history.transactions()[3].time().is_some());
    }

    #[test]
    fn test_kind_serializes_uppercase() {
        let json = serde_json::to_string(&TransactionKind::Deshield).unwrap();
        assert_eq!(json, "\"DESHIELD\"");
    }
}
