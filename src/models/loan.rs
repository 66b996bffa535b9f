use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A loan of one item to one patron.
///
/// Stored as a JSON document; the wire and storage formats are identical.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Holder of the item; cleared by anonymization once the loan is closed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_user_id: Option<String>,
    pub item_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LoanStatus>,
    /// Required; an absent value fails date validation
    #[serde(default)]
    pub loan_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_return_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renewal_count: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LoanStatus {
    pub name: LoanStatusName,
}

impl LoanStatus {
    pub fn open() -> Self {
        Self {
            name: LoanStatusName::Open,
        }
    }

    pub fn closed() -> Self {
        Self {
            name: LoanStatusName::Closed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum LoanStatusName {
    Open,
    Closed,
}

impl LoanStatusName {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatusName::Open => "Open",
            LoanStatusName::Closed => "Closed",
        }
    }
}

impl Loan {
    pub fn is_open(&self) -> bool {
        matches!(
            self.status,
            Some(LoanStatus {
                name: LoanStatusName::Open
            })
        )
    }
}

/// Page of loans, used by both the loan and the loan history listings
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Loans {
    pub loans: Vec<Loan>,
    pub total_records: u64,
}
