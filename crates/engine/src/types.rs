//! Domain records exchanged with the collaborators.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::currency::{Currency, RateToRub};

/// Limit value meaning "no limit configured".
pub const NO_LIMIT: f64 = -1.0;

/// Id of the sentinel category purchases fall into when no category is
/// given. Seeded by the initial migration and always present.
pub const UNCATEGORIZED_ID: i64 = 1;

/// Display name of the sentinel category.
pub const UNCATEGORIZED_NAME: &str = "Uncategorized";

/// A user as the repo stores it. Created lazily on first interaction.
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub id: i64,
    pub currency: Currency,
    /// Monthly limit in the user's currency; [`NO_LIMIT`] when unset.
    pub monthly_limit: f64,
}

/// One global category row.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
}

/// A committed purchase as read back from the repo.
///
/// `sum_rub` is the RUB-baseline amount; `rates` is the snapshot captured
/// at insert time, immutable for the lifetime of the purchase.
#[derive(Clone, Debug, PartialEq)]
pub struct Purchase {
    pub category: String,
    pub sum_rub: f64,
    pub date: NaiveDate,
    pub rates: RateToRub,
}

/// A validated purchase ready to be inserted.
#[derive(Clone, Debug, PartialEq)]
pub struct AddPurchaseReq {
    pub user_id: i64,
    pub sum_rub: f64,
    pub category_id: i64,
    pub date: NaiveDate,
    pub rates: RateToRub,
}

/// Outcome of the limit check run after every successful insert,
/// expressed in the user's display currency.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExpensesAndLimit {
    pub expenses: f64,
    pub limit: f64,
    pub limit_exceeded: bool,
    pub currency: Currency,
}

impl ExpensesAndLimit {
    /// Whether a limit is configured at all.
    #[must_use]
    pub fn has_limit(&self) -> bool {
        self.limit != NO_LIMIT
    }
}

/// One line of the report series: a category and its subtotal in the
/// user's display currency.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReportRow {
    pub category: String,
    pub total: f64,
}

/// A finished period report: the textual summary plus the numeric series
/// (rows sorted by category name, then the grand total). Rendering a chart
/// from the series is the caller's business.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub text: String,
    pub rows: Vec<ReportRow>,
    pub total: f64,
    pub currency: Currency,
}

/// Ephemeral per-user marker recording that a command is paused awaiting a
/// follow-up input. At most one per user; a new status overwrites, never
/// merges with, an existing one.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PendingStatus {
    #[default]
    Idle,
    /// A purchase named a category the user doesn't have yet; the verbatim
    /// command text is kept so it can be replayed after the choice.
    AwaitingCategoryChoice { command: String },
}
