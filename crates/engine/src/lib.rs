//! Domain core of the spending tracker.
//!
//! The engine owns the purchase/category model: argument validation,
//! currency conversion through date-indexed RUB snapshots, the monthly
//! limit check, period reports, and the chat layer with its
//! category-choice state machine. Everything durable or remote reaches the
//! engine through the collaborator traits below; concrete implementations
//! are injected at construction.

use std::future::Future;

use chrono::NaiveDate;
use chrono_tz::Tz;

pub use currency::{Currency, RateToRub, from_rub, to_rub};
pub use error::EngineError;
pub use period::Period;
pub use types::{
    AddPurchaseReq, CategoryRow, ExpensesAndLimit, NO_LIMIT, PendingStatus, Purchase, Report,
    ReportRow, UNCATEGORIZED_ID, UNCATEGORIZED_NAME, User,
};

pub mod chat;
mod currency;
mod error;
mod ops;
pub mod parse;
mod period;
mod types;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;

/// Durable storage the engine queries and mutates.
///
/// Implementations own locking/transaction discipline; in particular user
/// rows are created lazily and [`Repo::create_user_if_absent`] must be
/// race-safe under concurrent first messages (at most one row per user).
/// "Not found" outcomes are modeled as `Ok(None)`/domain errors, never as
/// storage failures.
pub trait Repo: Send + Sync {
    fn create_user_if_absent(&self, user_id: i64)
    -> impl Future<Output = ResultEngine<()>> + Send;
    fn user_info(&self, user_id: i64) -> impl Future<Output = ResultEngine<User>> + Send;
    fn set_user_currency(
        &self,
        user_id: i64,
        currency: Currency,
    ) -> impl Future<Output = ResultEngine<()>> + Send;
    fn set_user_limit(
        &self,
        user_id: i64,
        limit: f64,
    ) -> impl Future<Output = ResultEngine<()>> + Send;
    fn add_category_to_user(
        &self,
        user_id: i64,
        category_id: i64,
    ) -> impl Future<Output = ResultEngine<()>> + Send;
    fn user_has_category(
        &self,
        user_id: i64,
        category_id: i64,
    ) -> impl Future<Output = ResultEngine<bool>> + Send;
    fn user_category_names(
        &self,
        user_id: i64,
    ) -> impl Future<Output = ResultEngine<Vec<String>>> + Send;

    fn insert_purchase(
        &self,
        req: AddPurchaseReq,
    ) -> impl Future<Output = ResultEngine<()>> + Send;
    /// Purchases with `date` in `[from, to]`, ordered by ascending date
    /// then insertion order, each carrying its at-purchase rate snapshot.
    fn purchases_in_range(
        &self,
        user_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl Future<Output = ResultEngine<Vec<Purchase>>> + Send;
    fn sum_purchases_in_range(
        &self,
        user_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl Future<Output = ResultEngine<f64>> + Send;

    /// Looks a category up by its normalized key.
    fn category_id(
        &self,
        name_norm: &str,
    ) -> impl Future<Output = ResultEngine<Option<i64>>> + Send;
    /// Creates a category; duplicates (by normalized key) fail with
    /// [`EngineError::CategoryAlreadyExists`].
    fn create_category(
        &self,
        name: &str,
        name_norm: &str,
    ) -> impl Future<Output = ResultEngine<i64>> + Send;
    fn all_categories(&self) -> impl Future<Output = ResultEngine<Vec<CategoryRow>>> + Send;

    fn rate_for_date(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = ResultEngine<Option<RateToRub>>> + Send;
    fn insert_rate(
        &self,
        date: NaiveDate,
        rates: RateToRub,
    ) -> impl Future<Output = ResultEngine<()>> + Send;
}

/// Exchange-rate source. `current` is the cached "today" rate refreshed by
/// a periodic task outside the engine's control flow; `for_date` looks up
/// an authoritative historical value.
pub trait RatesProvider: Send + Sync {
    fn current(&self) -> RateToRub;
    fn for_date(&self, date: NaiveDate) -> impl Future<Output = ResultEngine<RateToRub>> + Send;
}

/// Best-effort side channel for finished report series. Publish failures
/// are logged and never fail the command that produced the report.
pub trait Broker: Send + Sync {
    fn publish(&self, key: &str, payload: &str)
    -> impl Future<Output = ResultEngine<()>> + Send;
}

/// The purchases model: all domain operations live here as `impl` blocks
/// under `ops/`.
#[derive(Debug)]
pub struct Engine<R, X, B> {
    repo: R,
    rates: X,
    broker: B,
    timezone: Tz,
}

impl<R, X, B> Engine<R, X, B>
where
    R: Repo,
    X: RatesProvider,
    B: Broker,
{
    /// Builds the engine from its collaborators. `timezone` decides what
    /// "today" means for defaults and the monthly window.
    pub fn new(repo: R, rates: X, broker: B, timezone: Tz) -> Self {
        Self {
            repo,
            rates,
            broker,
            timezone,
        }
    }

    /// Today's calendar date in the configured timezone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        chrono::Utc::now().with_timezone(&self.timezone).date_naive()
    }
}
