//! In-memory collaborator doubles for the engine tests.
//!
//! Stores guard their tables with one coarse `Mutex` and hand out copies on
//! read; mutation always happens under the lock.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::NaiveDate;
use engine::chat::{MessageSender, StatusStore};
use engine::{
    AddPurchaseReq, Broker, CategoryRow, Currency, EngineError, NO_LIMIT, PendingStatus, Purchase,
    RateToRub, RatesProvider, Repo, ResultEngine, UNCATEGORIZED_ID, UNCATEGORIZED_NAME, User,
};

pub const RATES: RateToRub = RateToRub {
    usd: 60.0,
    eur: 62.5,
    cny: 8.0,
};

#[derive(Clone)]
struct CategoryTableRow {
    id: i64,
    name: String,
    name_norm: String,
}

#[derive(Default)]
struct Tables {
    users: HashMap<i64, User>,
    user_categories: HashMap<i64, Vec<i64>>,
    categories: Vec<CategoryTableRow>,
    purchases: Vec<AddPurchaseReq>,
    rates: HashMap<NaiveDate, RateToRub>,
}

pub struct MockRepo {
    tables: Mutex<Tables>,
}

impl MockRepo {
    pub fn new() -> Self {
        let mut tables = Tables::default();
        tables.categories.push(CategoryTableRow {
            id: UNCATEGORIZED_ID,
            name: UNCATEGORIZED_NAME.to_string(),
            name_norm: UNCATEGORIZED_NAME.to_lowercase(),
        });
        Self {
            tables: Mutex::new(tables),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Test seeding: a category the engine believes already exists.
    pub fn seed_category(&self, name: &str) -> i64 {
        let mut tables = self.lock();
        let id = tables.categories.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        tables.categories.push(CategoryTableRow {
            id,
            name: name.to_string(),
            name_norm: name.to_lowercase(),
        });
        id
    }

    /// Test seeding: attach a category to a user's set directly.
    pub fn seed_user_category(&self, user_id: i64, category_id: i64) {
        self.lock()
            .user_categories
            .entry(user_id)
            .or_default()
            .push(category_id);
    }

    /// Test seeding: a user row with explicit currency and limit.
    pub fn seed_user(&self, user_id: i64, currency: Currency, monthly_limit: f64) {
        self.lock().users.insert(
            user_id,
            User {
                id: user_id,
                currency,
                monthly_limit,
            },
        );
    }

    pub fn stored_purchases(&self) -> Vec<AddPurchaseReq> {
        self.lock().purchases.clone()
    }

    pub fn category_names(&self) -> Vec<String> {
        self.lock()
            .categories
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    fn category_name(tables: &Tables, id: i64) -> String {
        tables
            .categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.clone())
            .unwrap_or_default()
    }
}

impl Repo for &MockRepo {
    async fn create_user_if_absent(&self, user_id: i64) -> ResultEngine<()> {
        self.lock().users.entry(user_id).or_insert(User {
            id: user_id,
            currency: Currency::Rub,
            monthly_limit: NO_LIMIT,
        });
        Ok(())
    }

    async fn user_info(&self, user_id: i64) -> ResultEngine<User> {
        let mut tables = self.lock();
        Ok(tables
            .users
            .entry(user_id)
            .or_insert(User {
                id: user_id,
                currency: Currency::Rub,
                monthly_limit: NO_LIMIT,
            })
            .clone())
    }

    async fn set_user_currency(&self, user_id: i64, currency: Currency) -> ResultEngine<()> {
        let mut tables = self.lock();
        if let Some(user) = tables.users.get_mut(&user_id) {
            user.currency = currency;
        }
        Ok(())
    }

    async fn set_user_limit(&self, user_id: i64, limit: f64) -> ResultEngine<()> {
        let mut tables = self.lock();
        if let Some(user) = tables.users.get_mut(&user_id) {
            user.monthly_limit = limit;
        }
        Ok(())
    }

    async fn add_category_to_user(&self, user_id: i64, category_id: i64) -> ResultEngine<()> {
        self.lock()
            .user_categories
            .entry(user_id)
            .or_default()
            .push(category_id);
        Ok(())
    }

    async fn user_has_category(&self, user_id: i64, category_id: i64) -> ResultEngine<bool> {
        Ok(self
            .lock()
            .user_categories
            .get(&user_id)
            .is_some_and(|ids| ids.contains(&category_id)))
    }

    async fn user_category_names(&self, user_id: i64) -> ResultEngine<Vec<String>> {
        let tables = self.lock();
        let ids = tables.user_categories.get(&user_id).cloned().unwrap_or_default();
        Ok(ids
            .iter()
            .map(|id| MockRepo::category_name(&tables, *id))
            .collect())
    }

    async fn insert_purchase(&self, req: AddPurchaseReq) -> ResultEngine<()> {
        self.lock().purchases.push(req);
        Ok(())
    }

    async fn purchases_in_range(
        &self,
        user_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ResultEngine<Vec<Purchase>> {
        let tables = self.lock();
        let mut rows: Vec<(NaiveDate, Purchase)> = tables
            .purchases
            .iter()
            .filter(|p| p.user_id == user_id && p.date >= from && p.date <= to)
            .map(|p| {
                (
                    p.date,
                    Purchase {
                        category: MockRepo::category_name(&tables, p.category_id),
                        sum_rub: p.sum_rub,
                        date: p.date,
                        rates: p.rates,
                    },
                )
            })
            .collect();
        rows.sort_by_key(|(date, _)| *date);
        Ok(rows.into_iter().map(|(_, p)| p).collect())
    }

    async fn sum_purchases_in_range(
        &self,
        user_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ResultEngine<f64> {
        Ok(self
            .lock()
            .purchases
            .iter()
            .filter(|p| p.user_id == user_id && p.date >= from && p.date <= to)
            .map(|p| p.sum_rub)
            .sum())
    }

    async fn category_id(&self, name_norm: &str) -> ResultEngine<Option<i64>> {
        Ok(self
            .lock()
            .categories
            .iter()
            .find(|c| c.name_norm == name_norm)
            .map(|c| c.id))
    }

    async fn create_category(&self, name: &str, name_norm: &str) -> ResultEngine<i64> {
        let mut tables = self.lock();
        if tables.categories.iter().any(|c| c.name_norm == name_norm) {
            return Err(EngineError::CategoryAlreadyExists(name.to_string()));
        }
        let id = tables.categories.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        tables.categories.push(CategoryTableRow {
            id,
            name: name.to_string(),
            name_norm: name_norm.to_string(),
        });
        Ok(id)
    }

    async fn all_categories(&self) -> ResultEngine<Vec<CategoryRow>> {
        Ok(self
            .lock()
            .categories
            .iter()
            .map(|c| CategoryRow {
                id: c.id,
                name: c.name.clone(),
            })
            .collect())
    }

    async fn rate_for_date(&self, date: NaiveDate) -> ResultEngine<Option<RateToRub>> {
        Ok(self.lock().rates.get(&date).copied())
    }

    async fn insert_rate(&self, date: NaiveDate, rates: RateToRub) -> ResultEngine<()> {
        self.lock().rates.insert(date, rates);
        Ok(())
    }
}

/// Rate source with a fixed "today" snapshot and optional historical
/// answers; `for_date` fails when no historical rate is configured.
pub struct FixedRates {
    pub current: RateToRub,
    pub historical: Option<RateToRub>,
}

impl FixedRates {
    pub fn new() -> Self {
        Self {
            current: RATES,
            historical: None,
        }
    }

    pub fn with_historical(historical: RateToRub) -> Self {
        Self {
            current: RATES,
            historical: Some(historical),
        }
    }
}

impl RatesProvider for &FixedRates {
    fn current(&self) -> RateToRub {
        self.current
    }

    async fn for_date(&self, _date: NaiveDate) -> ResultEngine<RateToRub> {
        self.historical
            .ok_or_else(|| EngineError::transport("rates.for_date", "source offline".to_string()))
    }
}

#[derive(Default)]
pub struct RecordingBroker {
    published: Mutex<Vec<(String, String)>>,
}

impl RecordingBroker {
    pub fn published(&self) -> Vec<(String, String)> {
        self.published.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Broker for &RecordingBroker {
    async fn publish(&self, key: &str, payload: &str) -> ResultEngine<()> {
        self.published
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((key.to_string(), payload.to_string()));
        Ok(())
    }
}

/// What the chat sent, for assertions.
#[derive(Clone, Debug, PartialEq)]
pub enum Sent {
    Text(i64, String),
    Keyboard(i64, String, Vec<String>),
}

#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingSender {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn last_text(&self) -> Option<String> {
        self.sent()
            .into_iter()
            .rev()
            .find_map(|s| match s {
                Sent::Text(_, text) => Some(text),
                Sent::Keyboard(..) => None,
            })
    }
}

impl MessageSender for &RecordingSender {
    async fn send_text(&self, user_id: i64, text: &str) -> ResultEngine<()> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Sent::Text(user_id, text.to_string()));
        Ok(())
    }

    async fn send_keyboard(
        &self,
        user_id: i64,
        text: &str,
        options: &[String],
    ) -> ResultEngine<()> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Sent::Keyboard(user_id, text.to_string(), options.to_vec()));
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStatuses {
    inner: Mutex<HashMap<i64, PendingStatus>>,
}

impl MemoryStatuses {
    pub fn current(&self, user_id: i64) -> PendingStatus {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl StatusStore for &MemoryStatuses {
    async fn get(&self, user_id: i64) -> ResultEngine<PendingStatus> {
        Ok(self.current(user_id))
    }

    async fn set(&self, user_id: i64, status: PendingStatus) -> ResultEngine<()> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(user_id, status);
        Ok(())
    }

    async fn clear(&self, user_id: i64) -> ResultEngine<()> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&user_id);
        Ok(())
    }
}
