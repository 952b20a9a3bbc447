use chrono::NaiveDate;

use crate::{
    AddPurchaseReq, Broker, Engine, EngineError, ExpensesAndLimit, RatesProvider, Repo,
    ResultEngine, UNCATEGORIZED_ID, currency, parse,
    util::{normalize_category_display, normalize_category_key},
};

impl<R, X, B> Engine<R, X, B>
where
    R: Repo,
    X: RatesProvider,
    B: Broker,
{
    /// Validates and commits a purchase, then runs the limit check so the
    /// reply reflects the purchase just inserted.
    ///
    /// `raw_sum` is the amount in the user's display currency. `category`
    /// may be empty (the sentinel category is used) and `raw_date` may be
    /// empty (today). A category the user doesn't have fails with
    /// `CategoryNotExist`/`UserHasntCategory` and inserts nothing; the
    /// chat layer turns that into the choice workflow.
    pub async fn add_purchase(
        &self,
        user_id: i64,
        raw_sum: &str,
        category: &str,
        raw_date: &str,
    ) -> ResultEngine<ExpensesAndLimit> {
        self.repo.create_user_if_absent(user_id).await?;

        let sum = parse::parse_sum(raw_sum)?;
        let date = self.purchase_date(raw_date)?;
        let category_id = self.resolve_purchase_category(user_id, category).await?;

        let rates = self.rate_snapshot_for(date).await?;
        let user = self.repo.user_info(user_id).await?;
        let sum_rub = currency::to_rub(sum, user.currency, &rates);

        self.repo
            .insert_purchase(AddPurchaseReq {
                user_id,
                sum_rub,
                category_id,
                date,
                rates,
            })
            .await?;

        self.expenses_and_limit(user_id).await
    }

    fn purchase_date(&self, raw_date: &str) -> ResultEngine<NaiveDate> {
        if raw_date.trim().is_empty() {
            return Ok(self.today());
        }
        let date = parse::parse_date(raw_date)?;
        if date > self.today() {
            return Err(EngineError::InvalidDate(format!(
                "{} is in the future",
                date.format(parse::DATE_FORMAT)
            )));
        }
        Ok(date)
    }

    /// Maps the category argument to an id the purchase may reference:
    /// empty means the sentinel, anything else must exist globally and be
    /// in the user's set.
    async fn resolve_purchase_category(&self, user_id: i64, category: &str) -> ResultEngine<i64> {
        if category.trim().is_empty() {
            return Ok(UNCATEGORIZED_ID);
        }

        let display = normalize_category_display(category)?;
        let key = normalize_category_key(&display);
        let category_id = self
            .repo
            .category_id(&key)
            .await?
            .ok_or_else(|| EngineError::CategoryNotExist(display.clone()))?;

        if !self.repo.user_has_category(user_id, category_id).await? {
            return Err(EngineError::UserHasntCategory(display));
        }
        Ok(category_id)
    }
}
