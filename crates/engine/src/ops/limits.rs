use crate::{
    Broker, Currency, Engine, ExpensesAndLimit, NO_LIMIT, Period, RatesProvider, Repo,
    ResultEngine, currency,
};

impl<R, X, B> Engine<R, X, B>
where
    R: Repo,
    X: RatesProvider,
    B: Broker,
{
    /// Current-month expenses versus the configured limit, in the user's
    /// display currency.
    ///
    /// Runs synchronously after every successful insert and must see the
    /// purchase just written. RUB users take the repo-side sum; any other
    /// currency converts purchase by purchase through its own snapshot.
    pub async fn expenses_and_limit(&self, user_id: i64) -> ResultEngine<ExpensesAndLimit> {
        let user = self.repo.user_info(user_id).await?;
        let month = Period::this_month(self.today());

        let expenses = match user.currency {
            Currency::Rub => {
                self.repo
                    .sum_purchases_in_range(user_id, month.from, month.to)
                    .await?
            }
            other => {
                let purchases = self
                    .repo
                    .purchases_in_range(user_id, month.from, month.to)
                    .await?;
                purchases
                    .iter()
                    .map(|p| currency::from_rub(p.sum_rub, other, &p.rates))
                    .sum()
            }
        };

        let limit = user.monthly_limit;
        Ok(ExpensesAndLimit {
            expenses,
            limit,
            limit_exceeded: limit != NO_LIMIT && expenses > limit,
            currency: user.currency,
        })
    }
}
