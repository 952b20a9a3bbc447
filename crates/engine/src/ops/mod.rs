//! Domain operations, one module per concern.

mod categories;
mod limits;
mod purchases;
mod reports;
mod users;

use chrono::NaiveDate;

use crate::{Broker, Engine, RateToRub, RatesProvider, Repo, ResultEngine};

impl<R, X, B> Engine<R, X, B>
where
    R: Repo,
    X: RatesProvider,
    B: Broker,
{
    /// Rate snapshot for a purchase date.
    ///
    /// Today uses the cached current rate. A historical date first consults
    /// the repo; on a miss the provider is asked and the answer persisted
    /// so the next purchase on that date reuses it. If the provider cannot
    /// answer, today's rate is the authoritative fallback.
    pub(crate) async fn rate_snapshot_for(&self, date: NaiveDate) -> ResultEngine<RateToRub> {
        if date == self.today() {
            return Ok(self.rates.current());
        }

        if let Some(rates) = self.repo.rate_for_date(date).await? {
            return Ok(rates);
        }

        match self.rates.for_date(date).await {
            Ok(rates) => {
                self.repo.insert_rate(date, rates).await?;
                Ok(rates)
            }
            Err(err) => {
                tracing::warn!("rate lookup for {date} failed, falling back to today: {err}");
                Ok(self.rates.current())
            }
        }
    }
}
