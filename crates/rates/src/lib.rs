//! Exchange rates from the Central Bank's daily JSON feed.
//!
//! The feed publishes how many rubles one nominal of each foreign currency
//! costs. `CbrClient` keeps the latest snapshot in memory so reads never
//! block a command on the network; a periodic task calls [`CbrClient::refresh`]
//! and historical dates go through the archive endpoint on demand.

use std::sync::{Arc, RwLock};

use chrono::NaiveDate;
use reqwest::Url;
use serde::Deserialize;

use engine::{EngineError, RateToRub, RatesProvider, ResultEngine};

pub const CBR_BASE_URL: &str = "https://www.cbr-xml-daily.ru/";

/// Wire shape of `daily_json.js`. `Value` is rubles per `Nominal` units,
/// so the per-unit rate is their quotient.
#[derive(Debug, Deserialize)]
struct DailyPayload {
    #[serde(rename = "Valute")]
    valute: Valute,
}

#[derive(Debug, Deserialize)]
struct Valute {
    #[serde(rename = "USD")]
    usd: Quote,
    #[serde(rename = "EUR")]
    eur: Quote,
    #[serde(rename = "CNY")]
    cny: Quote,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(rename = "Nominal")]
    nominal: f64,
    #[serde(rename = "Value")]
    value: f64,
}

impl Quote {
    fn per_unit(&self) -> f64 {
        self.value / self.nominal
    }
}

impl From<&DailyPayload> for RateToRub {
    fn from(payload: &DailyPayload) -> Self {
        Self {
            usd: payload.valute.usd.per_unit(),
            eur: payload.valute.eur.per_unit(),
            cny: payload.valute.cny.per_unit(),
        }
    }
}

/// Rate source over the bank's daily feed. Cloning shares the cache, so
/// the refresh task and the engine see the same snapshot.
#[derive(Clone, Debug)]
pub struct CbrClient {
    base_url: Url,
    http: reqwest::Client,
    cached: Arc<RwLock<RateToRub>>,
}

impl CbrClient {
    /// Builds the client and performs the initial fetch, so [`RatesProvider::current`]
    /// always has a snapshot to return.
    pub async fn connect(base_url: &str) -> ResultEngine<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| EngineError::transport("rates.base_url", err))?;
        let client = Self {
            base_url,
            http: reqwest::Client::new(),
            cached: Arc::new(RwLock::new(RateToRub {
                usd: 0.0,
                eur: 0.0,
                cny: 0.0,
            })),
        };
        client.refresh().await?;
        Ok(client)
    }

    /// Re-fetches today's snapshot and swaps it into the cache.
    pub async fn refresh(&self) -> ResultEngine<RateToRub> {
        let endpoint = self
            .base_url
            .join("daily_json.js")
            .map_err(|err| EngineError::transport("rates.daily", err))?;
        let rates = self.fetch(endpoint).await?;
        tracing::debug!(?rates, "refreshed daily rates");
        *self
            .cached
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = rates;
        Ok(rates)
    }

    async fn fetch(&self, endpoint: Url) -> ResultEngine<RateToRub> {
        let res = self
            .http
            .get(endpoint)
            .send()
            .await
            .map_err(|err| EngineError::transport("rates.fetch", err))?
            .error_for_status()
            .map_err(|err| EngineError::transport("rates.fetch", err))?;
        let payload = res
            .json::<DailyPayload>()
            .await
            .map_err(|err| EngineError::transport("rates.decode", err))?;
        Ok(RateToRub::from(&payload))
    }
}

impl RatesProvider for CbrClient {
    fn current(&self) -> RateToRub {
        *self
            .cached
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Archive lookup. The feed has no entry for weekends and holidays;
    /// those come back as a transport error and the caller falls back.
    async fn for_date(&self, date: NaiveDate) -> ResultEngine<RateToRub> {
        let path = format!("archive/{}/daily_json.js", date.format("%Y/%m/%d"));
        let endpoint = self
            .base_url
            .join(&path)
            .map_err(|err| EngineError::transport("rates.archive", err))?;
        self.fetch(endpoint).await
    }
}
