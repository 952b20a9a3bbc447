use crate::{
    Broker, Currency, Engine, RatesProvider, Repo, ResultEngine, parse,
    util::{normalize_category_display, normalize_category_key},
};

impl<R, X, B> Engine<R, X, B>
where
    R: Repo,
    X: RatesProvider,
    B: Broker,
{
    /// Switches the user's display currency.
    pub async fn set_currency(&self, user_id: i64, currency: Currency) -> ResultEngine<()> {
        self.repo.create_user_if_absent(user_id).await?;
        self.repo.set_user_currency(user_id, currency).await
    }

    /// Parses and stores a new monthly limit, interpreted in the user's
    /// currency. A non-numeric value fails with `LimitParsing`.
    pub async fn set_limit(&self, user_id: i64, raw_limit: &str) -> ResultEngine<()> {
        let limit = parse::parse_limit(raw_limit)?;
        self.repo.create_user_if_absent(user_id).await?;
        self.repo.set_user_limit(user_id, limit).await
    }

    /// Attaches an existing global category to the user's set.
    /// Idempotent: attaching a category the user already has is a no-op.
    pub async fn attach_category(&self, user_id: i64, name: &str) -> ResultEngine<()> {
        let display = normalize_category_display(name)?;
        let key = normalize_category_key(&display);

        self.repo.create_user_if_absent(user_id).await?;
        let category_id = self
            .repo
            .category_id(&key)
            .await?
            .ok_or_else(|| crate::EngineError::CategoryNotExist(display.clone()))?;

        if self.repo.user_has_category(user_id, category_id).await? {
            return Ok(());
        }
        self.repo.add_category_to_user(user_id, category_id).await
    }

    /// Names of the categories the user has used, for listings.
    pub async fn user_categories(&self, user_id: i64) -> ResultEngine<Vec<String>> {
        self.repo.create_user_if_absent(user_id).await?;
        self.repo.user_category_names(user_id).await
    }
}
