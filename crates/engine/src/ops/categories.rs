use crate::{
    Broker, CategoryRow, Engine, RatesProvider, Repo, ResultEngine,
    util::{normalize_category_display, normalize_category_key},
};

impl<R, X, B> Engine<R, X, B>
where
    R: Repo,
    X: RatesProvider,
    B: Broker,
{
    /// Creates a global category. Uniqueness is enforced on the normalized
    /// key, so a duplicate differing only in case or accents fails with
    /// `CategoryAlreadyExists`.
    pub async fn create_category(&self, name: &str) -> ResultEngine<i64> {
        let display = normalize_category_display(name)?;
        let key = normalize_category_key(&display);
        self.repo.create_category(&display, &key).await
    }

    /// All global categories, for the choice keyboard.
    pub async fn all_categories(&self) -> ResultEngine<Vec<CategoryRow>> {
        self.repo.all_categories().await
    }
}
