//! The sea-orm implementation of [`engine::Repo`].
//!
//! Every query maps its database error into `EngineError::Storage` tagged
//! with the failing operation; domain outcomes like a duplicate category
//! come back as domain errors, not storage failures.

use chrono::NaiveDate;
use sea_orm::{
    ActiveValue, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr,
    sea_query::{Expr, OnConflict},
};

use engine::{
    AddPurchaseReq, CategoryRow, Currency, EngineError, NO_LIMIT, Purchase, RateToRub, Repo,
    ResultEngine, User,
};

use crate::Storage;
use crate::entities::{categories, exchange_rates, purchases, user_categories, users};

fn db_err(op: &'static str) -> impl FnOnce(sea_orm::DbErr) -> EngineError {
    move |err| EngineError::storage(op, err)
}

impl Repo for Storage {
    /// Race-safe lazy user creation: concurrent first messages both hit
    /// `ON CONFLICT DO NOTHING` and leave exactly one row.
    async fn create_user_if_absent(&self, user_id: i64) -> ResultEngine<()> {
        let row = users::ActiveModel {
            id: ActiveValue::Set(user_id),
            currency: ActiveValue::Set(Currency::Rub.code().to_string()),
            monthly_limit: ActiveValue::Set(NO_LIMIT),
        };
        users::Entity::insert(row)
            .on_conflict(
                OnConflict::column(users::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(db_err("users.insert"))?;
        Ok(())
    }

    async fn user_info(&self, user_id: i64) -> ResultEngine<User> {
        self.create_user_if_absent(user_id).await?;
        let model = users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(db_err("users.find"))?
            .ok_or_else(|| {
                EngineError::storage("users.find", format!("user {user_id} row missing"))
            })?;
        Ok(User {
            id: model.id,
            currency: Currency::try_from(model.currency.as_str())?,
            monthly_limit: model.monthly_limit,
        })
    }

    async fn set_user_currency(&self, user_id: i64, currency: Currency) -> ResultEngine<()> {
        users::Entity::update_many()
            .col_expr(users::Column::Currency, Expr::value(currency.code()))
            .filter(users::Column::Id.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(db_err("users.update_currency"))?;
        Ok(())
    }

    async fn set_user_limit(&self, user_id: i64, limit: f64) -> ResultEngine<()> {
        users::Entity::update_many()
            .col_expr(users::Column::MonthlyLimit, Expr::value(limit))
            .filter(users::Column::Id.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(db_err("users.update_limit"))?;
        Ok(())
    }

    async fn add_category_to_user(&self, user_id: i64, category_id: i64) -> ResultEngine<()> {
        let row = user_categories::ActiveModel {
            user_id: ActiveValue::Set(user_id),
            category_id: ActiveValue::Set(category_id),
        };
        user_categories::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([
                    user_categories::Column::UserId,
                    user_categories::Column::CategoryId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(db_err("user_categories.insert"))?;
        Ok(())
    }

    async fn user_has_category(&self, user_id: i64, category_id: i64) -> ResultEngine<bool> {
        let found = user_categories::Entity::find_by_id((user_id, category_id))
            .one(&self.db)
            .await
            .map_err(db_err("user_categories.find"))?;
        Ok(found.is_some())
    }

    async fn user_category_names(&self, user_id: i64) -> ResultEngine<Vec<String>> {
        let rows = user_categories::Entity::find()
            .filter(user_categories::Column::UserId.eq(user_id))
            .find_also_related(categories::Entity)
            .order_by_asc(categories::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err("user_categories.list"))?;
        Ok(rows
            .into_iter()
            .filter_map(|(_, category)| category.map(|c| c.name))
            .collect())
    }

    async fn insert_purchase(&self, req: AddPurchaseReq) -> ResultEngine<()> {
        let row = purchases::ActiveModel {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(req.user_id),
            category_id: ActiveValue::Set(req.category_id),
            sum_rub: ActiveValue::Set(req.sum_rub),
            date: ActiveValue::Set(req.date),
            rate_usd: ActiveValue::Set(req.rates.usd),
            rate_eur: ActiveValue::Set(req.rates.eur),
            rate_cny: ActiveValue::Set(req.rates.cny),
        };
        purchases::Entity::insert(row)
            .exec(&self.db)
            .await
            .map_err(db_err("purchases.insert"))?;
        Ok(())
    }

    async fn purchases_in_range(
        &self,
        user_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ResultEngine<Vec<Purchase>> {
        let rows = purchases::Entity::find()
            .filter(purchases::Column::UserId.eq(user_id))
            .filter(purchases::Column::Date.gte(from))
            .filter(purchases::Column::Date.lte(to))
            .order_by_asc(purchases::Column::Date)
            .order_by_asc(purchases::Column::Id)
            .find_also_related(categories::Entity)
            .all(&self.db)
            .await
            .map_err(db_err("purchases.list"))?;

        Ok(rows
            .into_iter()
            .map(|(purchase, category)| Purchase {
                category: category.map(|c| c.name).unwrap_or_default(),
                sum_rub: purchase.sum_rub,
                date: purchase.date,
                rates: RateToRub {
                    usd: purchase.rate_usd,
                    eur: purchase.rate_eur,
                    cny: purchase.rate_cny,
                },
            })
            .collect())
    }

    async fn sum_purchases_in_range(
        &self,
        user_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ResultEngine<f64> {
        let total: Option<Option<f64>> = purchases::Entity::find()
            .select_only()
            .column_as(purchases::Column::SumRub.sum(), "total")
            .filter(purchases::Column::UserId.eq(user_id))
            .filter(purchases::Column::Date.gte(from))
            .filter(purchases::Column::Date.lte(to))
            .into_tuple()
            .one(&self.db)
            .await
            .map_err(db_err("purchases.sum"))?;
        Ok(total.flatten().unwrap_or(0.0))
    }

    async fn category_id(&self, name_norm: &str) -> ResultEngine<Option<i64>> {
        let found = categories::Entity::find()
            .filter(categories::Column::NameNorm.eq(name_norm))
            .one(&self.db)
            .await
            .map_err(db_err("categories.find"))?;
        Ok(found.map(|c| c.id))
    }

    async fn create_category(&self, name: &str, name_norm: &str) -> ResultEngine<i64> {
        let row = categories::ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(name.to_string()),
            name_norm: ActiveValue::Set(name_norm.to_string()),
        };
        match categories::Entity::insert(row).exec(&self.db).await {
            Ok(result) => Ok(result.last_insert_id),
            // The unique index on name_norm decides duplicates, including
            // concurrent creations of the same name.
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(EngineError::CategoryAlreadyExists(name.to_string()))
            }
            Err(err) => Err(EngineError::storage("categories.insert", err)),
        }
    }

    async fn all_categories(&self) -> ResultEngine<Vec<CategoryRow>> {
        let rows = categories::Entity::find()
            .order_by_asc(categories::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err("categories.list"))?;
        Ok(rows
            .into_iter()
            .map(|c| CategoryRow {
                id: c.id,
                name: c.name,
            })
            .collect())
    }

    async fn rate_for_date(&self, date: NaiveDate) -> ResultEngine<Option<RateToRub>> {
        let found = exchange_rates::Entity::find_by_id(date)
            .one(&self.db)
            .await
            .map_err(db_err("exchange_rates.find"))?;
        Ok(found.map(|row| RateToRub {
            usd: row.usd,
            eur: row.eur,
            cny: row.cny,
        }))
    }

    async fn insert_rate(&self, date: NaiveDate, rates: RateToRub) -> ResultEngine<()> {
        let row = exchange_rates::ActiveModel {
            date: ActiveValue::Set(date),
            usd: ActiveValue::Set(rates.usd),
            eur: ActiveValue::Set(rates.eur),
            cny: ActiveValue::Set(rates.cny),
        };
        // Two commands may fetch the same missing date concurrently; first
        // writer wins.
        exchange_rates::Entity::insert(row)
            .on_conflict(
                OnConflict::column(exchange_rates::Column::Date)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(db_err("exchange_rates.insert"))?;
        Ok(())
    }
}
