//! Initial schema - creates all tables from scratch.
//!
//! - `users`: one row per messenger user, created lazily
//! - `categories`: global purchase categories, unique by normalized name
//! - `user_categories`: which categories each user has used
//! - `purchases`: RUB-baseline amounts plus the rate snapshot of the date
//! - `exchange_rates`: one RUB-per-unit snapshot per calendar date
//!
//! Also seeds the sentinel "Uncategorized" category with id 1.

use sea_orm::{ConnectionTrait, Statement};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Currency,
    MonthlyLimit,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Name,
    NameNorm,
}

#[derive(Iden)]
enum UserCategories {
    Table,
    UserId,
    CategoryId,
}

#[derive(Iden)]
enum Purchases {
    Table,
    Id,
    UserId,
    CategoryId,
    SumRub,
    Date,
    RateUsd,
    RateEur,
    RateCny,
}

#[derive(Iden)]
enum ExchangeRates {
    Table,
    Date,
    Usd,
    Eur,
    Cny,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Currency)
                            .string()
                            .not_null()
                            .default("RUB"),
                    )
                    .col(
                        ColumnDef::new(Users::MonthlyLimit)
                            .double()
                            .not_null()
                            .default(-1.0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::NameNorm).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-name_norm-unique")
                    .table(Categories::Table)
                    .col(Categories::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserCategories::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserCategories::CategoryId)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(UserCategories::UserId)
                            .col(UserCategories::CategoryId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user_categories-user_id")
                            .from(UserCategories::Table, UserCategories::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user_categories-category_id")
                            .from(UserCategories::Table, UserCategories::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Purchases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Purchases::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Purchases::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Purchases::CategoryId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Purchases::SumRub).double().not_null())
                    .col(ColumnDef::new(Purchases::Date).date().not_null())
                    .col(ColumnDef::new(Purchases::RateUsd).double().not_null())
                    .col(ColumnDef::new(Purchases::RateEur).double().not_null())
                    .col(ColumnDef::new(Purchases::RateCny).double().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-purchases-user_id")
                            .from(Purchases::Table, Purchases::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-purchases-category_id")
                            .from(Purchases::Table, Purchases::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-purchases-user_id-date")
                    .table(Purchases::Table)
                    .col(Purchases::UserId)
                    .col(Purchases::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExchangeRates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExchangeRates::Date)
                            .date()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExchangeRates::Usd).double().not_null())
                    .col(ColumnDef::new(ExchangeRates::Eur).double().not_null())
                    .col(ColumnDef::new(ExchangeRates::Cny).double().not_null())
                    .to_owned(),
            )
            .await?;

        seed_uncategorized(manager).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExchangeRates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Purchases::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

/// Purchases without a category point at this fixed row; the id must stay
/// stable across installations.
async fn seed_uncategorized(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    let db = manager.get_connection();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO categories (id, name, name_norm) VALUES (?, ?, ?);",
        vec![1i64.into(), "Uncategorized".into(), "uncategorized".into()],
    ))
    .await?;
    Ok(())
}
