//! One exchange-rate snapshot per calendar date, RUB per foreign unit.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "exchange_rates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub date: Date,
    #[sea_orm(column_type = "Double")]
    pub usd: f64,
    #[sea_orm(column_type = "Double")]
    pub eur: f64,
    #[sea_orm(column_type = "Double")]
    pub cny: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
