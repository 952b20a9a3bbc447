//! Users table. Rows are created lazily on the user's first command; the
//! primary key is the messenger-side user id.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub currency: String,
    /// Monthly limit in the user's currency; negative means unset.
    #[sea_orm(column_type = "Double")]
    pub monthly_limit: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::purchases::Entity")]
    Purchases,
    #[sea_orm(has_many = "super::user_categories::Entity")]
    UserCategories,
}

impl Related<super::purchases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchases.def()
    }
}

impl Related<super::user_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserCategories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
