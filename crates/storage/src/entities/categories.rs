//! Global categories. `name_norm` carries the unicode-normalized
//! lowercase key and is unique; `name` keeps the display spelling.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(unique)]
    pub name_norm: String,
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
