//! One entity per table. The engine never sees these models, only the
//! domain types they map to.

pub mod categories;
pub mod exchange_rates;
pub mod purchases;
pub mod user_categories;
pub mod users;
