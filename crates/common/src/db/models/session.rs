//! Session entity
//!
//! Backs the tower-sessions store. One row per browser session:
//! the session id, the JSON-encoded record data, and its expiry.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,

    /// Serialized session record (key/value map)
    pub data: Vec<u8>,

    /// Rows past this instant are ignored on load and swept periodically
    pub expiry_date: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
