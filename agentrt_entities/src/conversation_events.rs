//! One row per saved conversation turn.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "conversation_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub memory_id: String,
    pub actor_id: String,
    pub session_id: String,
    /// Turn body as JSON text: `{"messages": [{"role": .., "content": {"text": ..}}]}`
    #[sea_orm(column_type = "Text")]
    pub payload: String,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
