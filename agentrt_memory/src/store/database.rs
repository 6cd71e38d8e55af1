use agentrt_core::{MemoryStore, Role, SessionContext};
use agentrt_entities::conversation_events;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Schema, Set,
};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use super::turn_payload;

fn is_table_already_exists_error(err: &DbErr) -> bool {
    err.to_string().contains("table") && err.to_string().contains("already exists")
}

/// Durable conversation log backed by any sea-orm database.
pub struct DatabaseMemoryStore {
    db: DatabaseConnection,
}

impl DatabaseMemoryStore {
    /// Connect and make sure the `conversation_events` table exists.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        info!("Connecting to database for DatabaseMemoryStore");
        let db = Database::connect(database_url).await?;

        let backend = db.get_database_backend();
        let schema = Schema::new(backend);
        let stmt = schema.create_table_from_entity(conversation_events::Entity);
        match db
            .execute_unprepared(&backend.build(&stmt).to_string())
            .await
        {
            Ok(_) => {}
            Err(e) if is_table_already_exists_error(&e) => {
                info!("Table already exists, skipping creation");
            }
            Err(e) => return Err(e.into()),
        }

        info!("DatabaseMemoryStore initialized");
        Ok(Self { db })
    }
}

#[async_trait]
impl MemoryStore for DatabaseMemoryStore {
    async fn get_last_k_turns(
        &self,
        ctx: &SessionContext,
        k: usize,
    ) -> anyhow::Result<Vec<Value>> {
        let rows = conversation_events::Entity::find()
            .filter(conversation_events::Column::MemoryId.eq(ctx.memory_id.as_str()))
            .filter(conversation_events::Column::ActorId.eq(ctx.actor_id.as_str()))
            .filter(conversation_events::Column::SessionId.eq(ctx.session_id.as_str()))
            .order_by_desc(conversation_events::Column::CreatedAt)
            .order_by_desc(conversation_events::Column::Id)
            .limit(u64::try_from(k)?)
            .all(&self.db)
            .await?;

        // Newest rows were fetched first; hand them back oldest first.
        let turns = rows
            .into_iter()
            .rev()
            .map(|row| match serde_json::from_str::<Value>(&row.payload) {
                Ok(turn) => turn,
                Err(e) => {
                    warn!("Stored turn {} is not valid JSON: {e}", row.id);
                    Value::String(row.payload)
                }
            })
            .collect();

        Ok(turns)
    }

    async fn save_conversation(
        &self,
        ctx: &SessionContext,
        messages: &[(String, Role)],
    ) -> anyhow::Result<()> {
        let now = chrono::Utc::now().naive_utc();
        let payload = serde_json::to_string(&turn_payload(messages))?;

        conversation_events::ActiveModel {
            id: Set(Uuid::now_v7()),
            memory_id: Set(ctx.memory_id.clone()),
            actor_id: Set(ctx.actor_id.clone()),
            session_id: Set(ctx.session_id.clone()),
            payload: Set(payload),
            created_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!("Added turn to conversation log: {ctx}");
        Ok(())
    }
}
