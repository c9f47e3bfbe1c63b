//! In-process mirror of persisted fields
//!
//! Every successful database write lands here too, so reads keep working
//! when the database is unreachable. Also holds the "currently selected
//! field" slot, which is session state and never written to the database.

use std::collections::HashMap;

use shared::Field;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct LocalCache {
    fields: RwLock<HashMap<Uuid, Field>>,
    selected: RwLock<Option<Uuid>>,
}

impl LocalCache {
    pub async fn put(&self, field: Field) {
        self.fields.write().await.insert(field.id, field);
    }

    pub async fn get(&self, id: Uuid) -> Option<Field> {
        self.fields.read().await.get(&id).cloned()
    }

    /// Remove a field; returns whether it was present
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.fields.write().await.remove(&id).is_some();
        let mut selected = self.selected.write().await;
        if *selected == Some(id) {
            *selected = None;
        }
        removed
    }

    /// All cached fields, oldest first
    pub async fn all(&self) -> Vec<Field> {
        let mut fields: Vec<Field> = self.fields.read().await.values().cloned().collect();
        fields.sort_by_key(|f| f.created_at);
        fields
    }

    pub async fn selected(&self) -> Option<Uuid> {
        *self.selected.read().await
    }

    pub async fn set_selected(&self, id: Option<Uuid>) {
        *self.selected.write().await = id;
    }
}
