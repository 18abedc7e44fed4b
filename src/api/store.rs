use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::core::ScenarioKind;

#[derive(Debug, Clone, Serialize)]
pub struct StoredScenario {
    pub id: u64,
    pub scenario: ScenarioKind,
    pub title: Option<String>,
    pub input: Value,
    pub output: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
struct StoreInner {
    next_id: u64,
    records: BTreeMap<u64, StoredScenario>,
}

/// In-memory scenario store. Ids start at 1 and are never reused.
#[derive(Debug)]
pub struct ScenarioStore {
    inner: RwLock<StoreInner>,
}

impl Default for ScenarioStore {
    fn default() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                next_id: 1,
                records: BTreeMap::new(),
            }),
        }
    }
}

impl ScenarioStore {
    pub async fn save(
        &self,
        scenario: ScenarioKind,
        title: Option<String>,
        input: Value,
        output: Value,
    ) -> u64 {
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        inner.next_id += 1;
        inner.records.insert(
            id,
            StoredScenario {
                id,
                scenario,
                title,
                input,
                output,
                created_at: Utc::now(),
            },
        );
        debug!(id, %scenario, "scenario saved");
        id
    }

    pub async fn list(&self, scenario: ScenarioKind) -> Vec<StoredScenario> {
        self.inner
            .read()
            .await
            .records
            .values()
            .filter(|record| record.scenario == scenario)
            .cloned()
            .collect()
    }

    pub async fn delete(&self, id: u64) -> Option<StoredScenario> {
        let removed = self.inner.write().await.records.remove(&id);
        if removed.is_some() {
            debug!(id, "scenario deleted");
        }
        removed
    }
}
