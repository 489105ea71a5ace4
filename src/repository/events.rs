//! Event log repository (issues, maintenance windows, recoveries)

use std::sync::Arc;

use chrono::NaiveDateTime;
use tokio::sync::RwLock;

use super::{persist, IdGenerator};
use crate::{
    models::{event::HistoryFilter, HistoryEvent, NewEvent},
    storage::{self, Storage},
};

/// History events, newest first
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<HistoryEvent>,
    ids: IdGenerator,
}

impl EventLog {
    pub fn from_events(events: Vec<HistoryEvent>) -> Self {
        Self {
            events,
            ids: IdGenerator::new(),
        }
    }

    pub fn events(&self) -> &[HistoryEvent] {
        &self.events
    }

    pub fn get(&self, id: i64) -> Option<&HistoryEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    fn fresh_id(&mut self) -> i64 {
        loop {
            let id = self.ids.next_id();
            if self.get(id).is_none() {
                return id;
            }
        }
    }

    /// Assign an id and put the event at the head of the log
    pub fn add(&mut self, event: NewEvent) -> HistoryEvent {
        let event = event.into_event(self.fresh_id());
        self.events.insert(0, event.clone());
        event
    }

    /// Mark an event resolved. Returns false when the id is unknown or the
    /// event was already resolved; type, date and description are never touched.
    pub fn resolve(&mut self, id: i64, resolution_steps: &str, resolved_by: &str) -> bool {
        match self.events.iter_mut().find(|e| e.id == id) {
            Some(event) if !event.resolved => {
                event.resolved = true;
                event.resolution_steps = Some(resolution_steps.to_string());
                event.resolved_by = Some(resolved_by.to_string());
                true
            }
            _ => false,
        }
    }

    /// Remove an event. Recoveries pointing at it are left alone.
    pub fn delete(&mut self, id: i64) -> bool {
        let before = self.events.len();
        self.events.retain(|e| e.id != id);
        self.events.len() != before
    }

    /// Events of one tool in log order
    pub fn query_by_tool<'a>(&'a self, tool_name: &'a str) -> impl Iterator<Item = &'a HistoryEvent> + 'a {
        self.events.iter().filter(move |e| e.tool_name == tool_name)
    }

    pub fn rename_tool(&mut self, old_name: &str, new_name: &str) -> usize {
        let mut count = 0;
        for event in self.events.iter_mut().filter(|e| e.tool_name == old_name) {
            event.tool_name = new_name.to_string();
            count += 1;
        }
        count
    }
}

#[derive(Clone)]
pub struct EventsRepository {
    storage: Arc<dyn Storage>,
    store: Arc<RwLock<EventLog>>,
}

impl EventsRepository {
    pub fn new(storage: Arc<dyn Storage>, log: EventLog) -> Self {
        Self {
            storage,
            store: Arc::new(RwLock::new(log)),
        }
    }

    pub(crate) fn store(&self) -> &Arc<RwLock<EventLog>> {
        &self.store
    }

    async fn save(&self, log: &EventLog) {
        persist(self.storage.as_ref(), storage::KEY_HISTORY, log.events()).await;
    }

    /// Whole log, newest first, optionally filtered
    pub async fn list(&self, filter: Option<&HistoryFilter>) -> Vec<HistoryEvent> {
        self.store
            .read()
            .await
            .events()
            .iter()
            .filter(|e| filter.map_or(true, |f| f.matches(e)))
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: i64) -> Option<HistoryEvent> {
        self.store.read().await.get(id).cloned()
    }

    pub async fn by_tool(&self, tool_name: &str) -> Vec<HistoryEvent> {
        self.store.read().await.query_by_tool(tool_name).cloned().collect()
    }

    /// Events of one tool that pass `filter`
    pub async fn search(&self, tool_name: &str, filter: &HistoryFilter) -> Vec<HistoryEvent> {
        self.store
            .read()
            .await
            .query_by_tool(tool_name)
            .filter(|e| filter.matches(e))
            .cloned()
            .collect()
    }

    pub async fn add(&self, event: NewEvent) -> HistoryEvent {
        let mut log = self.store.write().await;
        let event = log.add(event);
        self.save(&log).await;
        tracing::debug!("Logged {} event {} for {}", event.event_type, event.id, event.tool_name);
        event
    }

    pub async fn resolve(&self, id: i64, resolution_steps: &str, resolved_by: &str) -> bool {
        let mut log = self.store.write().await;
        let resolved = log.resolve(id, resolution_steps, resolved_by);
        if resolved {
            self.save(&log).await;
        }
        resolved
    }

    pub async fn delete(&self, id: i64) -> bool {
        let mut log = self.store.write().await;
        let deleted = log.delete(id);
        if deleted {
            self.save(&log).await;
        }
        deleted
    }

    /// Close the selected issue / maintenance events of a tool.
    ///
    /// Each eligible item gets a recovery event pointing at it and is then
    /// resolved with the recovery description. Ids that do not belong to the
    /// tool, are already resolved or lie in the future are skipped.
    pub async fn record_recovery(
        &self,
        tool_name: &str,
        item_ids: &[i64],
        description: &str,
        attended_by: &str,
        now: NaiveDateTime,
    ) -> Vec<HistoryEvent> {
        let mut log = self.store.write().await;
        let mut recoveries = Vec::new();

        for &id in item_ids {
            let item = match log.get(id) {
                Some(item) if item.tool_name == tool_name && item.is_recoverable(now) => item,
                _ => {
                    tracing::debug!("Skipping recovery of event {} on {}", id, tool_name);
                    continue;
                }
            };
            let text = format!("Recovery from {}: {}", item.event_type, description);
            let recovery = log.add(NewEvent::recovery(tool_name, text, attended_by, now, id));
            log.resolve(id, description, attended_by);
            recoveries.push(recovery);
        }

        if !recoveries.is_empty() {
            self.save(&log).await;
        }
        recoveries
    }
}
