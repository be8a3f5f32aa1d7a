//! In-memory backends.
//!
//! Record every call and can fail a chosen call once, which is enough to
//! drive the engine and its variants without a management API.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::backend::{BackendError, BackendResult, Resource, ResourceBackend, SettingsBackend};
use crate::tags::{Tag, TagBackend};

/// A recorded backend call, keyed by resource name or tag target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Call {
    Describe(String),
    Create(String),
    Update(String),
    Delete(String),
    Apply(String),
    Reset(String),
    Tag { target: String, keys: Vec<String> },
    Untag { target: String, keys: Vec<String> },
}

type Model<R> = Box<dyn Fn(&R) -> <R as Resource>::Snapshot + Send + Sync>;

/// Resource and settings backend holding snapshots in a map keyed by name.
pub struct InMemoryBackend<R: Resource> {
    store: Mutex<HashMap<String, R::Snapshot>>,
    model: Model<R>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<Call, BackendError>>,
}

impl<R: Resource> InMemoryBackend<R> {
    /// Create an empty backend. `model` turns desired properties into the
    /// snapshot the backend would report after writing them.
    pub fn new<F>(model: F) -> Self
    where
        F: Fn(&R) -> R::Snapshot + Send + Sync + 'static,
    {
        Self {
            store: Mutex::new(HashMap::new()),
            model: Box::new(model),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Store a live resource without recording a call.
    pub async fn seed(&self, resource: &R) {
        let snapshot = (self.model)(resource);
        self.store
            .lock()
            .await
            .insert(resource.name().to_string(), snapshot);
    }

    /// Store an arbitrary snapshot under `name`.
    pub async fn seed_snapshot(&self, name: impl Into<String>, snapshot: R::Snapshot) {
        self.store.lock().await.insert(name.into(), snapshot);
    }

    /// Current snapshot stored under `name`.
    pub async fn get(&self, name: &str) -> Option<R::Snapshot> {
        self.store.lock().await.get(name).cloned()
    }

    /// Calls made so far, in order.
    pub async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    /// Fail the next occurrence of `call` with `error`.
    pub async fn fail_on(&self, call: Call, error: BackendError) {
        self.failures.lock().await.insert(call, error);
    }

    async fn record(&self, call: Call) -> BackendResult<()> {
        self.calls.lock().await.push(call.clone());
        match self.failures.lock().await.remove(&call) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn write(&self, resource: &R) -> R::Snapshot {
        let snapshot = (self.model)(resource);
        self.store
            .lock()
            .await
            .insert(resource.name().to_string(), snapshot.clone());
        snapshot
    }
}

#[async_trait]
impl<R: Resource> ResourceBackend<R> for InMemoryBackend<R> {
    async fn describe(&self, resource: &R) -> BackendResult<R::Snapshot> {
        self.record(Call::Describe(resource.name().to_string()))
            .await?;
        self.get(resource.name())
            .await
            .ok_or_else(|| BackendError::not_found(resource.name()))
    }

    async fn create(&self, resource: &R) -> BackendResult<R::Snapshot> {
        self.record(Call::Create(resource.name().to_string()))
            .await?;
        Ok(self.write(resource).await)
    }

    async fn update(&self, resource: &R, _current: &R::Snapshot) -> BackendResult<R::Snapshot> {
        self.record(Call::Update(resource.name().to_string()))
            .await?;
        if self.get(resource.name()).await.is_none() {
            return Err(BackendError::not_found(resource.name()));
        }
        Ok(self.write(resource).await)
    }

    async fn delete(&self, resource: &R, _current: &R::Snapshot) -> BackendResult<()> {
        self.record(Call::Delete(resource.name().to_string()))
            .await?;
        self.store
            .lock()
            .await
            .remove(resource.name())
            .map(|_| ())
            .ok_or_else(|| BackendError::not_found(resource.name()))
    }
}

#[async_trait]
impl<R: Resource> SettingsBackend<R> for InMemoryBackend<R> {
    async fn apply(&self, resource: &R) -> BackendResult<R::Snapshot> {
        self.record(Call::Apply(resource.name().to_string()))
            .await?;
        Ok(self.write(resource).await)
    }

    async fn reset(&self, resource: &R) -> BackendResult<()> {
        self.record(Call::Reset(resource.name().to_string()))
            .await?;
        self.store.lock().await.remove(resource.name());
        Ok(())
    }
}

/// Tag backend holding the tag set of each target.
#[derive(Default)]
pub struct InMemoryTagBackend {
    tags: Mutex<HashMap<String, BTreeMap<String, String>>>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<Call, BackendError>>,
}

impl InMemoryTagBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Give `target` an initial tag set without recording a call.
    pub async fn seed(&self, target: impl Into<String>, tags: &[Tag]) {
        let set = tags
            .iter()
            .map(|t| (t.key.clone(), t.value.clone()))
            .collect();
        self.tags.lock().await.insert(target.into(), set);
    }

    /// Tags currently on `target`.
    pub async fn tags_of(&self, target: &str) -> BTreeMap<String, String> {
        self.tags
            .lock()
            .await
            .get(target)
            .cloned()
            .unwrap_or_default()
    }

    /// Calls made so far, in order.
    pub async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    /// Fail the next occurrence of `call` with `error`.
    pub async fn fail_on(&self, call: Call, error: BackendError) {
        self.failures.lock().await.insert(call, error);
    }

    async fn record(&self, call: Call) -> BackendResult<()> {
        self.calls.lock().await.push(call.clone());
        match self.failures.lock().await.remove(&call) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TagBackend for InMemoryTagBackend {
    async fn tag(&self, target: &str, tags: &[Tag]) -> BackendResult<()> {
        let keys = tags.iter().map(|t| t.key.clone()).collect();
        self.record(Call::Tag {
            target: target.to_string(),
            keys,
        })
        .await?;

        let mut all = self.tags.lock().await;
        let set = all.entry(target.to_string()).or_default();
        for tag in tags {
            set.insert(tag.key.clone(), tag.value.clone());
        }
        Ok(())
    }

    async fn untag(&self, target: &str, keys: &[String]) -> BackendResult<()> {
        self.record(Call::Untag {
            target: target.to_string(),
            keys: keys.to_vec(),
        })
        .await?;

        if let Some(set) = self.tags.lock().await.get_mut(target) {
            for key in keys {
                set.remove(key);
            }
        }
        Ok(())
    }
}
