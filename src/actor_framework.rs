use std::collections::BTreeMap;
use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

use crate::domain::RecordId;
use crate::error::StoreError;

// =============================================================================
// 1. THE ABSTRACTION
// =============================================================================

/// A JSON document kept in one collection of the mock data store.
pub trait Entity: Clone + Debug + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Collection name; also the URL segment on the HTTP store.
    const COLLECTION: &'static str;

    fn id(&self) -> &RecordId;

    fn set_id(&mut self, id: RecordId);
}

/// Equality match on one top-level field, like `users?email=...`.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: &'static str,
    pub value: String,
}

impl Filter {
    pub fn eq(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    /// Numbers and booleans compare by their JSON text, the way query
    /// strings do.
    pub fn matches<T: Serialize>(&self, record: &T) -> bool {
        let Ok(Value::Object(fields)) = serde_json::to_value(record) else {
            return false;
        };
        match fields.get(self.field) {
            Some(Value::String(s)) => *s == self.value,
            Some(Value::Number(n)) => n.to_string() == self.value,
            Some(Value::Bool(b)) => b.to_string() == self.value,
            _ => false,
        }
    }
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        record: T,
        respond_to: Response<RecordId>,
    },
    Get {
        id: RecordId,
        respond_to: Response<Option<T>>,
    },
    List {
        filter: Option<Filter>,
        respond_to: Response<Vec<T>>,
    },
    /// Full overwrite (HTTP PUT). There is no partial update.
    Replace {
        id: RecordId,
        record: T,
        respond_to: Response<T>,
    },
}

// =============================================================================
// 3. THE IN-MEMORY STORE ACTOR
// =============================================================================

/// Serves one collection from memory. Stands in for the mock HTTP server
/// in offline runs and tests; answers exactly like it does.
pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: BTreeMap<RecordId, T>,
    next_id_fn: Box<dyn Fn() -> RecordId + Send + Sync>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> RecordId + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: BTreeMap::new(),
            next_id_fn: Box::new(next_id_fn),
        };
        (actor, ResourceClient::new(sender))
    }

    /// Preloads records, e.g. the menu and the shared cart.
    pub fn seeded(mut self, records: impl IntoIterator<Item = T>) -> Self {
        for record in records {
            self.store.insert(record.id().clone(), record);
        }
        self
    }

    #[instrument(name = "resource_actor", skip(self), fields(collection = T::COLLECTION))]
    pub async fn run(mut self) {
        info!(records = self.store.len(), "Collection actor starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { record, respond_to } => {
                    let _ = respond_to.send(self.handle_create(record));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.store.get(&id).cloned()));
                }
                ResourceRequest::List { filter, respond_to } => {
                    let _ = respond_to.send(Ok(self.handle_list(filter.as_ref())));
                }
                ResourceRequest::Replace {
                    id,
                    record,
                    respond_to,
                } => {
                    let _ = respond_to.send(self.handle_replace(id, record));
                }
            }
        }
        info!("Collection actor stopped");
    }

    fn handle_create(&mut self, mut record: T) -> Result<RecordId, StoreError> {
        if record.id().is_empty() {
            record.set_id((self.next_id_fn)());
        }
        let id = record.id().clone();
        if self.store.contains_key(&id) {
            warn!(%id, "Duplicate id rejected");
            return Err(StoreError::Duplicate {
                collection: T::COLLECTION,
                id,
            });
        }
        self.store.insert(id.clone(), record);
        debug!(%id, "Record created");
        Ok(id)
    }

    fn handle_list(&self, filter: Option<&Filter>) -> Vec<T> {
        self.store
            .values()
            .filter(|record| filter.map_or(true, |f| f.matches(record)))
            .cloned()
            .collect()
    }

    fn handle_replace(&mut self, id: RecordId, mut record: T) -> Result<T, StoreError> {
        let Some(slot) = self.store.get_mut(&id) else {
            return Err(StoreError::NotFound {
                collection: T::COLLECTION,
                id,
            });
        };
        // the URL id wins over whatever the body carries
        record.set_id(id.clone());
        *slot = record.clone();
        debug!(%id, "Record replaced");
        Ok(record)
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

/// Handle to a collection actor. Cheap to clone; the collection shuts down
/// once every handle is dropped.
#[derive(Clone)]
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> ResourceClient<T> {
    pub(crate) fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    pub async fn create(&self, record: T) -> Result<RecordId, StoreError> {
        self.request(|respond_to| ResourceRequest::Create { record, respond_to })
            .await
    }

    pub async fn get(&self, id: RecordId) -> Result<Option<T>, StoreError> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to })
            .await
    }

    pub async fn list(&self, filter: Option<Filter>) -> Result<Vec<T>, StoreError> {
        self.request(|respond_to| ResourceRequest::List { filter, respond_to })
            .await
    }

    pub async fn replace(&self, id: RecordId, record: T) -> Result<T, StoreError> {
        self.request(|respond_to| ResourceRequest::Replace {
            id,
            record,
            respond_to,
        })
        .await
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R>) -> ResourceRequest<T>,
    ) -> Result<R, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| StoreError::ActorCommunicationError("Actor closed".to_string()))?;
        response
            .await
            .map_err(|_| StoreError::ActorCommunicationError("Actor dropped".to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Cart, CartItem, User};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    fn counter_ids() -> impl Fn() -> RecordId + Send + Sync + 'static {
        let counter = Arc::new(AtomicU64::new(1));
        move || RecordId::from(counter.fetch_add(1, Ordering::SeqCst))
    }

    fn user(email: &str) -> User {
        User {
            email: email.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_assigns_ids_and_filters_by_field() {
        let (actor, client) = ResourceActor::<User>::new(10, counter_ids());
        tokio::spawn(actor.run());

        let first = client.create(user("a@example.com")).await.unwrap();
        let second = client.create(user("b@example.com")).await.unwrap();
        assert_eq!(first, RecordId::from("1"));
        assert_eq!(second, RecordId::from("2"));

        let matches = client
            .list(Some(Filter::eq("email", "b@example.com")))
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, second);
        assert_eq!(client.list(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn client_supplied_ids_must_be_unique() {
        let (actor, client) = ResourceActor::<User>::new(10, counter_ids());
        tokio::spawn(actor.run());

        let mut record = user("a@example.com");
        record.id = RecordId::from("1700000000000");
        client.create(record.clone()).await.unwrap();

        let err = client.create(record).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { collection: "users", .. }));
    }

    #[tokio::test]
    async fn replace_overwrites_whole_record() {
        let cart = Cart::empty(RecordId::from("1"));
        let (actor, client) = ResourceActor::<Cart>::new(10, counter_ids());
        tokio::spawn(actor.seeded([cart]).run());

        let full = Cart {
            id: RecordId::default(),
            items: vec![CartItem {
                menu_id: RecordId::from(3u64),
                quantity: 2,
                price: 18.99,
                name: "Creamy Truffle Pasta".into(),
            }],
        };
        let stored = client.replace(RecordId::from("1"), full).await.unwrap();
        assert_eq!(stored.id, RecordId::from("1"));

        let fetched = client.get(RecordId::from("1")).await.unwrap().unwrap();
        assert_eq!(fetched.items.len(), 1);

        let missing = client
            .replace(RecordId::from("2"), Cart::default())
            .await
            .unwrap_err();
        assert!(matches!(missing, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn dropped_actor_reports_communication_error() {
        let (actor, client) = ResourceActor::<User>::new(1, counter_ids());
        drop(actor);
        let err = client.get(RecordId::from("1")).await.unwrap_err();
        assert_eq!(err, StoreError::ActorCommunicationError("Actor closed".into()));
    }
}
