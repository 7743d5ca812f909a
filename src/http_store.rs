use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::actor_framework::{Entity, Filter, ResourceClient, ResourceRequest};
use crate::domain::{next_timestamp_id, RecordId};
use crate::error::StoreError;

/// Serves one collection by forwarding every request to the mock REST
/// server at `{base_url}/{collection}`.
pub struct HttpResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    http: Client,
    base_url: String,
}

impl<T: Entity> HttpResourceActor<T> {
    pub fn new(buffer_size: usize, http: Client, base_url: &str) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        };
        (actor, ResourceClient::new(sender))
    }

    #[instrument(name = "http_actor", skip(self), fields(collection = T::COLLECTION))]
    pub async fn run(mut self) {
        info!(base_url = %self.base_url, "Collection actor starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { record, respond_to } => {
                    let _ = respond_to.send(self.create(record).await);
                }
                ResourceRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(self.get(&id).await);
                }
                ResourceRequest::List { filter, respond_to } => {
                    let _ = respond_to.send(self.list(filter.as_ref()).await);
                }
                ResourceRequest::Replace {
                    id,
                    record,
                    respond_to,
                } => {
                    let _ = respond_to.send(self.replace(&id, record).await);
                }
            }
        }
        info!("Collection actor stopped");
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, T::COLLECTION)
    }

    fn record_url(&self, id: &RecordId) -> String {
        format!("{}/{}", self.collection_url(), id)
    }

    async fn create(&self, mut record: T) -> Result<RecordId, StoreError> {
        if record.id().is_empty() {
            record.set_id(next_timestamp_id());
        }
        let response = send(self.http.post(self.collection_url()).json(&record)).await?;
        let created: T = decode(T::COLLECTION, checked(T::COLLECTION, response)?).await?;
        debug!(id = %created.id(), "Record created");
        Ok(created.id().clone())
    }

    async fn get(&self, id: &RecordId) -> Result<Option<T>, StoreError> {
        let response = send(self.http.get(self.record_url(id))).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(T::COLLECTION, checked(T::COLLECTION, response)?).await.map(Some)
    }

    async fn list(&self, filter: Option<&Filter>) -> Result<Vec<T>, StoreError> {
        let mut request = self.http.get(self.collection_url());
        if let Some(filter) = filter {
            request = request.query(&[(filter.field, filter.value.as_str())]);
        }
        let response = send(request).await?;
        let records: Vec<Value> = decode(T::COLLECTION, checked(T::COLLECTION, response)?).await?;
        Ok(keep_decodable(records))
    }

    async fn replace(&self, id: &RecordId, mut record: T) -> Result<T, StoreError> {
        record.set_id(id.clone());
        let response = send(self.http.put(self.record_url(id)).json(&record)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound {
                collection: T::COLLECTION,
                id: id.clone(),
            });
        }
        decode(T::COLLECTION, checked(T::COLLECTION, response)?).await
    }
}

async fn send(request: RequestBuilder) -> Result<Response, StoreError> {
    request.send().await.map_err(|e| {
        warn!(error = %e, "Mock data store request failed");
        StoreError::Unreachable(e.to_string())
    })
}

fn checked(collection: &'static str, response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        warn!(status = status.as_u16(), "Mock data store rejected request");
        Err(StoreError::Status {
            collection,
            status: status.as_u16(),
        })
    }
}

async fn decode<R: DeserializeOwned>(
    collection: &'static str,
    response: Response,
) -> Result<R, StoreError> {
    response.json::<R>().await.map_err(|e| StoreError::Decode {
        collection,
        reason: e.to_string(),
    })
}

/// The store enforces no schema, so one malformed record is skipped rather
/// than failing the whole listing.
fn keep_decodable<T: Entity>(records: Vec<Value>) -> Vec<T> {
    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<T>(record) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!(error = %e, "Skipping malformed record");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MenuItem, Order};
    use serde_json::json;

    #[test]
    fn malformed_records_are_skipped_in_listings() {
        let orders: Vec<Order> = keep_decodable(vec![
            json!({"id": 1, "total": 25.0, "paymentMethod": "card"}),
            json!({"id": 2, "total": "twenty"}),
            json!({"id": 3, "total": 9.5, "paymentMethod": "upi", "deliveryStatus": "pending"}),
        ]);
        let ids: Vec<_> = orders.iter().map(|o| o.id.clone()).collect();
        assert_eq!(ids, [RecordId::from(1u64), RecordId::from(3u64)]);
    }

    #[tokio::test]
    async fn unreachable_server_is_reported_as_network_failure() {
        // nothing listens on port 1
        let (actor, client) =
            HttpResourceActor::<MenuItem>::new(4, Client::new(), "http://127.0.0.1:1/");
        assert_eq!(actor.collection_url(), "http://127.0.0.1:1/menu");
        tokio::spawn(actor.run());

        let err = client.list(None).await.unwrap_err();
        assert!(matches!(err, StoreError::Unreachable(_)));
    }
}
