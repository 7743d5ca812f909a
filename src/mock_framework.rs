//! # Mock Framework
//!
//! Lets tests drive a client without a store actor behind it.
//!
//! [`create_mock_client`] hands out a client plus the receiving end of its
//! channel. The `expect_*` helpers pull the next request off that channel,
//! so a test can assert on it and answer however it likes.

use tokio::sync::mpsc;

use crate::actor_framework::{Entity, Filter, ResourceClient, ResourceRequest, Response};
use crate::domain::RecordId;

pub fn create_mock_client<T: Entity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

pub async fn expect_create<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T, Response<RecordId>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { record, respond_to }) => Some((record, respond_to)),
        _ => None,
    }
}

pub async fn expect_get<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(RecordId, Response<Option<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

pub async fn expect_list<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(Option<Filter>, Response<Vec<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::List { filter, respond_to }) => Some((filter, respond_to)),
        _ => None,
    }
}

pub async fn expect_replace<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(RecordId, T, Response<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Replace {
            id,
            record,
            respond_to,
        }) => Some((id, record, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<User>(10);

        let create_task = tokio::spawn(async move {
            let user = User {
                email: "test@example.com".to_string(),
                ..Default::default()
            };
            client.create(user).await
        });

        let (payload, responder) = expect_create(&mut receiver)
            .await
            .expect("Expected Create request");
        assert_eq!(payload.email, "test@example.com");
        responder.send(Ok(RecordId::from("user_1"))).unwrap();

        let result = create_task.await.unwrap();
        assert_eq!(result, Ok(RecordId::from("user_1")));
    }
}
