use tracing::{info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::domain::{static_catalog, MenuItem};
use crate::error::StoreError;

#[derive(Clone)]
pub struct MenuClient {
    inner: ResourceClient<MenuItem>,
}

impl MenuClient {
    pub fn new(inner: ResourceClient<MenuItem>) -> Self {
        Self { inner }
    }

    /// The store's menu, or the built-in catalog when the store has none
    /// or cannot be reached. Never fails.
    #[instrument(skip(self))]
    pub async fn fetch_menu(&self) -> Vec<MenuItem> {
        match self.inner.list(None).await {
            Ok(items) if !items.is_empty() => {
                info!(count = items.len(), "Menu loaded from store");
                items
            }
            Ok(_) => {
                info!("Store menu empty, using built-in catalog");
                static_catalog()
            }
            Err(e) => {
                warn!(error = %e, "Menu fetch failed, using built-in catalog");
                static_catalog()
            }
        }
    }
}

impl_record_lookups!(MenuClient, MenuItem, StoreError, menu_item);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RecordId;
    use crate::mock_framework::{create_mock_client, expect_get, expect_list};

    #[tokio::test]
    async fn falls_back_to_catalog_when_store_fails() {
        let (inner, mut rx) = create_mock_client::<MenuItem>(4);
        let client = MenuClient::new(inner);

        let task = tokio::spawn(async move { client.fetch_menu().await });
        let (_, responder) = expect_list(&mut rx).await.unwrap();
        responder
            .send(Err(StoreError::Unreachable("refused".into())))
            .unwrap();

        assert_eq!(task.await.unwrap().len(), 32);
    }

    #[tokio::test]
    async fn store_menu_wins_when_present() {
        let (inner, mut rx) = create_mock_client::<MenuItem>(4);
        let client = MenuClient::new(inner);

        let lookup = {
            let client = client.clone();
            tokio::spawn(async move { client.get_menu_item(RecordId::from("7")).await })
        };
        let (id, responder) = expect_get(&mut rx).await.unwrap();
        assert_eq!(id, RecordId::from(7u64));
        responder.send(Ok(None)).unwrap();
        assert_eq!(lookup.await.unwrap(), Ok(None));

        let task = tokio::spawn(async move { client.fetch_menu().await });
        let (_, responder) = expect_list(&mut rx).await.unwrap();
        let special = MenuItem {
            id: RecordId::from("99"),
            name: "Chef's Special".into(),
            description: String::new(),
            price: 30.0,
            image: String::new(),
        };
        responder.send(Ok(vec![special])).unwrap();

        let menu = task.await.unwrap();
        assert_eq!(menu.len(), 1);
        assert_eq!(menu[0].name, "Chef's Special");
    }
}
