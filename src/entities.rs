//! Binds the domain records to their mock-store collections.

use crate::actor_framework::Entity;
use crate::domain::{Cart, MenuItem, Order, RecordId, User};

macro_rules! impl_entity {
    ($entity:ty, $collection:literal) => {
        impl Entity for $entity {
            const COLLECTION: &'static str = $collection;

            fn id(&self) -> &RecordId {
                &self.id
            }

            fn set_id(&mut self, id: RecordId) {
                self.id = id;
            }
        }
    };
}

impl_entity!(User, "users");
impl_entity!(MenuItem, "menu");
impl_entity!(Cart, "carts");
impl_entity!(Order, "orders");
