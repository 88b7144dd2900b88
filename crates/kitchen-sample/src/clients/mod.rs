mod kitchen_client;

pub use kitchen_client::{CustomerClient, KitchenClient};
