use crate::models::{Item, Part};
use crate::store::Store;

pub struct MainHandler {
    store: Store,
}

impl MainHandler {
    pub async fn get(&self) -> String {
        "Hello, world".to_string()
    }

    pub async fn put(&self, id_: String) -> String {
        self.store.touch(&id_).await;
        "ok".to_string()
    }
}

pub struct ItemHandler {
    store: Store,
}

impl ItemHandler {
    pub async fn get(&self, item_id: u64) -> Option<Item> {
        self.store.item(item_id).await
    }

    pub async fn delete(&mut self, item_id: u64) {
        self.store.remove(item_id).await;
    }
}

pub struct PartHandler {
    store: Store,
}

impl PartHandler {
    pub async fn post(&self) {}

    pub async fn get(&self, item_id: u64, part: String) -> Option<Part> {
        self.store.part(item_id, &part).await
    }
}

pub struct UploadHandler {
    store: Store,
}

impl UploadHandler {
    pub async fn post(&self, _: String, body: Vec<u8>) {
        self.store.upload(body).await;
    }
}

impl std::fmt::Debug for UploadHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("UploadHandler")
    }
}
