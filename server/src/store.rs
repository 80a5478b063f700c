use concierge_core::model::{sample_assets, Conversation, Message};
use concierge_core::{Asset, NewAsset};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Process-lifetime storage for assets and conversations.
///
/// Assets keep insertion order; they are handed out as `Arc`s so the
/// retrieval index can share them without copying.
#[derive(Debug, Default)]
pub struct MemStore {
    assets: RwLock<Vec<Arc<Asset>>>,
    conversations: RwLock<HashMap<String, Conversation>>,
}

impl MemStore {
    pub fn new() -> Self { Self::default() }

    pub fn with_assets<I: IntoIterator<Item = Asset>>(assets: I) -> Self {
        let store = Self::new();
        store.assets.write().extend(assets.into_iter().map(Arc::new));
        store
    }

    pub fn with_sample_assets() -> Self {
        Self::with_assets(sample_assets().into_iter().map(Asset::from_new))
    }

    pub fn assets(&self) -> Vec<Arc<Asset>> { self.assets.read().clone() }

    pub fn assets_by_category(&self, category: &str) -> Vec<Arc<Asset>> {
        self.assets.read().iter().filter(|a| a.category == category).cloned().collect()
    }

    /// Case-insensitive substring match over title, description, content and tags.
    pub fn search_assets(&self, query: &str) -> Vec<Arc<Asset>> {
        let q = query.to_lowercase();
        self.assets
            .read()
            .iter()
            .filter(|a| {
                a.title.to_lowercase().contains(&q)
                    || a.description.as_ref().is_some_and(|d| d.to_lowercase().contains(&q))
                    || a.content.to_lowercase().contains(&q)
                    || a.tags.iter().any(|t| t.to_lowercase().contains(&q))
            })
            .cloned()
            .collect()
    }

    pub fn asset(&self, id: &str) -> Option<Arc<Asset>> {
        self.assets.read().iter().find(|a| a.id == id).cloned()
    }

    pub fn create_asset(&self, new: NewAsset) -> Arc<Asset> {
        let asset = Arc::new(Asset::from_new(new));
        self.assets.write().push(asset.clone());
        asset
    }

    pub fn conversation(&self, id: &str) -> Option<Conversation> { self.conversations.read().get(id).cloned() }

    pub fn create_conversation(&self) -> Conversation {
        let conversation = Conversation::new();
        self.conversations.write().insert(conversation.id.clone(), conversation.clone());
        conversation
    }

    /// Append to the message list under the write lock and return the
    /// updated conversation. `None` when the conversation is unknown.
    pub fn append_messages<I>(&self, id: &str, messages: I) -> Option<Conversation>
    where
        I: IntoIterator<Item = Message>,
    {
        let mut conversations = self.conversations.write();
        let conversation = conversations.get_mut(id)?;
        conversation.messages.extend(messages);
        conversation.updated_at = concierge_core::model::now_rfc3339();
        Some(conversation.clone())
    }

    /// Replace the message list. `None` when the conversation is unknown.
    pub fn update_conversation(&self, id: &str, messages: Vec<Message>) -> Option<Conversation> {
        let mut conversations = self.conversations.write();
        let conversation = conversations.get_mut(id)?;
        conversation.messages = messages;
        conversation.updated_at = concierge_core::model::now_rfc3339();
        Some(conversation.clone())
    }
}
