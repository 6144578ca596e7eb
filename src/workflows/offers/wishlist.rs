use serde::{Deserialize, Serialize};

use super::domain::{Call, OfferKey, Profile};

/// Profile snapshot captured when the offer was added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistMeta {
    #[serde(
        default,
        rename = "userProfile",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_profile: Option<Profile>,
}

/// Saved offer: the call fields flattened with its source and composite id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredWishlistItem")]
pub struct WishlistItem {
    #[serde(flatten)]
    pub call: Call,
    pub source: String,
    pub id: OfferKey,
    #[serde(default)]
    pub meta: WishlistMeta,
}

/// On-disk shape of an item. The stored `id` string is ignored and rebuilt from `source` and
/// `title`.
#[derive(Deserialize)]
struct StoredWishlistItem {
    #[serde(flatten)]
    call: Call,
    source: String,
    #[serde(default)]
    meta: WishlistMeta,
}

impl From<StoredWishlistItem> for WishlistItem {
    fn from(stored: StoredWishlistItem) -> Self {
        Self {
            id: OfferKey::new(stored.source.clone(), stored.call.title.clone()),
            call: stored.call,
            source: stored.source,
            meta: stored.meta,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WishlistToggle {
    Added,
    Removed,
}

/// Ordered user selection, keyed by `(source, title)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wishlist {
    items: Vec<WishlistItem>,
}

impl Wishlist {
    pub fn new(items: Vec<WishlistItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[WishlistItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<WishlistItem> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, key: &OfferKey) -> bool {
        self.items.iter().any(|item| &item.id == key)
    }

    /// Drop the item with this id. Works for offers no longer present in the catalog.
    pub fn remove(&mut self, key: &OfferKey) -> bool {
        match self.items.iter().position(|item| &item.id == key) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Append the offer when absent, otherwise remove it in place.
    pub fn toggle(
        &mut self,
        source_name: &str,
        call: &Call,
        profile: Option<&Profile>,
    ) -> WishlistToggle {
        let id = OfferKey::new(source_name, call.title.clone());
        match self.items.iter().position(|item| item.id == id) {
            Some(index) => {
                self.items.remove(index);
                WishlistToggle::Removed
            }
            None => {
                self.items.push(WishlistItem {
                    call: call.clone(),
                    source: source_name.to_string(),
                    id,
                    meta: WishlistMeta {
                        user_profile: profile.cloned(),
                    },
                });
                WishlistToggle::Added
            }
        }
    }
}

/// External key-value store holding the two persisted records: the wishlist and the current
/// profile. Each write replaces the whole record.
pub trait SessionStore: Send + Sync {
    fn load_wishlist(&self) -> Result<Wishlist, StoreError>;
    fn save_wishlist(&self, wishlist: &Wishlist) -> Result<(), StoreError>;
    fn load_profile(&self) -> Result<Option<Profile>, StoreError>;
    /// `None` clears the stored profile.
    fn save_profile(&self, profile: Option<&Profile>) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("stored record `{record}` is corrupt: {source}")]
    Corrupt {
        record: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
