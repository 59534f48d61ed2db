use std::sync::Arc;

use crate::error::Result;
use crate::model::{common::photo::PhotoId, db::photo::Photo, store::ElectionStore};

/// Content-deduplicated photo storage.
///
/// Photos have no owner of their own: one lives exactly as long as some election
/// refers to it. The store counts references, so storing a photo for a new
/// election and deleting the last old election using it can interleave freely.
#[derive(Clone)]
pub struct PhotoStore {
    store: Arc<dyn ElectionStore>,
}

impl PhotoStore {
    pub fn new(store: Arc<dyn ElectionStore>) -> Self {
        Self { store }
    }

    /// Store `content` on behalf of one election, reusing an existing photo
    /// with identical content. Every stored photo must be released again by
    /// [`release_if_unreferenced`](Self::release_if_unreferenced).
    pub async fn store(&self, content: Option<String>) -> Result<Option<PhotoId>> {
        let content = match content {
            Some(content) => content,
            None => return Ok(None),
        };
        let id = self.store.acquire_photo(content).await?;
        debug!("Holding photo {id}");
        Ok(Some(id))
    }

    pub async fn load(&self, id: Option<PhotoId>) -> Result<Option<Photo>> {
        match id {
            Some(id) => self.store.find_photo(id).await,
            None => Ok(None),
        }
    }

    /// Drop one election's hold on the photo and delete it if no election
    /// refers to it any more. Returns true iff it was deleted.
    pub async fn release_if_unreferenced(&self, id: PhotoId) -> Result<bool> {
        let removed = self.store.release_photo(id).await?;
        if removed {
            debug!("Released photo {id}");
        }
        Ok(removed)
    }
}
