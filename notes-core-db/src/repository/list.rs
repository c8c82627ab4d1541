use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::entity::Entity;
use crate::repository::pagination::{Page, PageRequest};

/// Generic repository trait for listing entities page by page, ordered by id
///
/// # Example
/// ```ignore
/// let page = store.list(PageRequest::new(20, 0)).await?;
/// println!("Page {} of {}", page.page_number(), page.total_pages());
/// ```
#[async_trait]
pub trait List<E: Entity>: Send + Sync {
    async fn list(&self, page: PageRequest) -> StoreResult<Page<E>>;
}
