//! Aggregation over paged listings.
//!
//! Backends that cannot look a resource up by name only offer a paged list.
//! [`pages`] walks it lazily; [`list_all`] drains it into one ordered
//! sequence and [`find_by_name`] matches only once the whole collection is
//! known.

use std::pin::pin;

use async_trait::async_trait;
use futures::{Stream, TryStreamExt, stream};
use tracing::debug;

use crate::backend::{BackendError, BackendResult};

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Continuation token; absent or empty on the last page.
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    /// Last page.
    pub const fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: None,
        }
    }

    /// Page followed by another one.
    pub fn more(items: Vec<T>, next_token: impl Into<String>) -> Self {
        Self {
            items,
            next_token: Some(next_token.into()),
        }
    }
}

/// A paged collection in the backend.
#[async_trait]
pub trait PagedListing: Send + Sync {
    type Item: Send;

    /// Fetch the page after `token`, or the first page for `None`.
    async fn list_page(&self, token: Option<String>) -> BackendResult<Page<Self::Item>>;
}

enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Lazy stream of pages. Calling it again restarts from the first page.
pub fn pages<L>(listing: &L) -> impl Stream<Item = BackendResult<Vec<L::Item>>> + Send + '_
where
    L: PagedListing + ?Sized,
{
    stream::try_unfold(Cursor::Start, move |cursor| async move {
        let token = match cursor {
            Cursor::Start => None,
            Cursor::Next(token) => Some(token),
            Cursor::Done => return Ok(None),
        };

        let page = listing.list_page(token).await?;
        let next = match page.next_token {
            Some(token) if !token.is_empty() => Cursor::Next(token),
            _ => Cursor::Done,
        };
        Ok::<_, BackendError>(Some((page.items, next)))
    })
}

/// Every item of the listing, in listing order.
pub async fn list_all<L>(listing: &L) -> BackendResult<Vec<L::Item>>
where
    L: PagedListing + ?Sized,
{
    let mut all = Vec::new();
    let mut stream = pin!(pages(listing));
    let mut count = 0usize;

    while let Some(items) = stream.try_next().await? {
        count += 1;
        all.extend(items);
    }

    debug!(pages = count, items = all.len(), "Listed collection");
    Ok(all)
}

/// Item named `name`. When several items share it, the last listed wins.
pub async fn find_by_name<L, F>(listing: &L, name: &str, name_of: F) -> BackendResult<Option<L::Item>>
where
    L: PagedListing + ?Sized,
    F: Fn(&L::Item) -> &str,
{
    let all = list_all(listing).await?;
    Ok(all.into_iter().rev().find(|item| name_of(item) == name))
}
