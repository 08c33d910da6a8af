//! Assembles a user's photos with the public identity of every comment author.

use futures::{StreamExt, TryStreamExt, stream};
use photoshare_common::{
    model::{
        Id,
        photo::{AggregatedPhoto, MissingAuthorError, Photo},
        user::{UserMarker, UserSummary},
    },
    store::{PhotoStore, UserStore},
};
use std::{
    collections::{HashMap, HashSet},
    num::NonZeroUsize,
    sync::Arc,
    time::Duration,
};
use thiserror::Error;
use tracing::{debug, instrument};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub const DEFAULT_LOOKUP_CONCURRENCY: NonZeroUsize = NonZeroUsize::new(16).unwrap();
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("User {0} has no photos")]
    NoPhotos(Id<UserMarker>),
    #[error("Comment author {0} does not exist")]
    UnknownAuthor(Id<UserMarker>),
    #[error("Fetching photos failed: {0}")]
    PhotoStore(#[source] BoxError),
    #[error("Resolving a comment author failed: {0}")]
    UserStore(#[source] BoxError),
    #[error("Aggregation did not finish within {0:?}")]
    TimedOut(Duration),
}

impl AggregateError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NoPhotos(_) | Self::UnknownAuthor(_))
    }
}

impl From<MissingAuthorError> for AggregateError {
    fn from(value: MissingAuthorError) -> Self {
        Self::UnknownAuthor(value.0)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct AggregatorConfig {
    /// How many author lookups of one request may be in flight at once.
    pub lookup_concurrency: NonZeroUsize,
    pub timeout: Duration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            lookup_concurrency: DEFAULT_LOOKUP_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug)]
pub struct PhotoAggregator<S> {
    store: Arc<S>,
    config: AggregatorConfig,
}

impl<S> PhotoAggregator<S> {
    #[must_use]
    pub fn new(store: Arc<S>, config: AggregatorConfig) -> Self {
        Self { store, config }
    }
}

impl<S> PhotoAggregator<S>
where
    S: PhotoStore + UserStore + 'static,
{
    /// Fetches the photos of `user_id` and embeds every comment's author.
    ///
    /// Fails as a whole if the user has no photos, if any author cannot be
    /// resolved, or if the configured timeout elapses. Photos keep the store's
    /// order and comments keep their order within each photo.
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn fetch_photos_with_authors(
        &self,
        user_id: &Id<UserMarker>,
    ) -> Result<Vec<AggregatedPhoto>, AggregateError> {
        let timeout = self.config.timeout;

        tokio::time::timeout(timeout, self.aggregate(user_id))
            .await
            .map_err(|_| AggregateError::TimedOut(timeout))?
    }

    async fn aggregate(
        &self,
        user_id: &Id<UserMarker>,
    ) -> Result<Vec<AggregatedPhoto>, AggregateError> {
        let photos = self
            .store
            .find_photos_by_user(user_id)
            .await
            .map_err(|err| AggregateError::PhotoStore(Box::new(err)))?;

        if photos.is_empty() {
            return Err(AggregateError::NoPhotos(user_id.clone()));
        }

        let authors = self.resolve_authors(&photos).await?;

        let aggregated = photos
            .iter()
            .map(|photo| photo.with_authors(&authors))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(aggregated)
    }

    /// Looks up every distinct comment author concurrently.
    ///
    /// Returns on the first failure; lookups still in flight are dropped.
    async fn resolve_authors(
        &self,
        photos: &[Photo],
    ) -> Result<HashMap<Id<UserMarker>, UserSummary>, AggregateError> {
        let author_ids: HashSet<Id<UserMarker>> = photos
            .iter()
            .flat_map(Photo::author_ids)
            .cloned()
            .collect();

        debug!(
            photos = photos.len(),
            authors = author_ids.len(),
            "Resolving comment authors"
        );

        let lookups = author_ids.into_iter().map(|author_id| {
            let store = Arc::clone(&self.store);
            async move { resolve_author(&*store, author_id).await }
        });

        stream::iter(lookups)
            .buffer_unordered(self.config.lookup_concurrency.get())
            .try_collect()
            .await
    }
}

async fn resolve_author<S: UserStore>(
    store: &S,
    author_id: Id<UserMarker>,
) -> Result<(Id<UserMarker>, UserSummary), AggregateError> {
    let summary = store
        .find_user_summary(&author_id)
        .await
        .map_err(|err| AggregateError::UserStore(Box::new(err)))?
        .ok_or_else(|| AggregateError::UnknownAuthor(author_id.clone()))?;

    Ok((author_id, summary))
}
