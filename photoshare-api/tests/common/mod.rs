#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use http_body_util::BodyExt;
use photoshare_api::aggregator::{AggregatorConfig, PhotoAggregator};
use photoshare_common::{
    model::{
        Id,
        photo::{Comment, Photo},
        user::{Name, UserMarker, UserSummary},
    },
    store::{PhotoStore, UserStore},
};
use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use thiserror::Error;
use time::macros::datetime;
use tokio::sync::Barrier;
use tower::ServiceExt;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Error)]
#[error("The in-memory store was told to fail")]
pub struct MemoryStoreError;

/// Store double backed by plain collections, with knobs for failures and delays.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub photos: Vec<Photo>,
    pub users: HashMap<Id<UserMarker>, UserSummary>,
    pub fail_photos: bool,
    pub failing_users: HashSet<Id<UserMarker>>,
    pub photo_delay: Option<Duration>,
    /// Every user lookup waits here before answering.
    pub lookup_barrier: Option<Arc<Barrier>>,
    pub user_lookups: AtomicUsize,
}

impl PhotoStore for MemoryStore {
    type Error = MemoryStoreError;

    async fn find_photos_by_user(
        &self,
        user_id: &Id<UserMarker>,
    ) -> Result<Vec<Photo>, MemoryStoreError> {
        if let Some(delay) = self.photo_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_photos {
            return Err(MemoryStoreError);
        }

        Ok(self
            .photos
            .iter()
            .filter(|photo| &photo.user_id == user_id)
            .cloned()
            .collect())
    }
}

impl UserStore for MemoryStore {
    type Error = MemoryStoreError;

    async fn find_user_summary(
        &self,
        user_id: &Id<UserMarker>,
    ) -> Result<Option<UserSummary>, MemoryStoreError> {
        self.user_lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(barrier) = &self.lookup_barrier {
            barrier.wait().await;
        }
        if self.failing_users.contains(user_id) {
            return Err(MemoryStoreError);
        }

        Ok(self.users.get(user_id).cloned())
    }
}

pub fn user(id: &str, first_name: &str, last_name: &str) -> UserSummary {
    UserSummary {
        id: id.into(),
        first_name: Name::new(first_name),
        last_name: Name::new(last_name),
    }
}

pub fn comment(id: &str, author: &str, text: &str) -> Comment {
    Comment {
        id: id.into(),
        comment: text.to_owned(),
        date_time: datetime!(2024-05-02 18:00 UTC),
        user_id: author.into(),
    }
}

pub fn photo(id: &str, owner: &str, comments: Vec<Comment>) -> Photo {
    Photo {
        id: id.into(),
        user_id: owner.into(),
        file_name: format!("{id}.jpg"),
        date_time: datetime!(2024-05-01 10:00 UTC),
        version: 7,
        comments,
    }
}

/// `u1` owns `p1` (commented by `u1` and `u2`) and `p2` (no comments).
/// `u3` owns `p3`, commented by two users that do not exist.
/// `u9` exists but owns nothing.
pub fn fixture() -> MemoryStore {
    let users = [
        user("u1", "Ian", "Malcolm"),
        user("u2", "Ellen", "Ripley"),
        user("u3", "Rey", "Kenobi"),
        user("u9", "Peregrin", "Took"),
    ]
    .into_iter()
    .map(|summary| (summary.id.clone(), summary))
    .collect();

    MemoryStore {
        photos: vec![
            photo(
                "p1",
                "u1",
                vec![
                    comment("c1", "u1", "Life finds a way."),
                    comment("c2", "u2", "Get away from her."),
                ],
            ),
            photo(
                "p3",
                "u3",
                vec![
                    comment("c3", "ghost", "Boo."),
                    comment("c4", "phantom", "Boo too."),
                ],
            ),
            photo("p2", "u1", Vec::new()),
        ],
        users,
        ..MemoryStore::default()
    }
}

pub fn aggregator(store: MemoryStore) -> PhotoAggregator<MemoryStore> {
    PhotoAggregator::new(Arc::new(store), AggregatorConfig::default())
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
