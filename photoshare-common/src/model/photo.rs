use crate::model::{
    Id,
    user::{UserMarker, UserSummary},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PhotoMarker;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct CommentMarker;

/// A photo as kept by the photo store.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Photo {
    pub id: Id<PhotoMarker>,
    pub user_id: Id<UserMarker>,
    pub file_name: String,
    pub date_time: OffsetDateTime,
    /// Bumped by the store whenever a comment is appended. Never leaves the server.
    pub version: i32,
    /// In display order.
    pub comments: Vec<Comment>,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Comment {
    pub id: Id<CommentMarker>,
    pub comment: String,
    pub date_time: OffsetDateTime,
    pub user_id: Id<UserMarker>,
}

/// A photo whose comments carry their author's public identity.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize, Deserialize)]
pub struct AggregatedPhoto {
    pub id: Id<PhotoMarker>,
    pub user_id: Id<UserMarker>,
    pub file_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date_time: OffsetDateTime,
    pub comments: Vec<AggregatedComment>,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize, Deserialize)]
pub struct AggregatedComment {
    pub id: Id<CommentMarker>,
    pub comment: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date_time: OffsetDateTime,
    pub user: UserSummary,
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("No author summary was provided for user {0}")]
pub struct MissingAuthorError(pub Id<UserMarker>);

impl Photo {
    /// Ids of all comment authors, in comment order and possibly repeated.
    pub fn author_ids(&self) -> impl Iterator<Item = &Id<UserMarker>> {
        self.comments.iter().map(|comment| &comment.user_id)
    }

    /// Builds the outgoing form of this photo, embedding each comment's author from `authors`.
    pub fn with_authors(
        &self,
        authors: &HashMap<Id<UserMarker>, UserSummary>,
    ) -> Result<AggregatedPhoto, MissingAuthorError> {
        let comments = self
            .comments
            .iter()
            .map(|comment| comment.with_author(authors))
            .collect::<Result<_, _>>()?;

        Ok(AggregatedPhoto {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            file_name: self.file_name.clone(),
            date_time: self.date_time,
            comments,
        })
    }
}

impl Comment {
    pub fn with_author(
        &self,
        authors: &HashMap<Id<UserMarker>, UserSummary>,
    ) -> Result<AggregatedComment, MissingAuthorError> {
        let user = authors
            .get(&self.user_id)
            .ok_or_else(|| MissingAuthorError(self.user_id.clone()))?
            .clone();

        Ok(AggregatedComment {
            id: self.id.clone(),
            comment: self.comment.clone(),
            date_time: self.date_time,
            user,
        })
    }
}
