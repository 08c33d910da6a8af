use photoshare_common::model::{
    photo::{Comment, Photo},
    user::UserSummary,
};
use sqlx::FromRow;
use std::collections::HashMap;
use time::OffsetDateTime;

#[derive(Clone, Eq, PartialEq, Debug, FromRow)]
pub(crate) struct UserSummaryRecord {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Clone, Eq, PartialEq, Debug, FromRow)]
pub(crate) struct PhotoRecord {
    pub photo_id: String,
    pub user_id: String,
    pub file_name: String,
    pub date_time: OffsetDateTime,
    pub version: i32,
}

#[derive(Clone, Eq, PartialEq, Debug, FromRow)]
pub(crate) struct CommentRecord {
    pub comment_id: String,
    pub photo_id: String,
    pub user_id: String,
    pub comment: String,
    pub date_time: OffsetDateTime,
}

impl From<UserSummaryRecord> for UserSummary {
    fn from(value: UserSummaryRecord) -> Self {
        Self {
            id: value.user_id.into(),
            first_name: value.first_name.into(),
            last_name: value.last_name.into(),
        }
    }
}

impl From<CommentRecord> for Comment {
    fn from(value: CommentRecord) -> Self {
        Self {
            id: value.comment_id.into(),
            comment: value.comment,
            date_time: value.date_time,
            user_id: value.user_id.into(),
        }
    }
}

/// Attaches `comments` to their photos.
///
/// Photo order is kept as given, and each photo's comments keep the order they
/// appear in `comments`. Comments of photos not in `photos` are dropped.
pub(crate) fn assemble_photos(
    photos: Vec<PhotoRecord>,
    comments: Vec<CommentRecord>,
) -> Vec<Photo> {
    let mut comments_by_photo: HashMap<String, Vec<Comment>> = HashMap::new();
    for record in comments {
        comments_by_photo
            .entry(record.photo_id.clone())
            .or_default()
            .push(record.into());
    }

    photos
        .into_iter()
        .map(|record| Photo {
            comments: comments_by_photo.remove(&record.photo_id).unwrap_or_default(),
            id: record.photo_id.into(),
            user_id: record.user_id.into(),
            file_name: record.file_name,
            date_time: record.date_time,
            version: record.version,
        })
        .collect()
}
