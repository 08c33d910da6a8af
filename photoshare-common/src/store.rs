//! Read capabilities the photo aggregation depends on.

use crate::model::{
    Id,
    photo::Photo,
    user::{UserMarker, UserSummary},
};

pub trait PhotoStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// All photos owned by `user_id`, in store order, comments included.
    fn find_photos_by_user(
        &self,
        user_id: &Id<UserMarker>,
    ) -> impl Future<Output = Result<Vec<Photo>, Self::Error>> + Send;
}

pub trait UserStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// `None` if no such user exists.
    fn find_user_summary(
        &self,
        user_id: &Id<UserMarker>,
    ) -> impl Future<Output = Result<Option<UserSummary>, Self::Error>> + Send;
}
