use crate::record::{CommentRecord, PhotoRecord, UserSummaryRecord, assemble_photos};
use photoshare_common::{
    model::{
        Id,
        photo::Photo,
        user::{UserMarker, UserSummary},
    },
    store::{PhotoStore, UserStore},
};
use sqlx::{PgPool, migrate::MigrateError, postgres::PgPoolOptions, query_as};
use thiserror::Error;
use tracing::debug;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("Running migrations failed: {0}")]
    Migrate(#[from] MigrateError),
}

#[derive(Clone, Debug)]
pub struct DbClient {
    pool: PgPool,
}

impl DbClient {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub async fn fetch_user_summary(
        &self,
        user_id: &Id<UserMarker>,
    ) -> Result<Option<UserSummary>> {
        let record = query_as::<_, UserSummaryRecord>(
            "
            SELECT
                users.user_id,
                users.first_name,
                users.last_name
            FROM
                users.users
            WHERE
                users.user_id = $1
            ",
        )
        .bind(user_id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(UserSummary::from))
    }

    pub async fn fetch_user_photos(&self, user_id: &Id<UserMarker>) -> Result<Vec<Photo>> {
        let photo_records = query_as::<_, PhotoRecord>(
            "
            SELECT
                photos.photo_id,
                photos.user_id,
                photos.file_name,
                photos.date_time,
                photos.version
            FROM
                photos.photos
            WHERE
                photos.user_id = $1
            ORDER BY
                photos.date_time, photos.photo_id
            ",
        )
        .bind(user_id.get())
        .fetch_all(&self.pool)
        .await?;

        if photo_records.is_empty() {
            return Ok(Vec::new());
        }

        let photo_ids: Vec<&str> = photo_records
            .iter()
            .map(|record| record.photo_id.as_str())
            .collect();

        let comment_records = query_as::<_, CommentRecord>(
            "
            SELECT
                comments.comment_id,
                comments.photo_id,
                comments.user_id,
                comments.comment,
                comments.date_time
            FROM
                photos.comments
            WHERE
                comments.photo_id = ANY($1)
            ORDER BY
                comments.photo_id, comments.position
            ",
        )
        .bind(photo_ids)
        .fetch_all(&self.pool)
        .await?;

        debug!(
            photos = photo_records.len(),
            comments = comment_records.len(),
            "Loaded photos of user"
        );

        Ok(assemble_photos(photo_records, comment_records))
    }
}

impl PhotoStore for DbClient {
    type Error = DbError;

    fn find_photos_by_user(
        &self,
        user_id: &Id<UserMarker>,
    ) -> impl Future<Output = Result<Vec<Photo>>> + Send {
        self.fetch_user_photos(user_id)
    }
}

impl UserStore for DbClient {
    type Error = DbError;

    fn find_user_summary(
        &self,
        user_id: &Id<UserMarker>,
    ) -> impl Future<Output = Result<Option<UserSummary>>> + Send {
        self.fetch_user_summary(user_id)
    }
}
