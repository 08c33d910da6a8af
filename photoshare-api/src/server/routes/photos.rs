use crate::{
    aggregator::PhotoAggregator,
    server::{Result, ServerError, ServerRouter, json::Json},
};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use photoshare_common::{
    model::{Id, photo::AggregatedPhoto, user::UserMarker},
    store::{PhotoStore, UserStore},
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes<S>() -> ServerRouter<S>
where
    S: PhotoStore + UserStore + 'static,
{
    ServerRouter::new().typed_get(get_photos_of_user::<S>)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/photosOfUser/{id}", rejection(ServerError))]
struct PhotosOfUserPath {
    id: Id<UserMarker>,
}

async fn get_photos_of_user<S>(
    PhotosOfUserPath { id }: PhotosOfUserPath,
    State(aggregator): State<Arc<PhotoAggregator<S>>>,
) -> Result<Json<Vec<AggregatedPhoto>>>
where
    S: PhotoStore + UserStore + 'static,
{
    let photos = aggregator.fetch_photos_with_authors(&id).await?;

    Ok(Json(photos))
}
