use crate::server::ServerRouter;
use axum::Router;
use photoshare_common::store::{PhotoStore, UserStore};

mod photos;

pub fn routes<S>() -> ServerRouter<S>
where
    S: PhotoStore + UserStore + 'static,
{
    Router::new().merge(photos::routes())
}
