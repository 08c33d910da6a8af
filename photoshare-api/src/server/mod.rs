use crate::aggregator::{AggregateError, PhotoAggregator};
use axum::{
    Router,
    extract::{FromRef, Request, rejection::PathRejection},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use json::Json;
use photoshare_common::store::{PhotoStore, UserStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::error;

mod json;
mod routes;

pub type ServerRouter<S> = Router<ServerState<S>>;

#[derive(Debug)]
pub struct ServerState<S> {
    pub aggregator: Arc<PhotoAggregator<S>>,
}

impl<S> Clone for ServerState<S> {
    fn clone(&self) -> Self {
        Self {
            aggregator: Arc::clone(&self.aggregator),
        }
    }
}

impl<S> FromRef<ServerState<S>> for Arc<PhotoAggregator<S>> {
    fn from_ref(state: &ServerState<S>) -> Self {
        Arc::clone(&state.aggregator)
    }
}

pub fn routes<S>() -> ServerRouter<S>
where
    S: PhotoStore + UserStore + 'static,
{
    routes::routes().fallback(fallback)
}

/// The complete application, ready to be served.
pub fn app<S>(aggregator: PhotoAggregator<S>) -> Router
where
    S: PhotoStore + UserStore + 'static,
{
    routes()
        .layer(TraceLayer::new_for_http())
        .with_state(ServerState {
            aggregator: Arc::new(aggregator),
        })
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_) | ServerError::PathRejection(_) => StatusCode::NOT_FOUND,
            ServerError::Aggregate(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            ServerError::Aggregate(AggregateError::TimedOut(_)) => StatusCode::GATEWAY_TIMEOUT,
            ServerError::JsonResponse(_) | ServerError::Aggregate(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message sent to the client. Internal failures are only detailed in the log.
    #[must_use]
    pub fn public_message(&self) -> String {
        if self.status() == StatusCode::INTERNAL_SERVER_ERROR {
            INTERNAL_ERROR_MESSAGE.to_owned()
        } else {
            self.to_string()
        }
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        error!(error = %self, %status, "Replying with error");

        let error_response = ErrorResponse {
            status: status.as_u16(),
            message: self.public_message(),
        };
        (status, Json(error_response)).into_response()
    }
}
