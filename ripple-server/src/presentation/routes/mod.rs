use axum::Router;

use super::AppState;

pub(crate) mod feed;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new().nest("/api", feed::router(state))
}
