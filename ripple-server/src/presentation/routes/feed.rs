use axum::Router;
use axum::middleware;
use axum::routing::{get, post};

use crate::presentation::AppState;
use crate::presentation::handlers::feed::{
    create_post, delete_post, get_post, like_post, list_feed, repost_post, unlike_post,
    unrepost_post,
};
use crate::presentation::middleware::auth::{jwt_auth_middleware, optional_jwt_auth_middleware};

pub(crate) fn router(state: AppState) -> Router<AppState> {
    // The feed serves anonymous viewers, but a presented token still has
    // to be valid.
    let feed = Router::new().route("/feed", get(list_feed)).layer(
        middleware::from_fn_with_state(state.clone(), optional_jwt_auth_middleware),
    );

    let public = Router::new().route("/posts/{id}", get(get_post));

    let protected = Router::new()
        .route("/posts", post(create_post))
        .route("/posts/{id}", axum::routing::delete(delete_post))
        .route("/posts/{id}/like", post(like_post).delete(unlike_post))
        .route("/posts/{id}/repost", post(repost_post).delete(unrepost_post))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    feed.merge(public).merge(protected)
}
