use std::sync::Arc;

use crate::application::feed_service::FeedService;
use crate::data::repositories::postgres::file_repository::PostgresFileRepository;
use crate::data::repositories::postgres::post_repository::PostgresPostRepository;
use crate::data::repositories::postgres::user_repository::PostgresUserRepository;
use crate::infrastructure::jwt::JwtService;

pub(crate) mod app_error;
pub(crate) mod handlers;
pub(crate) mod http_handlers;
pub(crate) mod middleware;
pub(crate) mod openapi;
pub(crate) mod routes;

pub(crate) type PostgresFeedService =
    FeedService<PostgresPostRepository, PostgresUserRepository, PostgresFileRepository>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) feed_service: Arc<PostgresFeedService>,
    pub(crate) jwt: Arc<JwtService>,
}

impl AppState {
    pub(crate) fn new(feed_service: Arc<PostgresFeedService>, jwt: Arc<JwtService>) -> Self {
        Self { feed_service, jwt }
    }
}
