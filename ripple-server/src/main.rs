use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::feed_service::FeedService;
use data::repositories::postgres::file_repository::PostgresFileRepository;
use data::repositories::postgres::post_repository::PostgresPostRepository;
use data::repositories::postgres::user_repository::PostgresUserRepository;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::jwt::JwtService;
use infrastructure::logging::init_logging;
use infrastructure::notifier::{BroadcastNotifier, PostNotifier};
use infrastructure::settings::Settings;
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let pool = create_pool(&settings.database_url).await?;
    run_migrations(&pool).await?;

    let notifier = Arc::new(BroadcastNotifier::new(settings.notifier_channel_capacity));

    // The real-time delivery collaborator subscribes here; until it is
    // wired up, trace the announcements.
    let mut events = notifier.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            debug!(
                post_id = event.post_id,
                author_id = event.author_id,
                reposter_id = event.reposter_id,
                "post-created announcement"
            );
        }
    });

    let feed_service = Arc::new(FeedService::new(
        PostgresPostRepository::new(pool.clone()),
        PostgresUserRepository::new(pool.clone()),
        PostgresFileRepository::new(pool),
        notifier as Arc<dyn PostNotifier>,
    ));
    let jwt = Arc::new(JwtService::new(&settings.jwt_secret));

    let state = AppState::new(feed_service, jwt);
    server::run_http(&settings, state).await
}
