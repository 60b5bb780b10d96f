use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::handlers::feed::{
    CreatePostDto, DeletedDto, EventKindDto, FeedEdgeDto, FeedPageDto, FeedQuery, FileDto, OkDto,
    PageInfoDto, PostDto, UserDto,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::handlers::feed::list_feed,
        crate::presentation::handlers::feed::get_post,
        crate::presentation::handlers::feed::create_post,
        crate::presentation::handlers::feed::delete_post,
        crate::presentation::handlers::feed::like_post,
        crate::presentation::handlers::feed::unlike_post,
        crate::presentation::handlers::feed::repost_post,
        crate::presentation::handlers::feed::unrepost_post
    ),
    components(
        schemas(
            FeedQuery,
            CreatePostDto,
            UserDto,
            FileDto,
            EventKindDto,
            FeedEdgeDto,
            PageInfoDto,
            FeedPageDto,
            PostDto,
            DeletedDto,
            OkDto
        )
    ),
    tags(
        (name = "feed", description = "Timeline endpoints"),
        (name = "posts", description = "Post endpoints")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}
