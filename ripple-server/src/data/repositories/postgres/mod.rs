pub(crate) mod file_repository;
pub(crate) mod post_repository;
pub(crate) mod user_repository;
