pub(crate) mod assembly;
pub(crate) mod feed_service;
