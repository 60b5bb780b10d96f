pub(crate) mod cursor;
pub(crate) mod error;
pub(crate) mod file;
pub(crate) mod post;
pub(crate) mod timeline;
pub(crate) mod user;
