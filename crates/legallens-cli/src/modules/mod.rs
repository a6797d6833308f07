pub(crate) mod auth;
pub(crate) mod chat;
pub(crate) mod documents;
pub(crate) mod system;
