pub mod auth;
pub mod chat;
pub mod documents;
pub mod errors;
pub mod users;

pub use auth::*;
pub use chat::*;
pub use documents::*;
pub use errors::*;
pub use users::*;
