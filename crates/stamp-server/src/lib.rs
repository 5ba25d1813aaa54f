pub mod handlers;
pub mod server;
pub mod session;

pub use server::{start, AppState, ServerConfig, ServerHandle};
pub use session::{SessionId, SessionRegistry};
