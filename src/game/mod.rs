//! Game sessions and the reconnect loop.

pub mod manager;
pub mod session;

pub use manager::SessionManager;
pub use session::{SessionContext, SessionSettings};
