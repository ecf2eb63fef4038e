// ABOUTME: Application-level modules
// Configuration, session state, and the run coordinator

pub mod config;
pub mod coordinator;
pub mod session;

pub use config::AppConfig;
pub use coordinator::{Answer, CancelToken, RunCoordinator, TurnRequest};
pub use session::{Role, Session, SessionStore, Turn};
