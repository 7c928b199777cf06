pub mod manager;
pub mod storage;

pub use manager::{Restore, SessionManager, SessionState};
pub use storage::{FileSessionStore, MemorySessionStore, SessionStore};
