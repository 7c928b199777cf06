pub use crate::api::{ApiClient, ApiError, HealthReport, SaveReply};
pub use crate::app::{App, View};
pub use crate::cancel::{CancelOnDrop, CancelToken};
pub use crate::cli::{command, run_app};
pub use crate::config::Config;
pub use crate::domain::{Contact, ContactDraft, ContactStore, Credential};
pub use crate::errors::AppError;
pub use crate::session::{
    FileSessionStore, MemorySessionStore, Restore, SessionManager, SessionState, SessionStore,
};
