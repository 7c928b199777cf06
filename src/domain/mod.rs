pub mod contact;
pub mod credential;
pub mod store;

pub use contact::{Contact, ContactDraft};
pub use credential::Credential;
pub use store::ContactStore;
