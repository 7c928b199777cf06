use crate::{
    api::ApiClient,
    cancel::CancelToken,
    config::Config,
    domain::{Contact, ContactDraft, ContactStore},
    errors::AppError,
    session::{FileSessionStore, Restore, SessionManager, SessionState, SessionStore},
};
use tracing::{info, warn};

/// Which screen the client should be showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Contacts,
}

/// The session manager and contact store wired together.
///
/// All contact operations go through here so that a rejected credential,
/// wherever it shows up, tears the whole session down the same way.
pub struct App {
    api: ApiClient,
    session: SessionManager,
    contacts: ContactStore,
    view: View,
}

impl App {
    pub fn new(api: ApiClient, session: SessionManager) -> Self {
        Self {
            api,
            session,
            contacts: ContactStore::new(),
            view: View::Login,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::with_store(config, Box::new(FileSessionStore::new(&config.session_file)))
    }

    pub fn with_store(config: &Config, store: Box<dyn SessionStore>) -> Result<Self, AppError> {
        let api = ApiClient::new(&config.api_url, config.request_timeout)?;
        Ok(Self::new(api, SessionManager::new(store, config.session_ttl)))
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn contacts(&self) -> &ContactStore {
        &self.contacts
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Runs once when the client starts and decides the initial view.
    pub fn start(&mut self) -> Result<Restore, AppError> {
        let restored = self.session.restore_on_startup()?;
        self.view = match restored.state() {
            SessionState::Authenticated => View::Contacts,
            SessionState::Unauthenticated => View::Login,
        };
        Ok(restored)
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<(), AppError> {
        // Nothing cached under a previous identity may survive a new login.
        self.contacts.clear();

        match self.session.login(&self.api, username, password) {
            Ok(()) => {
                self.view = View::Contacts;
                Ok(())
            }
            Err(e) => {
                self.view = View::Login;
                Err(e)
            }
        }
    }

    pub fn logout(&mut self) -> Result<(), AppError> {
        self.contacts.clear();
        self.view = View::Login;
        self.session.logout()
    }

    pub fn refresh(&mut self, cancel: &CancelToken) -> Result<&[Contact], AppError> {
        let result = match self.session.credential() {
            Some(credential) => self.contacts.list(&self.api, credential, cancel),
            None => Err(AppError::NotAuthenticated),
        };
        self.intercept(result)?;

        Ok(self.contacts.contacts())
    }

    pub fn create_contact(
        &mut self,
        draft: &ContactDraft,
        cancel: &CancelToken,
    ) -> Result<Contact, AppError> {
        let result = match self.session.credential() {
            Some(credential) => self.contacts.create(&self.api, credential, draft, cancel),
            None => Err(AppError::NotAuthenticated),
        };
        self.intercept(result)
    }

    pub fn update_contact(
        &mut self,
        id: &str,
        draft: &ContactDraft,
        cancel: &CancelToken,
    ) -> Result<Contact, AppError> {
        let result = match self.session.credential() {
            Some(credential) => self.contacts.update(&self.api, credential, id, draft, cancel),
            None => Err(AppError::NotAuthenticated),
        };
        self.intercept(result)
    }

    /// Deletes without asking; confirming with the user is the caller's job.
    pub fn delete_contact(&mut self, id: &str, cancel: &CancelToken) -> Result<(), AppError> {
        let result = match self.session.credential() {
            Some(credential) => self.contacts.delete(&self.api, credential, id, cancel),
            None => Err(AppError::NotAuthenticated),
        };
        self.intercept(result)
    }

    fn intercept<T>(&mut self, result: Result<T, AppError>) -> Result<T, AppError> {
        if let Err(e) = &result
            && e.is_session_loss()
        {
            self.teardown(e);
        }
        result
    }

    fn teardown(&mut self, cause: &AppError) {
        match cause {
            AppError::SessionExpired => warn!("server rejected the session, returning to login"),
            _ => info!("no live session, returning to login"),
        }
        self.session.invalidate();
        self.contacts.clear();
        self.view = View::Login;
    }
}
