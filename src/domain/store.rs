use super::{Contact, ContactDraft, Credential};
use crate::{
    api::{ApiClient, ApiError, SaveReply},
    cancel::CancelToken,
    errors::AppError,
};
use tracing::debug;

/// Local copy of the contact listing for the current session.
///
/// The cache only changes after the server has confirmed a call, and then
/// only to what the server returned. Order is insertion order: a listing
/// replaces it wholesale, a create appends. A save the server acknowledges
/// without echoing the record is followed by a fresh listing.
#[derive(Debug, Default)]
pub struct ContactStore {
    contacts: Vec<Contact>,
    last_error: Option<String>,
}

impl ContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn get(&self, id: &str) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Message of the most recent failed call, until a call succeeds.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear(&mut self) {
        self.contacts.clear();
        self.last_error = None;
    }

    pub fn list(
        &mut self,
        api: &ApiClient,
        credential: &Credential,
        cancel: &CancelToken,
    ) -> Result<(), AppError> {
        let fetched = api.list_contacts(credential);
        let contacts = self.settle(fetched, cancel, AppError::FetchFailed)?;

        debug!(count = contacts.len(), "contact list replaced");
        self.contacts = contacts;
        Ok(())
    }

    pub fn create(
        &mut self,
        api: &ApiClient,
        credential: &Credential,
        draft: &ContactDraft,
        cancel: &CancelToken,
    ) -> Result<Contact, AppError> {
        let reply = api.create_contact(credential, draft);
        let known: Vec<String> = self.contacts.iter().map(|c| c.id.clone()).collect();

        let created = match self.settle(reply, cancel, AppError::SaveFailed)? {
            SaveReply::Stored(created) => {
                self.contacts.push(created.clone());
                created
            }
            SaveReply::Acknowledged(message) => {
                debug!(%message, "create acknowledged without a record, reloading");
                self.list(api, credential, cancel)?;
                let listed = created_record(&self.contacts, &known, draft).cloned();
                let Some(created) = listed else {
                    return Err(self.unconfirmed("new contact is missing from the listing"));
                };
                created
            }
        };

        debug!(id = %created.id, "contact created");
        Ok(created)
    }

    pub fn update(
        &mut self,
        api: &ApiClient,
        credential: &Credential,
        id: &str,
        draft: &ContactDraft,
        cancel: &CancelToken,
    ) -> Result<Contact, AppError> {
        let reply = api.update_contact(credential, id, draft);

        let updated = match self.settle(reply, cancel, AppError::SaveFailed)? {
            SaveReply::Stored(updated) => {
                match self.contacts.iter_mut().find(|c| c.id == id) {
                    Some(cached) => *cached = updated.clone(),
                    None => self.contacts.push(updated.clone()),
                }
                updated
            }
            SaveReply::Acknowledged(message) => {
                debug!(id, %message, "update acknowledged without a record, reloading");
                self.list(api, credential, cancel)?;
                let listed = self.get(id).cloned();
                let Some(updated) = listed else {
                    return Err(self.unconfirmed("updated contact is missing from the listing"));
                };
                updated
            }
        };

        debug!(id = %updated.id, "contact updated");
        Ok(updated)
    }

    pub fn delete(
        &mut self,
        api: &ApiClient,
        credential: &Credential,
        id: &str,
        cancel: &CancelToken,
    ) -> Result<(), AppError> {
        let deleted = api.delete_contact(credential, id);
        self.settle(deleted, cancel, AppError::DeleteFailed)?;

        debug!(id, "contact deleted");
        self.contacts.retain(|c| c.id != id);
        Ok(())
    }

    fn unconfirmed(&mut self, message: &str) -> AppError {
        let err = AppError::SaveFailed(message.to_string());
        self.last_error = Some(err.to_string());
        err
    }

    /// Decide what a finished call means for the cache. A rejected
    /// credential always wins, even over cancellation; a cancelled
    /// interaction never gets its result applied.
    fn settle<T>(
        &mut self,
        result: Result<T, ApiError>,
        cancel: &CancelToken,
        failed: fn(String) -> AppError,
    ) -> Result<T, AppError> {
        match result {
            Err(ApiError::Unauthorized) => Err(AppError::SessionExpired),
            _ if cancel.is_cancelled() => {
                debug!("interaction cancelled, discarding response");
                Err(AppError::Cancelled)
            }
            Ok(value) => {
                self.last_error = None;
                Ok(value)
            }
            Err(e) => {
                let err = failed(e.to_string());
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }
}

/// The record a create produced, picked from a fresh listing: a contact that
/// was not cached before and holds what was submitted. A lone new contact
/// is taken even if the server rewrote some of its fields.
fn created_record<'a>(
    listed: &'a [Contact],
    known: &[String],
    draft: &ContactDraft,
) -> Option<&'a Contact> {
    let submitted = draft.clone().normalized();
    let fresh: Vec<&Contact> = listed.iter().filter(|c| !known.contains(&c.id)).collect();

    match fresh.iter().rev().find(|c| c.draft() == submitted) {
        Some(found) => Some(*found),
        None if fresh.len() == 1 => Some(fresh[0]),
        None => None,
    }
}
