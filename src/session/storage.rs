use crate::{domain::Credential, errors::AppError};
use std::{
    cell::RefCell,
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

/// Where the live credential is kept between invocations.
pub trait SessionStore {
    fn load(&self) -> Result<Option<Credential>, AppError>;

    fn save(&self, credential: &Credential) -> Result<(), AppError>;

    /// Removing state that is already gone is not an error.
    fn clear(&self) -> Result<(), AppError>;

    fn get_medium(&self) -> &str;
}

/// One JSON record on disk, readable only by its owner.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Credential>, AppError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        // Undecodable bytes are a malformed record, same as bad JSON.
        Ok(Some(serde_json::from_slice(&data)?))
    }

    fn save(&self, credential: &Credential) -> Result<(), AppError> {
        create_file_parent(&self.path)?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path)?;
        file.write_all(&serde_json::to_vec(credential)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn get_medium(&self) -> &str {
        "file"
    }
}

/// Process-local slot; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: RefCell<Option<Credential>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: RefCell::new(Some(credential)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Credential>, AppError> {
        Ok(self.slot.borrow().clone())
    }

    fn save(&self, credential: &Credential) -> Result<(), AppError> {
        *self.slot.borrow_mut() = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        self.slot.borrow_mut().take();
        Ok(())
    }

    fn get_medium(&self) -> &str {
        "memory"
    }
}

pub fn create_file_parent(path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
