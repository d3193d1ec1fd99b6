//! JSON-file-backed document store.
//!
//! Each record type is a separate collection persisted as one JSON file under
//! the data directory (`users.json`, `appointments.json`, ...). Collections
//! are loaded into memory at startup and written through on every mutation.
//!
//! A single `RwLock` per collection serialises writers. Mutations that need a
//! point-in-time precondition (the booking conflict check) run the check and
//! the insert under one write guard via [`Collection::insert_unless`], so no
//! second writer can slip between them.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{
    Appointment, Doctor, Medicine, Message, Patient, Prescription, User,
};
use crate::{ClinicError, ClinicResult};

/// A record that lives in a named collection.
pub trait Document: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;

    fn id(&self) -> Uuid;
}

/// One collection of documents, keyed by id.
pub struct Collection<T: Document> {
    path: PathBuf,
    records: RwLock<HashMap<Uuid, T>>,
}

impl<T: Document> Collection<T> {
    /// Opens the collection, loading the backing file if it exists.
    fn open(data_dir: &Path) -> ClinicResult<Self> {
        let path = data_dir.join(format!("{}.json", T::COLLECTION));

        let mut records = HashMap::new();
        if path.is_file() {
            let raw = fs::read_to_string(&path).map_err(ClinicError::FileRead)?;
            let docs: Vec<T> =
                serde_json::from_str(&raw).map_err(ClinicError::Deserialization)?;
            for doc in docs {
                records.insert(doc.id(), doc);
            }
        }

        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    fn read_guard(&self) -> ClinicResult<RwLockReadGuard<'_, HashMap<Uuid, T>>> {
        self.records.read().map_err(|_| ClinicError::LockPoisoned)
    }

    fn write_guard(&self) -> ClinicResult<RwLockWriteGuard<'_, HashMap<Uuid, T>>> {
        self.records.write().map_err(|_| ClinicError::LockPoisoned)
    }

    /// Writes the full collection back to its file. Called with the write
    /// guard held so persisted state always matches in-memory state.
    fn persist(&self, records: &HashMap<Uuid, T>) -> ClinicResult<()> {
        let mut docs: Vec<&T> = records.values().collect();
        docs.sort_by_key(|d| d.id());
        let raw = serde_json::to_string_pretty(&docs).map_err(ClinicError::Serialization)?;
        fs::write(&self.path, raw).map_err(ClinicError::FileWrite)
    }

    pub fn insert(&self, doc: T) -> ClinicResult<()> {
        let mut records = self.write_guard()?;
        records.insert(doc.id(), doc);
        self.persist(&records)
    }

    /// Inserts `doc` unless any existing document matches `conflict`.
    ///
    /// The conflict scan and the insert happen under a single write guard, so
    /// two concurrent callers cannot both pass the check. Returns `true` if
    /// the document was inserted, `false` if a conflicting document exists.
    pub fn insert_unless<F>(&self, doc: T, conflict: F) -> ClinicResult<bool>
    where
        F: Fn(&T) -> bool,
    {
        let mut records = self.write_guard()?;
        if records.values().any(conflict) {
            return Ok(false);
        }
        records.insert(doc.id(), doc);
        self.persist(&records)?;
        Ok(true)
    }

    pub fn get(&self, id: Uuid) -> ClinicResult<Option<T>> {
        Ok(self.read_guard()?.get(&id).cloned())
    }

    pub fn find<F>(&self, pred: F) -> ClinicResult<Vec<T>>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self
            .read_guard()?
            .values()
            .filter(|doc| pred(doc))
            .cloned()
            .collect())
    }

    pub fn find_one<F>(&self, pred: F) -> ClinicResult<Option<T>>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self.read_guard()?.values().find(|doc| pred(doc)).cloned())
    }

    pub fn count<F>(&self, pred: F) -> ClinicResult<u64>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self.read_guard()?.values().filter(|doc| pred(doc)).count() as u64)
    }

    pub fn len(&self) -> ClinicResult<u64> {
        Ok(self.read_guard()?.len() as u64)
    }

    pub fn is_empty(&self) -> ClinicResult<bool> {
        Ok(self.read_guard()?.is_empty())
    }

    /// Applies `mutate` to the document with the given id, if present, and
    /// persists. Returns the updated document.
    pub fn update<F>(&self, id: Uuid, mutate: F) -> ClinicResult<Option<T>>
    where
        F: FnOnce(&mut T),
    {
        let mut records = self.write_guard()?;
        let updated = match records.get_mut(&id) {
            Some(doc) => {
                mutate(doc);
                Some(doc.clone())
            }
            None => None,
        };
        if updated.is_some() {
            self.persist(&records)?;
        }
        Ok(updated)
    }

    /// Applies `mutate` to every document matching `pred`. Returns how many
    /// documents were touched.
    pub fn update_where<P, F>(&self, pred: P, mut mutate: F) -> ClinicResult<u64>
    where
        P: Fn(&T) -> bool,
        F: FnMut(&mut T),
    {
        let mut records = self.write_guard()?;
        let mut touched = 0;
        for doc in records.values_mut().filter(|doc| pred(doc)) {
            mutate(doc);
            touched += 1;
        }
        if touched > 0 {
            self.persist(&records)?;
        }
        Ok(touched)
    }

    /// Removes the document with the given id. Returns `true` if it existed.
    pub fn remove(&self, id: Uuid) -> ClinicResult<bool> {
        let mut records = self.write_guard()?;
        let existed = records.remove(&id).is_some();
        if existed {
            self.persist(&records)?;
        }
        Ok(existed)
    }
}

/// The full document store: one collection per record type.
pub struct Store {
    pub users: Collection<User>,
    pub doctors: Collection<Doctor>,
    pub patients: Collection<Patient>,
    pub appointments: Collection<Appointment>,
    pub prescriptions: Collection<Prescription>,
    pub medicines: Collection<Medicine>,
    pub messages: Collection<Message>,
}

impl Store {
    /// Opens (or creates) the store under `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created or any
    /// collection file is unreadable or malformed.
    pub fn open(data_dir: &Path) -> ClinicResult<Self> {
        fs::create_dir_all(data_dir).map_err(ClinicError::StorageDirCreation)?;

        Ok(Self {
            users: Collection::open(data_dir)?,
            doctors: Collection::open(data_dir)?,
            patients: Collection::open(data_dir)?,
            appointments: Collection::open(data_dir)?,
            prescriptions: Collection::open(data_dir)?,
            medicines: Collection::open(data_dir)?,
            messages: Collection::open(data_dir)?,
        })
    }
}
