//! File-based document repository implementation

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use docuhaul_domain::repository::DocumentRepository;
use docuhaul_types::{DocumentKind, Error, GeneratedDocument, Result, StoreError};

/// Stores generated documents in `documents.json`, keyed by document id.
pub struct FileDocumentRepository {
    store_path: PathBuf,
    documents: RefCell<HashMap<String, GeneratedDocument>>,
}

pub(crate) fn load_map<T: serde::de::DeserializeOwned>(path: &Path) -> Result<HashMap<String, T>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|e| {
        StoreError::Corrupted(format!("{}: {}", path.display(), e)).into()
    })
}

pub(crate) fn write_map<T: serde::Serialize>(path: &Path, map: &HashMap<String, T>) -> Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    {
        let file = File::create(&tmp_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, map)?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Apply `change` to a copy of the map and keep the copy only once it is on disk.
pub(crate) fn commit<T, R>(
    path: &Path,
    map: &RefCell<HashMap<String, T>>,
    change: impl FnOnce(&mut HashMap<String, T>) -> R,
) -> Result<R>
where
    T: Clone + serde::Serialize,
{
    let mut next = map.borrow().clone();
    let result = change(&mut next);
    write_map(path, &next)?;
    *map.borrow_mut() = next;
    Ok(result)
}

fn newest_first(mut documents: Vec<GeneratedDocument>) -> Vec<GeneratedDocument> {
    documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    documents
}

impl FileDocumentRepository {
    /// Create or load a document repository
    pub fn open(store_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&store_dir)?;
        let store_path = store_dir.join("documents.json");
        let documents = load_map(&store_path)?;
        tracing::debug!(path = %store_path.display(), count = documents.len(), "Opened document store");

        Ok(Self {
            store_path,
            documents: RefCell::new(documents),
        })
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Remove a document; returns whether it existed
    pub fn remove(&self, id: &str) -> Result<bool> {
        if !self.documents.borrow().contains_key(id) {
            return Ok(false);
        }
        commit(&self.store_path, &self.documents, |documents| {
            documents.remove(id);
        })?;
        Ok(true)
    }

    pub fn count(&self) -> usize {
        self.documents.borrow().len()
    }
}

impl DocumentRepository for FileDocumentRepository {
    fn save(&self, document: &GeneratedDocument) -> std::result::Result<(), Error> {
        commit(&self.store_path, &self.documents, |documents| {
            documents.insert(document.id.clone(), document.clone());
        })
    }

    fn find_by_id(&self, id: &str) -> std::result::Result<Option<GeneratedDocument>, Error> {
        Ok(self.documents.borrow().get(id).cloned())
    }

    fn find_by_owner(&self, owner_id: &str) -> std::result::Result<Vec<GeneratedDocument>, Error> {
        let documents = self
            .documents
            .borrow()
            .values()
            .filter(|d| d.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(newest_first(documents))
    }

    fn find_by_kind(&self, kind: DocumentKind) -> std::result::Result<Vec<GeneratedDocument>, Error> {
        let documents = self
            .documents
            .borrow()
            .values()
            .filter(|d| d.kind == kind)
            .cloned()
            .collect();
        Ok(newest_first(documents))
    }

    fn find_all(&self) -> std::result::Result<Vec<GeneratedDocument>, Error> {
        let documents = self.documents.borrow().values().cloned().collect();
        Ok(newest_first(documents))
    }
}
