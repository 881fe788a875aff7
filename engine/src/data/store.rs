// Caches loaded datasets per source file, re-parsing only when the file changes.
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::config::DashboardSchema;
use crate::data::dataset::{source_stamp, Dataset};
use crate::error::LoadError;

pub struct DatasetStore {
    schema: Arc<DashboardSchema>,
    data: HashMap<PathBuf, Arc<Dataset>>,
}

impl DatasetStore {
    pub fn new(schema: Arc<DashboardSchema>) -> Self {
        DatasetStore {
            schema,
            data: HashMap::new(),
        }
    }

    /// Returns the cached dataset while path, modification time and size match.
    /// A failed load evicts the entry so stale data is never served.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<Dataset>, LoadError> {
        let stamp = match source_stamp(path) {
            Ok(stamp) => stamp,
            Err(e) => {
                self.data.remove(path);
                return Err(e);
            }
        };

        if let Some(cached) = self.data.get(path) {
            if cached.stamp() == Some(&stamp) {
                debug!(path = %path.display(), "Dataset cache hit");
                return Ok(Arc::clone(cached));
            }
        }

        match Dataset::load(path, Arc::clone(&self.schema)) {
            Ok(dataset) => {
                let dataset = Arc::new(dataset);
                self.data.insert(path.to_path_buf(), Arc::clone(&dataset));
                Ok(dataset)
            }
            Err(e) => {
                self.data.remove(path);
                Err(e)
            }
        }
    }

    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.data.remove(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::NamedTempFile;

    const HEADER: &str = "ENTE;STATUS;TOTAL A SER APORTADO;VALOR APORTADO;DÍVIDA EM MORA / RCL";

    fn store() -> DatasetStore {
        DatasetStore::new(Arc::new(DashboardSchema::load_default().unwrap()))
    }

    #[test]
    fn test_cache_hit_returns_same_dataset() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), format!("{}\nRecife;A;1,00;1,00;1,00\nTOTAL;;1,00;1,00;\n", HEADER)).unwrap();

        let mut store = store();
        let first = store.get_or_load(file.path()).unwrap();
        let second = store.get_or_load(file.path()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_changed_file_is_reloaded() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), format!("{}\nRecife;A;1,00;1,00;1,00\nTOTAL;;1,00;1,00;\n", HEADER)).unwrap();

        let mut store = store();
        let first = store.get_or_load(file.path()).unwrap();
        assert_eq!(first.len(), 1);

        fs::write(
            file.path(),
            format!("{}\nRecife;A;1,00;1,00;1,00\nOlinda;B;2,00;2,00;2,00\nTOTAL;;3,00;3,00;\n", HEADER),
        )
        .unwrap();
        let second = store.get_or_load(file.path()).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn test_failed_reload_evicts_entry() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), format!("{}\nRecife;A;1,00;1,00;1,00\nTOTAL;;1,00;1,00;\n", HEADER)).unwrap();

        let mut store = store();
        store.get_or_load(file.path()).unwrap();

        fs::write(file.path(), "ENTE;STATUS\nRecife;A\nTOTAL;\n").unwrap();
        let err = store.get_or_load(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumns { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_invalidate() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), format!("{}\nRecife;A;1,00;1,00;1,00\nTOTAL;;1,00;1,00;\n", HEADER)).unwrap();

        let mut store = store();
        store.get_or_load(file.path()).unwrap();
        assert!(store.invalidate(file.path()));
        assert!(!store.invalidate(file.path()));
    }
}
