//! Resolution of indirect resource references
//!
//! Layout attributes may point into a values file instead of carrying a
//! literal, e.g. `android:text="@+string/greeting"` is looked up as the
//! `<string name="greeting">` entry of `<values dir>/string.xml`.

use crate::parser::xml::{XmlDocument, XmlError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, trace};

/// Marks an attribute value as a resource reference
pub const REFERENCE_PREFIX: &str = "@+";

const ID_PREFIX: &str = "@+id";

/// Errors produced while resolving a resource reference
#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("{0} is an id; ids are neither resolved nor inherited")]
    IdReference(String),
    #[error("Resource {reference} not found")]
    NotFound { reference: String },
    #[error("Failed to load values file: {0}")]
    Xml(#[from] XmlError),
}

/// Entries of one values file, by `name` attribute
#[derive(Debug, Default)]
struct ResourceTable {
    entries: HashMap<String, String>,
}

impl ResourceTable {
    fn from_document(document: &XmlDocument) -> Self {
        let mut entries = HashMap::new();
        if document.root.name != "resources" {
            debug!("Values file root is <{}>, not <resources>", document.root.name);
            return Self { entries };
        }

        for element in document.root.elements() {
            if let Some(name) = element.attr("name") {
                entries.insert(name.to_string(), element.text());
            }
        }

        Self { entries }
    }
}

/// Looks up `@+type/key` references in a set of values directories.
///
/// `@+type/key` is searched in `<type>.xml`, then `<type>s.xml`, of each
/// directory. Each file is parsed at most once per resolver.
#[derive(Debug, Default)]
pub struct ResourceResolver {
    values_dirs: Vec<PathBuf>,
    tables: Mutex<HashMap<PathBuf, Arc<ResourceTable>>>,
}

impl ResourceResolver {
    /// Resolver searching the given directories in order
    pub fn new(values_dirs: Vec<PathBuf>) -> Self {
        Self {
            values_dirs,
            tables: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_dir(values_dir: impl Into<PathBuf>) -> Self {
        Self::new(vec![values_dir.into()])
    }

    /// Resolver without values directories; every reference is missing
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn values_dirs(&self) -> &[PathBuf] {
        &self.values_dirs
    }

    /// Resolve an optional attribute value.
    ///
    /// Absent values stay absent and literals are returned unchanged.
    pub fn resolve(&self, value: Option<&str>) -> Result<Option<String>, ResourceError> {
        value.map(|v| self.resolve_value(v)).transpose()
    }

    /// Resolve a present attribute value
    pub fn resolve_value(&self, value: &str) -> Result<String, ResourceError> {
        if value.starts_with(ID_PREFIX) {
            return Err(ResourceError::IdReference(value.to_string()));
        }

        let Some(reference) = value.strip_prefix(REFERENCE_PREFIX) else {
            return Ok(value.to_string());
        };

        let not_found = || ResourceError::NotFound {
            reference: value.to_string(),
        };

        let (resource_type, key) = reference.split_once('/').ok_or_else(not_found)?;

        // Android names values files in the plural: `@+string/x` lives in strings.xml
        let file_names = [format!("{}.xml", resource_type), format!("{}s.xml", resource_type)];

        for dir in &self.values_dirs {
            for file_name in &file_names {
                let Some(table) = self.table(&dir.join(file_name))? else {
                    continue;
                };
                if let Some(text) = table.entries.get(key) {
                    trace!("Resolved {} to {:?}", value, text);
                    return Ok(text.clone());
                }
            }
        }

        Err(not_found())
    }

    /// Load (or fetch from cache) a values file; `None` if it does not exist
    fn table(&self, path: &Path) -> Result<Option<Arc<ResourceTable>>, ResourceError> {
        {
            let tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(table) = tables.get(path) {
                return Ok(Some(Arc::clone(table)));
            }
        }

        if !path.is_file() {
            return Ok(None);
        }

        // Loaded unlocked; if another worker got here first its table is kept
        let document = XmlDocument::read(path)?;
        let table = Arc::new(ResourceTable::from_document(&document));
        debug!(
            "Loaded {} entries from {}",
            table.entries.len(),
            path.display()
        );

        let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        let table = tables.entry(path.to_path_buf()).or_insert(table);

        Ok(Some(Arc::clone(table)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn values_dir() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("string.xml"),
            r#"<?xml version="1.0" encoding="utf-8"?>
<resources>
    <string name="hello">Hi</string>
    <string name="styled">Press <b>here</b></string>
</resources>"#,
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("colors.xml"),
            r#"<resources><color name="primary">#ff0000</color></resources>"#,
        )
        .unwrap();
        temp_dir
    }

    #[test]
    fn test_resolve_reference() {
        let dir = values_dir();
        let resolver = ResourceResolver::with_dir(dir.path());

        assert_eq!(resolver.resolve_value("@+string/hello").unwrap(), "Hi");
        assert_eq!(resolver.resolve_value("@+color/primary").unwrap(), "#ff0000");
        assert_eq!(resolver.resolve_value("@+string/styled").unwrap(), "Press here");
    }

    #[test]
    fn test_literal_and_absent_pass_through() {
        let dir = values_dir();
        let resolver = ResourceResolver::with_dir(dir.path());

        assert_eq!(resolver.resolve_value("Hi").unwrap(), "Hi");
        assert_eq!(resolver.resolve_value("@string/hello").unwrap(), "@string/hello");
        assert_eq!(resolver.resolve(None).unwrap(), None);
    }

    #[test]
    fn test_id_is_rejected() {
        let resolver = ResourceResolver::detached();
        assert!(matches!(
            resolver.resolve_value("@+id/foo"),
            Err(ResourceError::IdReference(_))
        ));
    }

    #[test]
    fn test_missing_key_file_and_dir() {
        let dir = values_dir();
        let resolver = ResourceResolver::with_dir(dir.path());

        assert!(matches!(
            resolver.resolve_value("@+string/absent"),
            Err(ResourceError::NotFound { .. })
        ));
        assert!(matches!(
            resolver.resolve_value("@+dimen/margin"),
            Err(ResourceError::NotFound { .. })
        ));
        assert!(matches!(
            resolver.resolve_value("@+string"),
            Err(ResourceError::NotFound { .. })
        ));
        assert!(matches!(
            ResourceResolver::detached().resolve_value("@+string/hello"),
            Err(ResourceError::NotFound { .. })
        ));
    }

    #[test]
    fn test_parallel_lookups_share_one_table() {
        use rayon::prelude::*;

        let dir = values_dir();
        let resolver = ResourceResolver::with_dir(dir.path());
        let resolved: Vec<String> = (0..32)
            .into_par_iter()
            .map(|_| resolver.resolve_value("@+string/hello").unwrap())
            .collect();

        assert!(resolved.iter().all(|text| text == "Hi"));
        let tables = resolver.tables.lock().unwrap();
        assert_eq!(tables.len(), 1);
        assert!(tables.contains_key(&dir.path().join("string.xml")));
    }

    #[test]
    fn test_tables_are_cached() {
        let dir = values_dir();
        let resolver = ResourceResolver::with_dir(dir.path());
        resolver.resolve_value("@+string/hello").unwrap();

        fs::remove_file(dir.path().join("string.xml")).unwrap();
        assert_eq!(resolver.resolve_value("@+string/hello").unwrap(), "Hi");
    }
}
