//! JSON-artifact implementation of the catalog metadata store
//!
//! The backing artifact is a pretty-printed JSON document with one top-level
//! `products` collection. It doubles as a reviewable source document, so
//! writes keep a stable field order and reads tolerate the stray trailing
//! comma a hand edit tends to leave behind.

use crate::config::CatalogStoreConfig;
use crate::error::{CatalogError, CatalogResult};
use crate::metadata::{MetadataStore, ProductRecord};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Top-level shape of the catalog artifact
#[derive(Serialize, Deserialize)]
struct CatalogDocument {
    products: Vec<ProductRecord>,
}

fn default_artifact_path() -> PathBuf {
    match env::var("CATALOG_ARTIFACT") {
        Ok(path) => {
            info!("Using catalog artifact from environment: {}", path);
            PathBuf::from(path)
        }
        Err(_) => {
            warn!("Catalog artifact location not defined in environment");
            let default_path = Path::new("data").join("products.json");
            info!("Using default artifact path: {}", default_path.display());
            default_path
        }
    }
}

/// Strip commas sitting directly before a closing delimiter, outside string
/// literals. One such comma per delimiter is the tolerated hand-edit defect;
/// anything worse still fails structural parsing.
fn strip_trailing_commas(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in raw.char_indices() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = raw[i + 1..].chars().find(|ch| !ch.is_whitespace());
                match next {
                    Some(']') | Some('}') => {} // drop the comma
                    _ => out.push(c),
                }
            }
            _ => out.push(c),
        }
    }

    out
}

/// File-backed implementation of MetadataStore
pub struct JsonMetadataStore {
    artifact_path: PathBuf,
}

impl JsonMetadataStore {
    /// Create a new JSON metadata store, creating the artifact's parent
    /// directory if needed. The artifact itself is created on first write.
    pub fn new(config: Option<&CatalogStoreConfig>) -> CatalogResult<Self> {
        let artifact_path = match config {
            Some(cfg) => PathBuf::from(&cfg.artifact_path),
            None => default_artifact_path(),
        };

        if let Some(parent) = artifact_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        Ok(Self { artifact_path })
    }

    /// Path of the backing artifact
    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }
}

impl MetadataStore for JsonMetadataStore {
    fn read_all(&self) -> CatalogResult<Vec<ProductRecord>> {
        if !self.artifact_path.exists() {
            debug!(
                "Catalog artifact {} not present, returning empty sequence",
                self.artifact_path.display()
            );
            return Ok(Vec::new());
        }

        let raw = fs::read_to_string(&self.artifact_path)?;
        if raw.trim().is_empty() {
            debug!(
                "Catalog artifact {} is empty, returning empty sequence",
                self.artifact_path.display()
            );
            return Ok(Vec::new());
        }

        let cleaned = strip_trailing_commas(&raw);
        let doc: CatalogDocument = serde_json::from_str(&cleaned).map_err(|e| {
            warn!(
                "Catalog artifact {} is unparsable: {}",
                self.artifact_path.display(),
                e
            );
            CatalogError::CorruptStore(e.to_string())
        })?;

        Ok(doc.products)
    }

    fn write_all(&self, records: &[ProductRecord]) -> CatalogResult<()> {
        let doc = CatalogDocument {
            products: records.to_vec(),
        };
        let body = serde_json::to_string_pretty(&doc)
            .map_err(|e| CatalogError::Persistence(e.to_string()))?;

        // Write to a temp file in the same directory, then rename over the
        // artifact. A failed write must never leave a half-written artifact.
        let mut temp_os = self.artifact_path.as_os_str().to_owned();
        temp_os.push(format!(".tmp.{}", Uuid::new_v4()));
        let temp_path = PathBuf::from(temp_os);

        let write_temp = || -> std::io::Result<()> {
            let mut file = File::create(&temp_path)?;
            file.write_all(body.as_bytes())?;
            file.write_all(b"\n")?;
            file.sync_all()?;
            Ok(())
        };

        if let Err(e) = write_temp() {
            let _ = fs::remove_file(&temp_path);
            return Err(CatalogError::Persistence(e.to_string()));
        }

        if let Err(e) = fs::rename(&temp_path, &self.artifact_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(CatalogError::Persistence(e.to_string()));
        }

        debug!(
            "Wrote {} product records to {}",
            records.len(),
            self.artifact_path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_at(dir: &Path) -> JsonMetadataStore {
        let config = CatalogStoreConfig {
            backend: crate::config::CatalogBackend::Json,
            artifact_path: dir.join("products.json").to_string_lossy().to_string(),
        };
        JsonMetadataStore::new(Some(&config)).unwrap()
    }

    fn sample_record(id: &str, title: &str) -> ProductRecord {
        ProductRecord {
            id: id.to_string(),
            title: title.to_string(),
            description: "A fine product".to_string(),
            features: vec!["fast".to_string(), "small".to_string()],
            images: vec!["front.png".to_string()],
            price: 9.5,
            category: "tools".to_string(),
            kind: "digital".to_string(),
            downloadable_file_name: None,
        }
    }

    #[test]
    fn test_missing_artifact_reads_empty() {
        let dir = tempdir().unwrap();
        let store = store_at(dir.path());
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_empty_artifact_reads_empty() {
        let dir = tempdir().unwrap();
        let store = store_at(dir.path());
        fs::write(store.artifact_path(), "").unwrap();
        assert!(store.read_all().unwrap().is_empty());

        fs::write(store.artifact_path(), "   \n\t\n").unwrap();
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_write_read_round_trip() {
        let dir = tempdir().unwrap();
        let store = store_at(dir.path());

        let records = vec![sample_record("p1", "First"), sample_record("p2", "Second")];
        store.write_all(&records).unwrap();

        let read_back = store.read_all().unwrap();
        assert_eq!(read_back, records);
    }

    #[test]
    fn test_rewrite_of_read_content_is_a_noop() {
        let dir = tempdir().unwrap();
        let store = store_at(dir.path());

        store
            .write_all(&[sample_record("p1", "First"), sample_record("p2", "Second")])
            .unwrap();
        let before = fs::read_to_string(store.artifact_path()).unwrap();

        let records = store.read_all().unwrap();
        store.write_all(&records).unwrap();
        let after = fs::read_to_string(store.artifact_path()).unwrap();

        assert_eq!(before, after);
    }

    #[test]
    fn test_serialization_is_pretty_with_stable_field_order() {
        let dir = tempdir().unwrap();
        let store = store_at(dir.path());

        let mut record = sample_record("p1", "First");
        record.downloadable_file_name = Some("first.zip".to_string());
        store.write_all(&[record]).unwrap();

        let raw = fs::read_to_string(store.artifact_path()).unwrap();
        assert!(raw.contains("\"products\": ["));
        assert!(raw.contains("\n    "));

        let field_order = [
            "\"id\"",
            "\"title\"",
            "\"description\"",
            "\"features\"",
            "\"images\"",
            "\"price\"",
            "\"category\"",
            "\"type\"",
            "\"downloadableFileName\"",
        ];
        let positions: Vec<usize> = field_order
            .iter()
            .map(|f| raw.find(f).unwrap_or_else(|| panic!("missing field {}", f)))
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_single_trailing_comma_in_array_is_tolerated() {
        let dir = tempdir().unwrap();
        let store = store_at(dir.path());

        let artifact = r#"{
  "products": [
    {
      "id": "p1",
      "title": "Hand Edited",
      "description": "left a comma behind",
      "features": [],
      "images": ["x.png"],
      "price": 1.0,
      "category": "misc",
      "type": "digital",
      "downloadableFileName": null
    },
  ]
}"#;
        fs::write(store.artifact_path(), artifact).unwrap();

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "p1");
    }

    #[test]
    fn test_single_trailing_comma_in_record_is_tolerated() {
        let dir = tempdir().unwrap();
        let store = store_at(dir.path());

        let artifact = r#"{
  "products": [
    {
      "id": "p1",
      "title": "Hand Edited",
      "description": "comma after the last field",
      "features": [],
      "images": ["x.png"],
      "price": 1.0,
      "category": "misc",
      "type": "digital",
      "downloadableFileName": null,
    }
  ]
}"#;
        fs::write(store.artifact_path(), artifact).unwrap();

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_double_trailing_comma_is_corrupt() {
        let dir = tempdir().unwrap();
        let store = store_at(dir.path());

        let artifact = r#"{ "products": [ { "id": "p1", "title": "t", "description": "d",
            "images": ["x.png"], "price": 1.0, "category": "c" },, ] }"#;
        fs::write(store.artifact_path(), artifact).unwrap();

        match store.read_all() {
            Err(CatalogError::CorruptStore(_)) => {}
            other => panic!("expected CorruptStore, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_artifact_is_corrupt() {
        let dir = tempdir().unwrap();
        let store = store_at(dir.path());
        fs::write(store.artifact_path(), "this is not json at all").unwrap();

        match store.read_all() {
            Err(CatalogError::CorruptStore(_)) => {}
            other => panic!("expected CorruptStore, got {:?}", other),
        }
    }

    #[test]
    fn test_commas_inside_strings_are_untouched() {
        let dir = tempdir().unwrap();
        let store = store_at(dir.path());

        let mut record = sample_record("p1", "Deluxe, Collector's Edition");
        record.description = "Ships with \"quotes\", commas, and more".to_string();
        store.write_all(&[record.clone()]).unwrap();

        let read_back = store.read_all().unwrap();
        assert_eq!(read_back[0].title, record.title);
        assert_eq!(read_back[0].description, record.description);
    }

    #[test]
    fn test_write_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let store = store_at(dir.path());

        store.write_all(&[sample_record("p1", "First")]).unwrap();
        store.write_all(&[sample_record("p2", "Second")]).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(entries, vec!["products.json".to_string()]);
    }

    #[test]
    fn test_overwrite_replaces_content() {
        let dir = tempdir().unwrap();
        let store = store_at(dir.path());

        store.write_all(&[sample_record("p1", "First")]).unwrap();
        store.write_all(&[sample_record("p2", "Second")]).unwrap();

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "p2");
    }

    #[test]
    fn test_strip_trailing_commas_cases() {
        assert_eq!(strip_trailing_commas("[1, 2, 3]"), "[1, 2, 3]");
        assert_eq!(strip_trailing_commas("[1, 2, 3,]"), "[1, 2, 3]");
        assert_eq!(strip_trailing_commas("[1, 2, 3 , ]"), "[1, 2, 3  ]");
        assert_eq!(strip_trailing_commas("{\"a\": 1,}"), "{\"a\": 1}");
        assert_eq!(strip_trailing_commas("[\"a,]\"]"), "[\"a,]\"]");
        assert_eq!(strip_trailing_commas("[1,,]"), "[1,]");
        assert_eq!(strip_trailing_commas("[\"esc\\\",\", 2,]"), "[\"esc\\\",\", 2]");
    }
}
