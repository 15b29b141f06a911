//! Schema loader
//!
//! Reads structure definitions from a JSON file (one structure or an array of
//! them) and keeps them in an in-memory registry. A published structure is
//! immutable: registering the same name twice is rejected.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::observability::{log_event_with_fields, Event};

use super::errors::{SchemaError, SchemaResult};
use super::types::StructureDefinition;

#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaFile {
    Many(Vec<StructureDefinition>),
    One(StructureDefinition),
}

/// In-memory registry of published structure definitions.
#[derive(Debug, Default)]
pub struct SchemaLoader {
    structures: HashMap<String, Arc<StructureDefinition>>,
    /// Registration order, so "the first structure" is well defined
    order: Vec<String>,
}

impl SchemaLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every structure in the file and returns their names in file order.
    pub fn load_file(&mut self, path: &Path) -> SchemaResult<Vec<String>> {
        let content = fs::read_to_string(path).map_err(|e| SchemaError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let structures = match serde_json::from_str::<SchemaFile>(&content) {
            Ok(SchemaFile::Many(v)) => v,
            Ok(SchemaFile::One(s)) => vec![s],
            Err(e) => {
                return Err(SchemaError::Malformed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })
            }
        };

        let mut names = Vec::with_capacity(structures.len());
        for structure in structures {
            names.push(structure.name.clone());
            self.register(structure)?;
        }

        Ok(names)
    }

    /// Registers a structure directly (for tests or programmatic creation).
    pub fn register(&mut self, structure: StructureDefinition) -> SchemaResult<Arc<StructureDefinition>> {
        structure.validate_structure()?;

        if self.structures.contains_key(&structure.name) {
            return Err(SchemaError::AlreadyRegistered(structure.name));
        }

        let count = structure.definitions.len().to_string();
        log_event_with_fields(
            Event::SchemaLoaded,
            &[("definitions", count.as_str()), ("structure", structure.name.as_str())],
        );

        let name = structure.name.clone();
        let shared = Arc::new(structure);
        self.order.push(name.clone());
        self.structures.insert(name, Arc::clone(&shared));
        Ok(shared)
    }

    /// Returns the structure registered under `name`
    pub fn get(&self, name: &str) -> SchemaResult<Arc<StructureDefinition>> {
        self.structures
            .get(name)
            .cloned()
            .ok_or_else(|| SchemaError::UnknownStructure(name.to_string()))
    }

    /// Returns the first registered structure, if any
    pub fn first(&self) -> Option<Arc<StructureDefinition>> {
        self.order.first().and_then(|n| self.structures.get(n)).cloned()
    }

    /// Names of all registered structures, in registration order
    pub fn names(&self) -> &[String] {
        &self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TagDefinition;
    use tempfile::TempDir;

    fn people() -> StructureDefinition {
        StructureDefinition::new(
            "people",
            vec![TagDefinition::string("name", "Name").mandatory()],
        )
    }

    #[test]
    fn test_register_and_get() {
        let mut loader = SchemaLoader::new();
        loader.register(people()).unwrap();
        assert_eq!(loader.get("people").unwrap().definitions.len(), 1);
        assert_eq!(loader.names().to_vec(), vec!["people".to_string()]);
    }

    #[test]
    fn test_register_twice_rejected() {
        let mut loader = SchemaLoader::new();
        loader.register(people()).unwrap();
        assert!(matches!(
            loader.register(people()),
            Err(SchemaError::AlreadyRegistered(_))
        ));
    }

    #[test]
    fn test_unknown_structure() {
        let loader = SchemaLoader::new();
        assert!(matches!(loader.get("nope"), Err(SchemaError::UnknownStructure(_))));
        assert!(loader.first().is_none());
    }

    #[test]
    fn test_load_single_and_many() {
        let tmp = TempDir::new().unwrap();

        let one = tmp.path().join("one.json");
        fs::write(&one, serde_json::to_string(&people()).unwrap()).unwrap();

        let many = tmp.path().join("many.json");
        let pets = StructureDefinition::new("pets", vec![TagDefinition::boolean("fluffy", "Fluffy")]);
        let plants = StructureDefinition::new("plants", vec![TagDefinition::double("height", "Height")]);
        fs::write(&many, serde_json::to_string(&vec![pets, plants]).unwrap()).unwrap();

        let mut loader = SchemaLoader::new();
        assert_eq!(loader.load_file(&one).unwrap(), vec!["people".to_string()]);
        assert_eq!(
            loader.load_file(&many).unwrap(),
            vec!["pets".to_string(), "plants".to_string()]
        );
        assert_eq!(loader.first().unwrap().name, "people");
    }

    #[test]
    fn test_malformed_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();

        let mut loader = SchemaLoader::new();
        assert!(matches!(
            loader.load_file(&path),
            Err(SchemaError::Malformed { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let tmp = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new();
        assert!(matches!(
            loader.load_file(&tmp.path().join("absent.json")),
            Err(SchemaError::Io { .. })
        ));
    }

    #[test]
    fn test_invalid_structure_rejected_on_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("invalid.json");
        fs::write(
            &path,
            r#"{"name":"x","definitions":[{"key":"e","name":"E","type":"ENUM"}]}"#,
        )
        .unwrap();

        let mut loader = SchemaLoader::new();
        assert!(matches!(
            loader.load_file(&path),
            Err(SchemaError::InvalidDefinition { .. })
        ));
    }
}
