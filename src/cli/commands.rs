//! CLI command implementations
//!
//! Each command loads the configuration and the schema, reads one JSON
//! request from stdin and writes one JSON response to stdout. The request
//! handling itself lives in `*_request` functions that work on values, so
//! it can be driven without a terminal.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::query::QueryEngine;
use crate::record::Record;
use crate::schema::{SchemaLoader, StructureDefinition};
use crate::store::{DocumentStore, MemoryStore};
use crate::validation::validate_container;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_response};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Schema file holding one or more structure definitions (required)
    pub schema_path: String,

    /// Structure to use; defaults to the first one in the schema file
    #[serde(default)]
    pub structure: Option<String>,

    /// Minimum log severity (optional, default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Owner stamped onto checked records that have none
    #[serde(default)]
    pub default_owner: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.schema_path.trim().is_empty() {
            return Err(CliError::config_error("schema_path must not be empty"));
        }

        self.severity()?;

        if let Some(owner) = &self.default_owner {
            if owner.trim().is_empty() {
                return Err(CliError::config_error("default_owner must not be empty"));
            }
        }

        Ok(())
    }

    pub fn severity(&self) -> CliResult<Severity> {
        Severity::parse(&self.log_level).ok_or_else(|| {
            CliError::config_error(format!(
                "Invalid log_level: '{}'. Expected trace, info, warn or error.",
                self.log_level
            ))
        })
    }

    /// Resolves `schema_path` relative to the config file's directory
    pub fn schema_file(&self, config_path: &Path) -> std::path::PathBuf {
        let schema = Path::new(&self.schema_path);
        match config_path.parent() {
            Some(dir) if schema.is_relative() => dir.join(schema),
            _ => schema.to_path_buf(),
        }
    }
}

/// Loaded configuration plus the structure every command works on
pub struct Session {
    pub config: Config,
    pub structure: Arc<StructureDefinition>,
}

impl Session {
    /// Loads config, applies the log level and loads the schema
    pub fn open(config_path: &Path) -> CliResult<Self> {
        let config = Config::load(config_path)?;
        Logger::set_min_severity(config.severity()?);
        let path = config_path.display().to_string();
        log_event_with_fields(
            Event::ConfigLoaded,
            &[("log_level", config.log_level.as_str()), ("path", path.as_str())],
        );

        let mut loader = SchemaLoader::new();
        loader.load_file(&config.schema_file(config_path))?;

        let structure = match &config.structure {
            Some(name) => loader.get(name)?,
            None => loader
                .first()
                .ok_or_else(|| CliError::config_error("schema file defines no structure"))?,
        };

        Ok(Self { config, structure })
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Check { config } => check(&config),
        Command::Compile { config } => compile(&config),
        Command::Query { config } => query(&config),
    }
}

/// Decode and validate one record document
pub fn check(config_path: &Path) -> CliResult<()> {
    let session = Session::open(config_path)?;
    let request = read_request()?;
    write_response(check_request(&session, &request)?)
}

/// Compile one query envelope into a store filter
pub fn compile(config_path: &Path) -> CliResult<()> {
    let session = Session::open(config_path)?;
    let request = read_request()?;
    write_response(compile_request(&session, &request)?)
}

/// Run one query over the given records through both evaluators
pub fn query(config_path: &Path) -> CliResult<()> {
    let session = Session::open(config_path)?;
    let request = read_request()?;
    write_response(query_request(&session, &request)?)
}

pub fn check_request(session: &Session, request: &Value) -> CliResult<Value> {
    let mut record = Record::from_document(&session.structure, request)?;
    if record.owner_id.is_none() {
        record.owner_id = session.config.default_owner.clone();
    }

    let errors: Vec<Value> = validate_container(&session.structure, &record.tags)
        .iter()
        .map(|e| {
            json!({
                "rule": e.rule().code(),
                "subject": e.subject(),
                "message": e.render(),
            })
        })
        .collect();

    Ok(json!({
        "id": record.id.to_string(),
        "valid": errors.is_empty(),
        "canonical": record.tags.canonical(),
        "errors": errors,
        "document": record.to_document(),
    }))
}

pub fn compile_request(session: &Session, request: &Value) -> CliResult<Value> {
    let engine = QueryEngine::new(Arc::clone(&session.structure));
    let query = engine.decode(&serde_json::to_vec(request)?)?;
    Ok(json!({ "filter": serde_json::to_value(engine.compile(&query))? }))
}

/// Request: `{"query": <envelope>, "records": [<document>, ...]}`
pub fn query_request(session: &Session, request: &Value) -> CliResult<Value> {
    let engine = QueryEngine::new(Arc::clone(&session.structure));

    let envelope = request
        .get("query")
        .ok_or_else(|| CliError::io_error("request is missing 'query'"))?;
    let query = engine.decode(&serde_json::to_vec(envelope)?)?;

    let documents = request
        .get("records")
        .and_then(Value::as_array)
        .ok_or_else(|| CliError::io_error("request is missing 'records' array"))?;

    let records = documents
        .iter()
        .map(|doc| Record::from_document(&session.structure, doc))
        .collect::<Result<Vec<_>, _>>()?;

    let mut store = MemoryStore::new(Arc::clone(&session.structure));
    for record in &records {
        store.insert(record)?;
    }

    let in_memory: Vec<String> = engine
        .filter(&query, &records)
        .iter()
        .map(|r| r.id.to_string())
        .collect();
    let from_store: Vec<String> = engine
        .find(&store, &query)?
        .iter()
        .map(|r| r.id.to_string())
        .collect();

    Ok(json!({
        "agreed": in_memory == from_store,
        "matched": in_memory,
        "store_matched": from_store,
    }))
}
