//! Reads placement data files and resolves them into core types.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and
//! deserialization helpers, plus the loaders for validator config, shape
//! tables and composite definitions.

use crate::schema::{CompositeDef, ShapeDef};
use groundwork_core::config::{ConfigError, ValidatorConfig};
use groundwork_core::footprint::{CompositeDefinition, CompositePiece};
use groundwork_core::id::ShapeId;
use groundwork_core::shape::{ShapeTable, ShapeTableBuilder, ShapeTableError};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A name reference could not be resolved.
    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    /// A duplicate name was found.
    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// The shape table rejected a definition.
    #[error("shape table error in {file}: {source}")]
    Shapes {
        file: PathBuf,
        source: ShapeTableError,
    },

    /// The validator config is internally inconsistent.
    #[error("invalid validator config in {file}: {source}")]
    Config { file: PathBuf, source: ConfigError },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats, in discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Ron, Format::Toml, Format::Json];

    pub fn extension(self) -> &'static str {
        match self {
            Format::Ron => "ron",
            Format::Toml => "toml",
            Format::Json => "json",
        }
    }

    fn parse<T: DeserializeOwned>(self, text: &str) -> Result<T, String> {
        match self {
            Format::Ron => ron::from_str(text).map_err(|e| e.to_string()),
            Format::Toml => toml::from_str(text).map_err(|e| e.to_string()),
            Format::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
        }
    }
}

/// Format implied by a file's extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    let ext = path.extension().and_then(|e| e.to_str());
    Format::ALL
        .into_iter()
        .find(|f| Some(f.extension()) == ext)
        .ok_or_else(|| DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        })
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Find `{base_name}.ron`, `.toml` or `.json` in `dir`.
///
/// `Ok(None)` when none exists; `ConflictingFormats` when more than one does.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut present = Format::ALL
        .into_iter()
        .map(|f| dir.join(format!("{base_name}.{}", f.extension())))
        .filter(|p| p.exists());

    match (present.next(), present.next()) {
        (Some(a), Some(b)) => Err(DataLoadError::ConflictingFormats { a, b }),
        (first, _) => Ok(first),
    }
}

pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn read_with_format(path: &Path) -> Result<(Format, String), DataLoadError> {
    let format = detect_format(path)?;
    Ok((format, std::fs::read_to_string(path)?))
}

fn parse_error(path: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// Read and deserialize one value, picking the parser from the extension.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let (format, text) = read_with_format(path)?;
    format.parse(&text).map_err(|e| parse_error(path, e))
}

/// Read a list of definitions.
///
/// RON and JSON files hold a bare array. TOML cannot, so the array sits under
/// `toml_key` (`[[shapes]]`, `[[composites]]`).
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let (format, text) = read_with_format(path)?;
    if format != Format::Toml {
        return format.parse(&text).map_err(|e| parse_error(path, e));
    }

    let mut table: toml::Table = toml::from_str(&text).map_err(|e| parse_error(path, e))?;
    let Some(list) = table.remove(toml_key) else {
        return Err(parse_error(path, format!("no `{toml_key}` array in TOML file")));
    };
    list.try_into().map_err(|e: toml::de::Error| parse_error(path, e))
}

// ===========================================================================
// Name resolution helpers
// ===========================================================================

/// Look up a shape by name, returning an `UnresolvedRef` error if not found.
pub fn resolve_shape(
    shapes: &ShapeTable,
    name: &str,
    file: &Path,
) -> Result<ShapeId, DataLoadError> {
    shapes.shape_id(name).ok_or_else(|| DataLoadError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_string(),
        expected_kind: "shape",
    })
}

/// Check whether a name already exists in a map, returning a `DuplicateName`
/// error if so.
pub fn check_duplicate<V>(
    map: &HashMap<String, V>,
    name: &str,
    file: &Path,
) -> Result<(), DataLoadError> {
    if map.contains_key(name) {
        Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

// ===========================================================================
// Loaders
// ===========================================================================

/// Load and check a [`ValidatorConfig`]. Omitted fields keep their defaults.
pub fn load_validator_config(path: &Path) -> Result<ValidatorConfig, DataLoadError> {
    let config: ValidatorConfig = deserialize_file(path)?;
    config.validate().map_err(|source| DataLoadError::Config {
        file: path.to_path_buf(),
        source,
    })?;
    Ok(config)
}

/// Load a shape table. Ids are assigned in file order starting at 0.
pub fn load_shape_table(path: &Path) -> Result<ShapeTable, DataLoadError> {
    let defs: Vec<ShapeDef> = deserialize_list(path, "shapes")?;
    let mut builder = ShapeTableBuilder::new();
    for def in &defs {
        builder
            .register(&def.name, def.height, def.flag_set())
            .map_err(|source| match source {
                ShapeTableError::DuplicateName(name) => DataLoadError::DuplicateName {
                    file: path.to_path_buf(),
                    name,
                },
                source => DataLoadError::Shapes {
                    file: path.to_path_buf(),
                    source,
                },
            })?;
    }
    tracing::debug!("loaded {} shapes from {}", defs.len(), path.display());
    Ok(builder.build())
}

/// Load composite definitions, resolving piece shape names against `shapes`.
pub fn load_composites(
    path: &Path,
    shapes: &ShapeTable,
) -> Result<HashMap<String, CompositeDefinition>, DataLoadError> {
    let defs: Vec<CompositeDef> = deserialize_list(path, "composites")?;
    let mut composites = HashMap::with_capacity(defs.len());
    for def in defs {
        check_duplicate(&composites, &def.name, path)?;
        let mut pieces = Vec::with_capacity(def.pieces.len());
        for piece in &def.pieces {
            pieces.push(CompositePiece {
                shape: resolve_shape(shapes, piece.shape(), path)?,
                offset: piece.offset(),
            });
        }
        composites.insert(
            def.name.clone(),
            CompositeDefinition {
                name: def.name,
                pieces,
            },
        );
    }
    tracing::debug!("loaded {} composites from {}", composites.len(), path.display());
    Ok(composites)
}

/// Everything a placement host needs from a data directory.
#[derive(Debug, Clone)]
pub struct PlacementData {
    pub shapes: ShapeTable,
    pub composites: HashMap<String, CompositeDefinition>,
    pub validator: ValidatorConfig,
}

impl PlacementData {
    pub fn composite(&self, name: &str) -> Option<&CompositeDefinition> {
        self.composites.get(name)
    }
}

/// Load `shapes` (required), `composites` and `validator` (optional) from
/// `dir`. A missing validator file means default thresholds.
pub fn load_placement_data(dir: &Path) -> Result<PlacementData, DataLoadError> {
    let shapes = load_shape_table(&require_data_file(dir, "shapes")?)?;
    let composites = match find_data_file(dir, "composites")? {
        Some(path) => load_composites(&path, &shapes)?,
        None => HashMap::new(),
    };
    let validator = match find_data_file(dir, "validator")? {
        Some(path) => load_validator_config(&path)?,
        None => ValidatorConfig::default(),
    };
    Ok(PlacementData {
        shapes,
        composites,
        validator,
    })
}

// ===========================================================================
// Tests
// ===========================================================================
