//! Módulo `catalogue`: lectura de la malla (asignaturas, majors y requisitos
//! del programa) desde el directorio de datafiles.
//!
//! Submódulos:
//! - `json`: formato principal (`program.json`)
//! - `workbook`: malla en Excel (`.xlsx`/`.xls`/`.ods`) vía calamine
//! - `lookup`: búsqueda de asignaturas por código o nombre

pub mod json;
pub mod lookup;
pub mod workbook;

pub use json::{parse_catalogue_json, CatalogueFile};
pub use lookup::{normalize_name, resolve_subject};
pub use workbook::{catalogue_from_rows, read_catalogue_workbook};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use tracing::{info, warn};

use crate::error::AdvisorError;
use crate::models::Catalogue;

/// Directorio de datafiles por defecto (relativo al directorio de trabajo).
pub const DATAFILES_DIR: &str = "datafiles";

/// Resuelve el directorio de datafiles: valor explícito (config) si existe,
/// si no, el primero que exista entre los candidatos habituales.
pub fn resolve_datafiles_dir(configured: Option<&Path>) -> PathBuf {
    if let Some(p) = configured {
        if p.exists() {
            return p.to_path_buf();
        }
        warn!(path = %p.display(), "configured datafiles dir does not exist, searching defaults");
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let candidates = [
        cwd.join(DATAFILES_DIR),
        cwd.join("src").join(DATAFILES_DIR),
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(DATAFILES_DIR),
    ];
    for candidate in candidates.iter() {
        if candidate.is_dir() {
            return candidate.clone();
        }
    }
    warn!("no datafiles directory found; falling back to ./{}", DATAFILES_DIR);
    PathBuf::from(DATAFILES_DIR)
}

/// Lee un catálogo eligiendo el lector por extensión.
pub fn load_catalogue(path: &Path) -> Result<Catalogue, AdvisorError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let catalogue = match ext.as_str() {
        "json" => {
            let text = std::fs::read_to_string(path).map_err(|source| AdvisorError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            parse_catalogue_json(&text)?
        }
        "xlsx" | "xlsm" | "xls" | "ods" => read_catalogue_workbook(path)?,
        other => return Err(AdvisorError::UnsupportedFormat(other.to_string())),
    };

    info!(
        path = %path.display(),
        subjects = catalogue.subjects().len(),
        majors = catalogue.majors().len(),
        "catalogue loaded"
    );
    Ok(catalogue)
}

// Caché global: ruta -> catálogo ya validado
static CATALOGUE_CACHE: OnceLock<Mutex<HashMap<PathBuf, Arc<Catalogue>>>> = OnceLock::new();

/// Devuelve el catálogo de `path`, leyéndolo sólo la primera vez.
/// El lock se mantiene únicamente para consultar/insertar, no durante la lectura.
pub fn get_catalogue_cached(path: &Path) -> Result<Arc<Catalogue>, AdvisorError> {
    let cache = CATALOGUE_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

    {
        let guard = cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = guard.get(&key) {
            return Ok(Arc::clone(existing));
        }
    }

    let arc = Arc::new(load_catalogue(&key)?);
    let mut guard = cache.lock().unwrap_or_else(|e| e.into_inner());
    let entry = guard.entry(key).or_insert_with(|| Arc::clone(&arc));
    Ok(Arc::clone(entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_json_from_disk_and_caches() {
        let mut f = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            f,
            r#"{{"program": {{"total_required": 1}}, "subjects": [{{"id": "A", "name": "A", "stream": "core"}}]}}"#
        )
        .unwrap();

        let first = get_catalogue_cached(f.path()).unwrap();
        let second = get_catalogue_cached(f.path()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.program().total_required, 1);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_catalogue(Path::new("malla.csv")).unwrap_err();
        assert!(matches!(err, AdvisorError::UnsupportedFormat(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_catalogue(Path::new("no/such/program.json")).unwrap_err();
        assert!(err.to_string().contains("no/such/program.json"));
    }
}
