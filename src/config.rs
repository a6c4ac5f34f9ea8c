// Configuración del servicio, leída de variables de entorno (y `.env` si existe).

use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_PROGRAM_FILE: &str = "program.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind: String,
    pub datafiles_dir: PathBuf,
    pub program_file: String,
    pub workers: usize,
}

impl Settings {
    /// ADVISOR_BIND, ADVISOR_DATAFILES_DIR, ADVISOR_PROGRAM, ADVISOR_WORKERS.
    pub fn from_env() -> Self {
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Igual que `from_env` pero con una fuente de valores inyectable (tests).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let configured_dir = non_empty("ADVISOR_DATAFILES_DIR").map(PathBuf::from);
        let workers = match non_empty("ADVISOR_WORKERS") {
            Some(v) => match v.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    warn!(value = %v, "invalid ADVISOR_WORKERS, using CPU count");
                    num_cpus::get().max(1)
                }
            },
            None => num_cpus::get().max(1),
        };

        Self {
            bind: non_empty("ADVISOR_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            datafiles_dir: crate::catalogue::resolve_datafiles_dir(configured_dir.as_deref()),
            program_file: non_empty("ADVISOR_PROGRAM").unwrap_or_else(|| DEFAULT_PROGRAM_FILE.to_string()),
            workers,
        }
    }

    pub fn catalogue_path(&self) -> PathBuf {
        self.datafiles_dir.join(&self.program_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let s = settings(&[]);
        assert_eq!(s.bind, DEFAULT_BIND);
        assert_eq!(s.program_file, DEFAULT_PROGRAM_FILE);
        assert!(s.workers >= 1);
    }

    #[test]
    fn explicit_values_win() {
        let dir = tempfile::tempdir().unwrap();
        let s = settings(&[
            ("ADVISOR_BIND", "0.0.0.0:9000"),
            ("ADVISOR_DATAFILES_DIR", dir.path().to_str().unwrap()),
            ("ADVISOR_PROGRAM", "malla.xlsx"),
            ("ADVISOR_WORKERS", "3"),
        ]);
        assert_eq!(s.bind, "0.0.0.0:9000");
        assert_eq!(s.workers, 3);
        assert_eq!(s.catalogue_path(), dir.path().join("malla.xlsx"));
    }

    #[test]
    fn bad_worker_count_falls_back() {
        let s = settings(&[("ADVISOR_WORKERS", "zero")]);
        assert!(s.workers >= 1);
    }
}
