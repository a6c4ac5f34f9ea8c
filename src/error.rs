// Errores del asesor.
//
// `AdvisorError` cubre fallas reales (lectura de datos, claves desconocidas).
// Los rechazos de política (`Rejection`) no son errores: un toggle rechazado
// es una interacción normal y se informa como `accepted = false`.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("failed to read catalogue '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalogue JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("invalid catalogue: {0}")]
    InvalidCatalogue(String),

    #[error("unsupported catalogue format: {0}")]
    UnsupportedFormat(String),

    #[error("unknown subject '{0}'")]
    UnknownSubject(String),

    #[error("unknown major '{0}'")]
    UnknownMajor(String),

    #[error("unknown session {0}")]
    UnknownSession(u64),
}

/// Motivo por el que se rechaza un toggle o un crédito genérico.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    #[error("subject is not defined in the catalogue")]
    UnknownSubject,
    #[error("subject is already completed")]
    AlreadyCompleted,
    #[error("subject is not offered this term")]
    NotOffered,
    #[error("prerequisites or corequisites are not met")]
    PrerequisitesUnmet,
    #[error("semester load cap reached")]
    AdmissionCapReached,
    #[error("elective quota is already full")]
    ElectiveQuotaFull,
    #[error("no generic elective code left")]
    NoGenericCreditAvailable,
    #[error("no generic elective credit to remove")]
    NoGenericCreditToRemove,
}
