use serde::Deserialize;

use crate::error::AdvisorError;
use crate::models::{Catalogue, Major, ProgramRequirements, Subject};

/// Forma del fichero JSON de malla:
///
/// ```json
/// {
///   "program": { "name": "BIT", "total_required": 24, "generic_elective_codes": ["ELEC01"] },
///   "majors": [ { "key": "net", "name": "Networking" } ],
///   "subjects": [
///     { "id": "COMP1001", "name": "Programming 1", "stream": "core" },
///     { "id": "COMP1002", "name": "Programming 2", "stream": "core", "prerequisites": ["COMP1001"] }
///   ]
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CatalogueFile {
    pub program: ProgramRequirements,
    #[serde(default)]
    pub majors: Vec<Major>,
    pub subjects: Vec<Subject>,
}

pub fn parse_catalogue_json(text: &str) -> Result<Catalogue, AdvisorError> {
    let file: CatalogueFile = serde_json::from_str(text)?;
    Catalogue::new(file.program, file.majors, file.subjects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StreamKind;

    #[test]
    fn parses_minimal_catalogue() {
        let text = r#"{
            "program": { "total_required": 3 },
            "subjects": [
                { "id": "A", "name": "Alpha", "stream": "core" },
                { "id": "B", "name": "Beta", "stream": "major", "major": "net", "prerequisites": ["A"] },
                { "id": "E", "name": "Elective", "stream": "elective", "not_offered": true }
            ]
        }"#;
        let cat = parse_catalogue_json(text).unwrap();
        assert_eq!(cat.subjects().len(), 3);
        assert_eq!(cat.program().max_electives, 4);
        let b = cat.subject("B").unwrap();
        assert!(b.belongs_to_major("net"));
        assert_eq!(b.prerequisites, vec!["A"]);
        assert_eq!(cat.subject("E").unwrap().stream, StreamKind::Elective);
        assert!(cat.subject("E").unwrap().not_offered);
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(matches!(parse_catalogue_json("{"), Err(AdvisorError::Json(_))));
    }
}
