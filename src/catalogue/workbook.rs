// Lectura de la malla desde un workbook Excel.
//
// Hojas esperadas:
// - `Subjects`: id | name | stream | major | not_offered | prerequisites | corequisites
// - `Program` (opcional): key | value
// - `Majors` (opcional): key | name
// Las listas de códigos se separan con `,` o `;`.

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::AdvisorError;
use crate::models::{CapstoneRule, Catalogue, Major, ProgramRequirements, StreamKind, Subject};

/// Convierte una celda de calamine a String.
pub fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if (f.floor() - f).abs() < f64::EPSILON {
                format!("{}", *f as i64)
            } else {
                format!("{}", f)
            }
        }
        Data::Int(i) => format!("{}", i),
        Data::Bool(b) => format!("{}", b),
        Data::Empty => String::new(),
        Data::Error(_) => String::new(),
        Data::DateTime(s) => s.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Normaliza encabezados eliminando espacios/guiones y pasando a minúsculas.
fn normalize_header(s: &str) -> String {
    s.to_lowercase().chars().filter(|c| c.is_alphanumeric()).collect()
}

fn split_codes(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(|p| p.to_string())
        .collect()
}

fn parse_flag(s: &str) -> bool {
    matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "y" | "x" | "si" | "sí")
}

fn read_rows(
    workbook: &mut Sheets<BufReader<File>>,
    name: &str,
) -> Result<Option<Vec<Vec<String>>>, AdvisorError> {
    let Some(actual) = workbook
        .sheet_names()
        .into_iter()
        .find(|n| n.trim().eq_ignore_ascii_case(name))
    else {
        return Ok(None);
    };
    let range = workbook.worksheet_range(&actual)?;
    let rows = range
        .rows()
        .map(|r| r.iter().map(cell_to_string).collect::<Vec<String>>())
        .collect();
    Ok(Some(rows))
}

pub fn read_catalogue_workbook(path: &Path) -> Result<Catalogue, AdvisorError> {
    let mut workbook = open_workbook_auto(path)?;
    let subjects = read_rows(&mut workbook, "Subjects")?.ok_or_else(|| {
        AdvisorError::InvalidCatalogue(format!("workbook '{}' has no 'Subjects' sheet", path.display()))
    })?;
    let program = read_rows(&mut workbook, "Program")?;
    let majors = read_rows(&mut workbook, "Majors")?;
    debug!(path = %path.display(), rows = subjects.len(), "workbook read");
    catalogue_from_rows(&subjects, program.as_deref(), majors.as_deref())
}

/// Arma el catálogo a partir de filas ya leídas (la primera fila es encabezado).
pub fn catalogue_from_rows(
    subjects: &[Vec<String>],
    program: Option<&[Vec<String>]>,
    majors: Option<&[Vec<String>]>,
) -> Result<Catalogue, AdvisorError> {
    let Some((header, body)) = subjects.split_first() else {
        return Err(AdvisorError::InvalidCatalogue("'Subjects' sheet is empty".into()));
    };
    let columns: HashMap<String, usize> = header
        .iter()
        .enumerate()
        .map(|(i, h)| (normalize_header(h), i))
        .collect();
    let col = |key: &str| columns.get(key).copied();
    let id_col = col("id").or_else(|| col("code")).ok_or_else(|| {
        AdvisorError::InvalidCatalogue("'Subjects' sheet has no 'id' column".into())
    })?;
    let name_col = col("name");
    let stream_col = col("stream");
    let major_col = col("major");
    let offered_col = col("notoffered");
    let pre_col = col("prerequisites");
    let co_col = col("corequisites");

    let cell = |row: &Vec<String>, c: Option<usize>| -> String {
        c.and_then(|i| row.get(i)).cloned().unwrap_or_default()
    };

    let mut out = Vec::new();
    for (row_idx, row) in body.iter().enumerate() {
        let id = cell(row, Some(id_col));
        if id.is_empty() {
            continue;
        }
        let major = Some(cell(row, major_col)).filter(|m| !m.is_empty());
        let stream = match cell(row, stream_col).to_lowercase().as_str() {
            "core" => StreamKind::Core,
            "major" => StreamKind::Major,
            "elective" => StreamKind::Elective,
            "" if major.is_some() => StreamKind::Major,
            "" => StreamKind::Core,
            other => {
                warn!(row = row_idx + 2, stream = %other, "unknown stream, treating as core");
                StreamKind::Core
            }
        };
        out.push(Subject {
            name: Some(cell(row, name_col)).filter(|n| !n.is_empty()).unwrap_or_else(|| id.clone()),
            id,
            stream,
            major,
            not_offered: parse_flag(&cell(row, offered_col)),
            prerequisites: split_codes(&cell(row, pre_col)),
            corequisites: split_codes(&cell(row, co_col)),
        });
    }

    let program = match program {
        Some(rows) => program_from_rows(rows)?,
        None => ProgramRequirements::default(),
    };
    let majors = majors
        .map(|rows| {
            rows.iter()
                .skip(1)
                .filter_map(|r| {
                    let key = r.first()?.trim().to_string();
                    if key.is_empty() {
                        return None;
                    }
                    let name = r.get(1).cloned().filter(|n| !n.is_empty()).unwrap_or_else(|| key.clone());
                    Some(Major { key, name })
                })
                .collect()
        })
        .unwrap_or_default();

    Catalogue::new(program, majors, out)
}

fn program_from_rows(rows: &[Vec<String>]) -> Result<ProgramRequirements, AdvisorError> {
    let values: HashMap<String, String> = rows
        .iter()
        .filter_map(|r| Some((normalize_header(r.first()?), r.get(1).cloned().unwrap_or_default())))
        .collect();
    let number = |key: &str| -> Result<Option<u32>, AdvisorError> {
        match values.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
            None => Ok(None),
            Some(v) => v.parse::<u32>().map(Some).map_err(|_| {
                AdvisorError::InvalidCatalogue(format!("program value '{}' is not a number: '{}'", key, v))
            }),
        }
    };

    let defaults = ProgramRequirements::default();
    let capstone = match values.get("capstonesubject").filter(|v| !v.is_empty()) {
        Some(subject) => Some(CapstoneRule {
            subject: subject.clone(),
            required_subject: values.get("capstonerequiredsubject").cloned().unwrap_or_default(),
            major_full_count: number("capstonemajorfull")?.unwrap_or(0),
            major_partial_count: number("capstonemajorpartial")?.unwrap_or(0),
        }),
        None => None,
    };

    Ok(ProgramRequirements {
        name: values.get("name").cloned().unwrap_or_default(),
        total_required: number("totalrequired")?.unwrap_or(defaults.total_required),
        core: number("core")?.unwrap_or(defaults.core),
        major: number("major")?.unwrap_or(defaults.major),
        elective: number("elective")?.unwrap_or(defaults.elective),
        max_electives: number("maxelectives")?.map(|n| n as usize).unwrap_or(defaults.max_electives),
        generic_elective_codes: values
            .get("genericelectivecodes")
            .map(|v| split_codes(v))
            .unwrap_or_default(),
        capstone,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter().map(|r| r.iter().map(|c| c.to_string()).collect()).collect()
    }

    #[test]
    fn builds_catalogue_from_sheet_rows() {
        let subjects = rows(&[
            &["ID", "Name", "Stream", "Major", "Not Offered", "Prerequisites", "Corequisites"],
            &["A", "Alpha", "core", "", "", "", ""],
            &["B", "Beta", "", "net", "x", "A", ""],
            &["C", "", "elective", "", "0", "A; B", "B"],
            &["", "ignored", "", "", "", "", ""],
        ]);
        let program = rows(&[
            &["key", "value"],
            &["total_required", "3"],
            &["generic_elective_codes", "G1, G2"],
        ]);
        let majors = rows(&[&["key", "name"], &["net", "Networks"]]);

        let cat = catalogue_from_rows(&subjects, Some(program.as_slice()), Some(majors.as_slice())).unwrap();
        assert_eq!(cat.subjects().len(), 3);
        assert_eq!(cat.program().total_required, 3);
        assert_eq!(cat.program().generic_elective_codes, vec!["G1", "G2"]);
        assert_eq!(cat.majors()[0].name, "Networks");

        let b = cat.subject("B").unwrap();
        assert!(b.belongs_to_major("net"));
        assert!(b.not_offered);
        let c = cat.subject("C").unwrap();
        assert_eq!(c.name, "C");
        assert_eq!(c.prerequisites, vec!["A", "B"]);
        assert_eq!(c.corequisites, vec!["B"]);
        assert!(!c.not_offered);
    }

    #[test]
    fn missing_id_column_is_rejected() {
        let subjects = rows(&[&["name"], &["Alpha"]]);
        assert!(matches!(
            catalogue_from_rows(&subjects, None, None),
            Err(AdvisorError::InvalidCatalogue(_))
        ));
    }

    #[test]
    fn program_numbers_must_parse() {
        let subjects = rows(&[&["id"], &["A"]]);
        let program = rows(&[&["total_required", "many"]]);
        assert!(catalogue_from_rows(&subjects, Some(program.as_slice()), None).is_err());
    }
}
