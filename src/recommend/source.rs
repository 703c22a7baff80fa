//! Loaders turning dataset files into candidates and job postings.
//!
//! Three layouts are understood:
//! - candidate template: a JSON array of rows with `id_candidato`,
//!   `nome_candidato`, `senioridade`, `curriculo`; other columns are kept as extras
//! - applicants dataset: an object keyed by candidate id whose nested sections are
//!   merged into one résumé text
//! - job postings dataset: an object keyed by posting id
//!
//! Keyed datasets keep the file's key order.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{MatchError, Result};
use crate::recommend::corpus::Candidate;

const ID_KEYS: &[&str] = &["id_candidato", "id"];
const NAME_KEYS: &[&str] = &["nome_candidato", "name"];
const SENIORITY_KEYS: &[&str] = &["senioridade", "seniority"];
const RESUME_KEYS: &[&str] = &["curriculo", "resume"];

/// `(section, field)` pairs concatenated into an applicant's résumé; an empty
/// section means a top-level field.
const APPLICANT_RESUME_FIELDS: &[(&str, &str)] = &[
    ("", "cv_pt"),
    ("", "cv_en"),
    ("informacoes_profissionais", "titulo_profissional"),
    ("informacoes_profissionais", "area_atuacao"),
    ("informacoes_profissionais", "conhecimentos_tecnicos"),
    ("informacoes_profissionais", "certificacoes"),
    ("informacoes_profissionais", "outras_certificacoes"),
    ("informacoes_profissionais", "nivel_profissional"),
    ("informacoes_profissionais", "qualificacoes"),
    ("informacoes_profissionais", "experiencias"),
    ("formacao_e_idiomas", "nivel_academico"),
    ("formacao_e_idiomas", "nivel_ingles"),
    ("formacao_e_idiomas", "nivel_espanhol"),
    ("formacao_e_idiomas", "outro_idioma"),
    ("formacao_e_idiomas", "cursos"),
    ("formacao_e_idiomas", "outro_curso"),
];

pub const UNTITLED_POSTING: &str = "Sem título";

/// An existing job posting whose description can be used as a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub description: String,
}

pub fn load_candidates(path: impl AsRef<Path>) -> Result<Vec<Candidate>> {
    parse_candidates(&read(path.as_ref())?)
}

pub fn load_applicants(path: impl AsRef<Path>) -> Result<Vec<Candidate>> {
    parse_applicants(&read(path.as_ref())?)
}

pub fn load_job_postings(path: impl AsRef<Path>) -> Result<Vec<JobPosting>> {
    parse_job_postings(&read(path.as_ref())?)
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| MatchError::source_io(path, e))
}

/// Parse candidate template rows. Every row needs an id, a name and a résumé.
pub fn parse_candidates(raw: &str) -> Result<Vec<Candidate>> {
    let rows: Vec<Map<String, Value>> = serde_json::from_str(raw)?;
    rows.into_iter()
        .enumerate()
        .map(|(i, mut row)| -> Result<Candidate> {
            let mut required = |keys: &[&str]| {
                take_text(&mut row, keys).ok_or_else(|| {
                    MatchError::InvalidInput(format!("row {}: missing {}", i + 1, keys[0]))
                })
            };
            let id = required(ID_KEYS)?;
            let name = required(NAME_KEYS)?;
            let resume = required(RESUME_KEYS)?;
            let seniority = take_text(&mut row, SENIORITY_KEYS);
            Ok(Candidate { id, name, seniority, resume, extra: row })
        })
        .collect()
}

/// Parse the keyed applicants dataset. Applicants without a name are skipped.
pub fn parse_applicants(raw: &str) -> Result<Vec<Candidate>> {
    let records: IndexMap<String, Value> = serde_json::from_str(raw)?;
    let mut skipped = 0usize;
    let candidates: Vec<Candidate> = records
        .into_iter()
        .filter_map(|(id, record)| {
            let Some(name) = lookup_text(&record, "infos_basicas", "nome") else {
                skipped += 1;
                return None;
            };
            let resume = APPLICANT_RESUME_FIELDS
                .iter()
                .map(|(section, field)| lookup_text(&record, section, field).unwrap_or_default())
                .collect::<Vec<String>>()
                .join(" ");
            Some(Candidate::new(id, name, resume))
        })
        .collect();
    if skipped > 0 {
        tracing::debug!(skipped, "applicants without a name were skipped");
    }
    Ok(candidates)
}

/// Parse the keyed job postings dataset.
pub fn parse_job_postings(raw: &str) -> Result<Vec<JobPosting>> {
    let records: IndexMap<String, Value> = serde_json::from_str(raw)?;
    Ok(records
        .into_iter()
        .map(|(id, record)| {
            let title = lookup_text(&record, "informacoes_basicas", "titulo_vaga")
                .unwrap_or_else(|| UNTITLED_POSTING.to_string());
            let activities = lookup_text(&record, "perfil_vaga", "principais_atividades").unwrap_or_default();
            let skills = lookup_text(&record, "perfil_vaga", "competencia_tecnicas_e_comportamentais")
                .unwrap_or_default();
            JobPosting { id, title, description: format!("{activities} {skills}") }
        })
        .collect())
}

/// Text form of a JSON value; `null` has none.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Remove the first of `keys` present in `row` and return its text.
fn take_text(row: &mut Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| row.remove(*k))
        .and_then(|v| value_text(&v))
}

fn lookup_text(record: &Value, section: &str, field: &str) -> Option<String> {
    let value = if section.is_empty() {
        record.get(field)
    } else {
        record.get(section).and_then(|s| s.get(field))
    };
    value.and_then(value_text)
}
