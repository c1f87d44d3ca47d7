//! Build-time generator for the type-category cast tables.
//!
//! Input is `IDENTIFIER VALUE` pairs, one per line (as dumped from a catalog
//! header, e.g. `INT8OID 20`). Each taxonomy member is resolved to exactly one
//! value; missing or ambiguous members are reported and left out of the table.

pub mod render;
pub mod taxonomy;

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use taxonomy::{TaxonomyEntry, BASIC_TYPES};
use thiserror::Error;

const OID_SUFFIX: &str = "OID";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypePair {
    pub name: String,
    pub value: String,
}

/// Fatal input errors; anything wrong with the pairs themselves is a [`Diagnostic`]
#[derive(Debug, Error)]
pub enum TypegenError {
    #[error("failed to open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("failed to read input: {0}")]
    Read(#[from] io::Error),
}

/// Reads the whole pair listing. Input that is not UTF-8 is a read error.
pub fn read_input<R: Read>(mut reader: R) -> Result<String, TypegenError> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    Ok(buf)
}

pub fn read_input_file(path: &Path) -> Result<String, TypegenError> {
    let file = File::open(path).map_err(|source| TypegenError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_input(file)
}

/// Non-fatal problems found while reading or resolving input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    Malformed { line: usize },
    NotFound { name: String },
    TooMany { name: String },
    InvalidValue { name: String, value: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Malformed { line } => write!(f, "line {}: malformed pair", line),
            Diagnostic::NotFound { name } => write!(f, "{}: value not found", name),
            Diagnostic::TooMany { name } => write!(f, "{}: too many values", name),
            Diagnostic::InvalidValue { name, value } => {
                write!(f, "{}: invalid value {}", name, value)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCategory {
    pub name: String,
    pub values: Vec<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub categories: Vec<ResolvedCategory>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Resolution {
    pub fn category(&self, name: &str) -> Option<&ResolvedCategory> {
        self.categories.iter().find(|c| c.name == name)
    }
}

/// Splits input into pairs. Blank lines are skipped; lines without exactly two
/// fields are reported.
pub fn parse_pairs(input: &str) -> (Vec<TypePair>, Vec<Diagnostic>) {
    let mut pairs = Vec::new();
    let mut diagnostics = Vec::new();
    for (idx, line) in input.lines().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            [] => continue,
            [name, value] => pairs.push(TypePair {
                name: name
                    .strip_suffix(OID_SUFFIX)
                    .filter(|n| !n.is_empty())
                    .unwrap_or(name)
                    .to_string(),
                value: value.to_string(),
            }),
            _ => diagnostics.push(Diagnostic::Malformed { line: idx + 1 }),
        }
    }
    (pairs, diagnostics)
}

/// Resolves every member of `taxonomy` against `pairs`.
///
/// A member listed under several categories is looked up (and reported) once
/// per category. An ambiguous member is dropped rather than guessed.
pub fn resolve(pairs: &[TypePair], taxonomy: &[TaxonomyEntry]) -> Resolution {
    let mut resolution = Resolution::default();
    for (category, members) in taxonomy {
        let mut values = Vec::with_capacity(members.len());
        for member in *members {
            let found: Vec<&TypePair> = pairs.iter().filter(|p| p.name == *member).collect();
            match found.as_slice() {
                [] => resolution.diagnostics.push(Diagnostic::NotFound {
                    name: member.to_string(),
                }),
                [pair] => match pair.value.parse::<i64>() {
                    Ok(v) => values.push(v),
                    Err(_) => resolution.diagnostics.push(Diagnostic::InvalidValue {
                        name: member.to_string(),
                        value: pair.value.clone(),
                    }),
                },
                _ => resolution.diagnostics.push(Diagnostic::TooMany {
                    name: member.to_string(),
                }),
            }
        }
        resolution.categories.push(ResolvedCategory {
            name: category.to_string(),
            values,
        });
    }
    resolution
}

/// Parse + resolve against the built-in taxonomy. Parse diagnostics come first.
pub fn generate(input: &str) -> Resolution {
    let (pairs, mut diagnostics) = parse_pairs(input);
    let mut resolution = resolve(&pairs, BASIC_TYPES);
    diagnostics.append(&mut resolution.diagnostics);
    resolution.diagnostics = diagnostics;
    resolution
}
