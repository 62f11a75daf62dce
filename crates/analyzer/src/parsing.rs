//! Seam between the analyzer and whatever turns class files into [`ClassUnit`]s.
//!
//! Decompilation itself lives outside this crate. A [`ClassParser`] receives
//! the text of one unit; a [`FileSource`] decides which files are handed to it.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use thiserror::Error;
use tracing::warn;

use crate::batch::ClassUnit;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;

pub trait ClassParser {
    type Error: std::fmt::Display;

    fn parse(&self, source: &str) -> Result<ClassUnit, Self::Error>;
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid class unit: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Class unit has an empty FQCN")]
    EmptyFqcn,
}

/// Reads units that were already decompiled and serialized as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonClassParser;

impl ClassParser for JsonClassParser {
    type Error = ParseError;

    fn parse(&self, source: &str) -> Result<ClassUnit, Self::Error> {
        let unit: ClassUnit = serde_json::from_str(source)?;
        if unit.fqcn.trim().is_empty() {
            return Err(ParseError::EmptyFqcn);
        }
        Ok(unit)
    }
}

pub trait FileSource {
    type Error: std::fmt::Display;

    fn get_files(&self, config: &AnalysisConfig) -> Result<Vec<PathBuf>, Self::Error>;
}

/// Every regular file below a root directory, in path order.
#[derive(Debug, Clone)]
pub struct ClassFileSource {
    pub root: PathBuf,
    pub files: Vec<PathBuf>,
}

impl ClassFileSource {
    pub fn from_path(root: &Path, config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        if !root.exists() {
            return Err(AnalysisError::SourceNotFound {
                path: root.to_path_buf(),
            });
        }

        let mut files = Vec::new();
        let walker = WalkBuilder::new(root)
            .hidden(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .ignore(false)
            .parents(false)
            .build();

        for result in walker {
            match result {
                Ok(entry) => {
                    if entry.file_type().is_some_and(|ft| ft.is_file())
                        && config.accepts(entry.path())
                    {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => warn!("Skipping unreadable entry: {}", e),
            }
        }
        files.sort();

        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }
}

impl FileSource for ClassFileSource {
    type Error = AnalysisError;

    fn get_files(&self, config: &AnalysisConfig) -> Result<Vec<PathBuf>, Self::Error> {
        Ok(self
            .files
            .iter()
            .filter(|path| config.accepts(path))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfigBuilder;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_json_parser_reads_minimal_unit() {
        let unit = JsonClassParser
            .parse(r#"{"fqcn": "com.app.A", "extends": "java.lang.Object"}"#)
            .expect("Unit should parse");

        assert_eq!(unit.fqcn, "com.app.A");
        assert_eq!(unit.extends.as_deref(), Some("java.lang.Object"));
        assert!(unit.methods.is_empty());
    }

    #[test]
    fn test_json_parser_rejects_bad_input() {
        assert!(matches!(
            JsonClassParser.parse("{ not json"),
            Err(ParseError::Json(_))
        ));
        assert!(matches!(
            JsonClassParser.parse(r#"{"fqcn": "  "}"#),
            Err(ParseError::EmptyFqcn)
        ));
    }

    #[test]
    fn test_file_source_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("com/app")).unwrap();
        fs::create_dir_all(root.join(".hidden")).unwrap();
        fs::write(root.join("com/app/B.json"), "{}").unwrap();
        fs::write(root.join("com/app/A.json"), "{}").unwrap();
        fs::write(root.join("com/app/notes.txt"), "").unwrap();
        fs::write(root.join(".hidden/C.json"), "{}").unwrap();

        let source = ClassFileSource::from_path(root, &AnalysisConfig::default()).unwrap();
        let names: Vec<_> = source
            .files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec![".hidden/C.json", "com/app/A.json", "com/app/B.json"]);

        let forced = ClassFileSource::from_path(root, &AnalysisConfigBuilder::build(true, 0)).unwrap();
        assert_eq!(forced.files.len(), 4);
    }

    #[test]
    fn test_file_source_missing_root() {
        let result = ClassFileSource::from_path(Path::new("/nonexistent/units"), &AnalysisConfig::default());
        assert!(matches!(result, Err(AnalysisError::SourceNotFound { .. })));
    }
}
