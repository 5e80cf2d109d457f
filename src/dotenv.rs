//! Dotenv file provider.
//!
//! Reads a dotenv file (if present) through `dotenvy` without touching the
//! process environment, and applies the same key transform as the
//! environment provider: keys are filtered by prefix, the prefix stripped,
//! the remainder lowercased and split into nested dictionary paths. A
//! missing file yields no data; it is never an error.

use std::path::{Path, PathBuf};

use figment::{
    Metadata, Profile, Provider,
    error::Error,
    util::nest,
    value::{Dict, Map},
};

use crate::env_source::{merge_nested, parse_env_value};

/// Figment provider for an optional dotenv file.
#[derive(Clone, Debug)]
pub struct DotEnv {
    path: PathBuf,
    prefix: String,
    split: String,
}

impl DotEnv {
    /// Provider for `path`, keeping only keys starting with `prefix` and
    /// nesting at `split`.
    pub fn file(path: impl Into<PathBuf>, prefix: impl Into<String>, split: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            prefix: prefix.into(),
            split: split.into(),
        }
    }

    /// The file this provider reads.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Provider for DotEnv {
    fn metadata(&self) -> Metadata {
        Metadata::from("dotenv file", self.path.as_path())
    }

    fn profile(&self) -> Option<Profile> {
        Some(Profile::Default)
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let entries =
            dotenvy::from_path_iter(&self.path).map_err(|e| Error::from(e.to_string()))?;

        let mut dict = Dict::new();
        for entry in entries {
            let (key, value) = entry.map_err(|e| Error::from(e.to_string()))?;
            let Some(stripped) = key.strip_prefix(&self.prefix) else {
                continue;
            };
            let nested_key = stripped.to_lowercase().replace(&self.split, ".");
            let Some(nested) = nest(&nested_key, parse_env_value(&value)).into_dict() else {
                return Err(Error::from(format!(
                    "dotenv key `{key}` produced a non-object value"
                )));
            };
            merge_nested(&mut dict, nested);
        }
        Ok(Profile::Default.collect(dict))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use figment::{Figment, providers::Serialized};
    use serde::Deserialize;

    use super::*;

    fn collect(provider: &DotEnv) -> Dict {
        provider
            .data()
            .expect("provider data")
            .remove(&Profile::Default)
            .unwrap_or_default()
    }

    #[derive(Debug, Deserialize)]
    struct Settings {
        db: Db,
    }

    #[derive(Debug, Deserialize)]
    struct Db {
        host: String,
        port: u16,
    }

    #[test]
    fn keys_are_stripped_lowercased_and_nested() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.env");
        fs::write(&path, "APP_DB_HOST=localhost\nAPP_DB_PORT=5432\nOTHER_KEY=1\n")
            .expect("write dotenv");

        let dict = collect(&DotEnv::file(&path, "APP_", "_"));
        assert!(!dict.contains_key("other"), "unprefixed key must be dropped");

        let settings: Settings = Figment::from(Serialized::defaults(dict))
            .extract()
            .expect("extract settings");
        assert_eq!(settings.db.host, "localhost");
        assert_eq!(settings.db.port, 5432);
    }

    #[test]
    fn a_missing_file_yields_no_data() {
        let dir = tempfile::tempdir().expect("tempdir");
        let provider = DotEnv::file(dir.path().join("absent.env"), "APP_", "_");
        assert!(collect(&provider).is_empty());
    }

    #[test]
    fn a_malformed_file_reports_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.env");
        fs::write(&path, "not a valid line\n").expect("write dotenv");

        let provider = DotEnv::file(&path, "", "_");
        assert!(provider.data().is_err());
    }
}
