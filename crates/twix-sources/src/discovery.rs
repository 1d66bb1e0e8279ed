use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{Result, SourceError};

/// What the input argument refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    File(PathBuf),
    Directory(PathBuf),
    Glob(String),
}

impl Input {
    /// Classify `input`. Anything that does not exist but contains glob
    /// metacharacters is treated as a pattern.
    pub fn resolve(input: &str) -> Result<Self> {
        let path = Path::new(input);
        if path.is_dir() {
            Ok(Input::Directory(path.to_path_buf()))
        } else if path.is_file() {
            Ok(Input::File(path.to_path_buf()))
        } else if input.contains(['*', '?', '[']) {
            Ok(Input::Glob(input.to_string()))
        } else {
            Err(SourceError::NotFound(path.to_path_buf()))
        }
    }

    /// Base name for derived outputs such as the record table.
    pub fn name(&self) -> String {
        let path = match self {
            Input::File(path) => path.file_stem(),
            Input::Directory(path) => path.file_name(),
            Input::Glob(pattern) => Path::new(pattern).parent().and_then(Path::file_name),
        };
        path.map(|p| p.to_string_lossy().into_owned())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| "records".to_string())
    }
}

/// Directory discovery options.
#[derive(Debug, Clone)]
pub struct Discovery {
    pub extension: String,
    pub recursive: bool,
}

impl Default for Discovery {
    fn default() -> Self {
        Self {
            extension: "dat".to_string(),
            recursive: false,
        }
    }
}

impl Discovery {
    /// Container files for `input`, sorted for determinism.
    pub fn discover(&self, input: &Input) -> Result<Vec<PathBuf>> {
        let mut files = match input {
            Input::File(path) => vec![path.clone()],
            Input::Directory(path) => self.scan_dir(path)?,
            Input::Glob(pattern) => {
                let mut files = Vec::new();
                for entry in glob::glob(pattern)? {
                    let path = entry?;
                    if path.is_file() {
                        files.push(path);
                    }
                }
                files
            }
        };

        files.sort();
        debug!("Discovered {} file(s) from {:?}", files.len(), input);
        Ok(files)
    }

    fn scan_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        if self.recursive {
            for entry in walkdir::WalkDir::new(dir) {
                let entry = entry?;
                if entry.file_type().is_file() && self.matches(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else {
            for entry in std::fs::read_dir(dir)? {
                let entry = entry?;
                if entry.file_type()?.is_file() && self.matches(&entry.path()) {
                    files.push(entry.path());
                }
            }
        }

        Ok(files)
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false)
    }
}
