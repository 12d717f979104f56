use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::{Lesson, Level};

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

const MANIFEST_NAME: &str = "main.json";

const CODE_FILE_STEMS: &[&str] = &["code", "exercise", "index"];

const SOURCE_EXTENSIONS: &[&str] = &[
    "go", "py", "js", "ts", "rs", "java", "c", "cpp", "cs", "rb", "php", "swift", "kt",
];

pub(super) fn scan(root: &Path) -> Result<Vec<Lesson>, ContentError> {
    let mut lessons = Vec::new();
    walk(root, root, &mut lessons)?;
    Ok(lessons)
}

fn walk(root: &Path, dir: &Path, out: &mut Vec<Lesson>) -> Result<(), ContentError> {
    for path in sorted_entries(dir)? {
        if path.is_dir() {
            let manifest = path.join(MANIFEST_NAME);
            if manifest.is_file() {
                // A directory with a manifest is a terminal lesson unit.
                out.push(load_dir_lesson(root, &path, &manifest)?);
            } else {
                walk(root, &path, out)?;
            }
        } else if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            out.push(load_flat_lesson(root, &path)?);
        }
    }
    Ok(())
}

// Lexical order, so that "last loaded wins" is stable across platforms.
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, ContentError> {
    let entries = fs::read_dir(dir).map_err(|source| ContentError::Read {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ContentError::Read {
            path: dir.to_path_buf(),
            source,
        })?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

fn load_flat_lesson(root: &Path, path: &Path) -> Result<Lesson, ContentError> {
    let mut lesson = parse_manifest(path)?;
    apply_location(&mut lesson, root, path);
    Ok(lesson)
}

fn load_dir_lesson(root: &Path, dir: &Path, manifest: &Path) -> Result<Lesson, ContentError> {
    let mut lesson = parse_manifest(manifest)?;

    if lesson.code.is_empty() {
        if let Some(code_path) = find_code_file(dir)? {
            lesson.code = fs::read_to_string(&code_path).map_err(|source| ContentError::Read {
                path: code_path,
                source,
            })?;
        }
    }

    apply_location(&mut lesson, root, dir);
    Ok(lesson)
}

fn parse_manifest(path: &Path) -> Result<Lesson, ContentError> {
    let data = fs::read_to_string(path).map_err(|source| ContentError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&data).map_err(|source| ContentError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

// The storage path encodes `<language>/<level>/...` under the content root.
// The level always comes from the path; the language only fills in when the
// manifest left it out.
fn apply_location(lesson: &mut Lesson, root: &Path, path: &Path) {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let mut components = rel
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned());

    let language = components.next();
    let level = components.next();

    lesson.level = level
        .as_deref()
        .and_then(Level::parse)
        .unwrap_or_default();

    if lesson.language.is_empty() {
        if let Some(language) = language {
            lesson.language = language;
        }
    }
}

fn find_code_file(dir: &Path) -> Result<Option<PathBuf>, ContentError> {
    let entries = sorted_entries(dir)?;

    for path in &entries {
        if !path.is_file() {
            continue;
        }
        let stem = path.file_stem().and_then(|stem| stem.to_str());
        if stem.is_some_and(|stem| CODE_FILE_STEMS.contains(&stem)) {
            return Ok(Some(path.clone()));
        }
    }

    for path in &entries {
        if !path.is_file() {
            continue;
        }
        let ext = path.extension().and_then(|ext| ext.to_str());
        if ext.is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext)) {
            return Ok(Some(path.clone()));
        }
    }

    Ok(None)
}
