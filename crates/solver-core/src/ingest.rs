//! Save uploads to a scratch directory, unpack archives and extract each file.

use std::fs::File;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::extractor::Extractor;

const NESTED_DIR: &str = "nested_zip_contents";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

/// One uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub data: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

/// Extracted file text keyed by file name, in upload order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileContentMap(Vec<(String, String)>);

impl FileContentMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `name`, replacing the content of an earlier entry with the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        let name = name.into();
        let content = content.into();
        if let Some(entry) = self.0.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = content;
        } else {
            self.0.push((name, content));
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, c)| (n.as_str(), c.as_str()))
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|(n, _)| n.as_str()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

enum Pending {
    File(PathBuf),
    Failed { name: String, message: String },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Ingestor {
    extractor: Extractor,
}

impl Ingestor {
    #[must_use]
    pub fn new(extractor: Extractor) -> Self {
        Self { extractor }
    }

    /// Ingest `uploads` through a scratch directory removed before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if the scratch directory or an upload cannot be written.
    pub fn ingest_uploads(&self, uploads: &[Upload]) -> Result<FileContentMap, IngestError> {
        let dir = tempfile::Builder::new().prefix("tds-solver-").tempdir()?;
        self.ingest(dir.path(), uploads)
    }

    /// Save `uploads` under `dir`, unpack `.zip` uploads and extract every file.
    ///
    /// An archive that cannot be read becomes a single error entry under the
    /// archive's name; the other uploads are still processed.
    ///
    /// # Errors
    ///
    /// Returns an error if an upload cannot be written to `dir`.
    pub fn ingest(&self, dir: &Path, uploads: &[Upload]) -> Result<FileContentMap, IngestError> {
        let mut pending = Vec::new();

        for upload in uploads {
            let Some(name) = safe_file_name(&upload.filename) else {
                tracing::warn!(filename = %upload.filename, "skipping upload with unusable name");
                continue;
            };
            let path = dir.join(name);
            std::fs::write(&path, &upload.data)?;

            if !is_zip(&path) {
                pending.push(Pending::File(path));
                continue;
            }

            tracing::debug!(archive = name, "extracting zip upload");
            let dest = dir.join(format!("{name}_contents"));
            match extract_archive(&path, &dest, true) {
                Ok(files) => {
                    tracing::debug!(archive = name, count = files.len(), "archive extracted");
                    pending.extend(files.into_iter().map(Pending::File));
                }
                Err(e) => {
                    tracing::warn!(archive = name, "failed to extract archive: {e}");
                    pending.push(Pending::Failed {
                        name: name.to_owned(),
                        message: format!("Error processing file: {e}"),
                    });
                }
            }
        }

        let mut contents = FileContentMap::new();
        for entry in pending {
            match entry {
                Pending::File(path) => {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    contents.insert(name, self.extractor.extract_path(&path));
                }
                Pending::Failed { name, message } => contents.insert(name, message),
            }
        }
        Ok(contents)
    }
}

/// Final path component of a client-supplied name, or `None` if there is none.
fn safe_file_name(name: &str) -> Option<&str> {
    name.rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .filter(|n| !n.is_empty() && *n != "." && *n != "..")
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"))
}

/// Unpack `archive` into `dest` and return the extracted file paths in archive order.
///
/// Entries whose names escape `dest` are skipped. With `unwrap_nested`, an
/// archive holding exactly one `.zip` file is replaced by that file's contents.
fn extract_archive(
    archive: &Path,
    dest: &Path,
    unwrap_nested: bool,
) -> Result<Vec<PathBuf>, IngestError> {
    let mut zip = zip::ZipArchive::new(File::open(archive)?)?;
    std::fs::create_dir_all(dest)?;

    let mut files = Vec::new();
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            tracing::warn!(entry = entry.name(), "skipping archive entry outside extraction dir");
            continue;
        };
        let out = dest.join(relative);
        if entry.is_dir() {
            std::fs::create_dir_all(&out)?;
            continue;
        }
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = File::create(&out)?;
        std::io::copy(&mut entry, &mut file)?;
        files.push(out);
    }

    if unwrap_nested && let [only] = files.as_slice() && is_zip(only) {
        tracing::debug!("archive holds a single nested zip, extracting it");
        let nested = only.clone();
        files = extract_archive(&nested, &dest.join(NESTED_DIR), false)?;
    }

    if files.is_empty() {
        tracing::debug!("no files listed in archive, scanning extraction dir");
        collect_files(dest, &mut files)?;
    }
    Ok(files)
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .map(|e| e.map(|e| e.path()))
        .collect::<Result<_, _>>()?;
    entries.sort();
    for path in entries {
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use zip::write::FileOptions;

    use super::*;

    fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, FileOptions::default()).unwrap();
            } else {
                writer.start_file(*name, FileOptions::default()).unwrap();
                writer.write_all(data).unwrap();
            }
        }
        writer.finish().unwrap().into_inner()
    }

    fn ingest(uploads: &[Upload]) -> FileContentMap {
        let dir = tempfile::tempdir().unwrap();
        Ingestor::default().ingest(dir.path(), uploads).unwrap()
    }

    #[test]
    fn plain_uploads_keep_order() {
        let map = ingest(&[
            Upload::new("notes.txt", "hello"),
            Upload::new("data.csv", "answer\n7\n"),
        ]);
        assert_eq!(map.names(), vec!["notes.txt", "data.csv"]);
        assert_eq!(map.get("notes.txt"), Some("Text file contents:\nhello"));
        assert_eq!(
            map.get("data.csv"),
            Some("The value in the 'answer' column is: 7")
        );
    }

    #[test]
    fn zip_uploads_are_unpacked() {
        let archive = zip_bytes(&[
            ("dir/", b"".as_slice()),
            ("dir/a.txt", b"alpha".as_slice()),
            ("b.json", b"[1]".as_slice()),
        ]);
        let map = ingest(&[Upload::new("q.zip", archive)]);
        assert_eq!(map.names(), vec!["a.txt", "b.json"]);
        assert_eq!(map.get("a.txt"), Some("Text file contents:\nalpha"));
        assert_eq!(map.get("b.json"), Some("JSON file contents:\n[\n  1\n]"));
    }

    #[test]
    fn single_nested_zip_is_unwrapped_once() {
        let innermost = zip_bytes(&[("deep.txt", b"deep".as_slice())]);
        let inner = zip_bytes(&[
            ("inner.txt", b"inner".as_slice()),
            ("deeper.zip", innermost.as_slice()),
        ]);
        let outer = zip_bytes(&[("inner.zip", inner.as_slice())]);
        let map = ingest(&[Upload::new("outer.zip", outer)]);
        assert_eq!(map.names(), vec!["inner.txt", "deeper.zip"]);
        assert!(
            map.get("deeper.zip")
                .unwrap()
                .starts_with("File type .zip not directly processable")
        );
    }

    #[test]
    fn traversal_entries_are_skipped() {
        let archive = zip_bytes(&[
            ("../evil.txt", b"x".as_slice()),
            ("ok.txt", b"fine".as_slice()),
        ]);
        let dir = tempfile::tempdir().unwrap();
        let map = Ingestor::default()
            .ingest(dir.path(), &[Upload::new("t.zip", archive)])
            .unwrap();
        assert_eq!(map.names(), vec!["ok.txt"]);
        assert!(!dir.path().join("evil.txt").exists());
    }

    #[test]
    fn corrupt_archive_becomes_error_entry() {
        let map = ingest(&[
            Upload::new("broken.zip", b"not a zip".to_vec()),
            Upload::new("a.txt", "still here"),
        ]);
        assert_eq!(map.names(), vec!["broken.zip", "a.txt"]);
        assert!(map.get("broken.zip").unwrap().starts_with("Error processing file: "));
        assert_eq!(map.get("a.txt"), Some("Text file contents:\nstill here"));
    }

    #[test]
    fn upload_names_are_reduced_to_file_names() {
        let map = ingest(&[
            Upload::new("../../etc/passwd.txt", "nope"),
            Upload::new("", "unnamed"),
            Upload::new("C:\\Users\\me\\report.md", "# hi"),
        ]);
        assert_eq!(map.names(), vec!["passwd.txt", "report.md"]);
    }

    #[test]
    fn duplicate_names_replace_in_place() {
        let mut map = FileContentMap::new();
        map.insert("a", "1");
        map.insert("b", "2");
        map.insert("a", "3");
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![("a", "3"), ("b", "2")]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn ingest_uploads_cleans_up() {
        let map = Ingestor::default()
            .ingest_uploads(&[Upload::new("x.txt", "x")])
            .unwrap();
        assert_eq!(map.get("x.txt"), Some("Text file contents:\nx"));
    }
}
