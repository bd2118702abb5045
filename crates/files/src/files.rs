//! Tenant-scoped file storage service implementation
//!
//! This module provides [`FilesService`], the single entry point for storing,
//! loading, listing and deleting files in every category. All paths are
//! resolved through [`crate::paths`]; this module adds the filesystem I/O.
//!
//! # Semantics
//!
//! - Folders are created on first save and never provisioned ahead of time
//! - Files keep their uploaded name; saving the same name again overwrites it
//! - Writes are staged in a temporary file and renamed into place
//! - Folder deletion is recursive, bottom-up and idempotent
//! - Nothing is locked: concurrent saves of one name are last-writer-wins
//!
//! All operations are synchronous blocking I/O. Async callers should run them
//! on a blocking thread pool.

use crate::fs_ops::{is_upload_temp, remove_dir_bottom_up, write_replacing};
use crate::paths::{self, parse_file_name, FolderKey};
use crate::{FilesError, FilesResult, StorageConfig};
use cenad_types::FileName;
use chrono::{DateTime, Utc};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A file received for storage.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Name as uploaded; validated when saved
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Result of saving one item of a [`FilesService::save_many`] batch.
#[derive(Debug)]
pub struct SaveOutcome {
    /// Name as supplied by the caller
    pub file_name: String,
    pub result: FilesResult<FileName>,
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        self.result.is_ok()
    }
}

/// An open stored file.
///
/// Holds an open handle rather than the file's bytes so callers can stream the
/// content.
#[derive(Debug)]
pub struct FileHandle {
    pub file_name: FileName,
    pub path: PathBuf,
    pub file: fs::File,
    pub size_bytes: u64,
    /// Detected media type, if the content has a recognisable signature
    pub media_type: Option<&'static str>,
}

/// Metadata for a stored file
#[derive(Debug, Clone, serde::Serialize, PartialEq, Eq)]
pub struct FileMetadata {
    pub file_name: FileName,

    /// Size of the file in bytes
    pub size_bytes: u64,

    /// Last modification time, when the platform reports one
    pub modified_at: Option<DateTime<Utc>>,

    /// Detected media type (MIME type), if available
    ///
    /// This is a best-effort detection from the file's leading bytes.
    pub media_type: Option<String>,
}

/// Service for managing tenant files across all categories
///
/// Cheap to clone; clones share the same immutable configuration.
#[derive(Clone, Debug)]
pub struct FilesService {
    cfg: Arc<StorageConfig>,
}

impl FilesService {
    /// Creates a new `FilesService` over the given configuration.
    ///
    /// No I/O happens here; the root and every folder below it are created on
    /// the first save.
    pub fn new(cfg: Arc<StorageConfig>) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.cfg
    }

    /// Absolute path of the category folder identified by `key`.
    pub fn resolve(&self, key: &FolderKey) -> PathBuf {
        paths::category_dir(&self.cfg, key)
    }

    /// Stores `bytes` as `file_name` in the folder identified by `key`.
    ///
    /// Creates the folder and any missing ancestors. An existing file with the
    /// same name is replaced without backup.
    ///
    /// # Returns
    ///
    /// The name the file was stored under, identical to `file_name`.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - `file_name` is not a valid single path component ([`FilesError::InvalidArgument`])
    /// - the folder cannot be created or the file cannot be written ([`FilesError::Io`])
    pub fn save(&self, key: &FolderKey, file_name: &str, bytes: &[u8]) -> FilesResult<FileName> {
        let name = parse_file_name(file_name)?;
        let dir = self.create_folder(key)?;
        self.write_file(key, &dir, name, bytes)
    }

    /// Stores several files in one folder, in input order.
    ///
    /// The folder is created once. The batch is not atomic: every item is
    /// attempted and its outcome reported, so a failure leaves the files that
    /// succeeded in place.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::Io`] only if the folder itself cannot be created;
    /// per-file failures are reported in the returned outcomes.
    pub fn save_many(
        &self,
        key: &FolderKey,
        files: &[IncomingFile],
    ) -> FilesResult<Vec<SaveOutcome>> {
        let dir = self.create_folder(key)?;

        let outcomes: Vec<SaveOutcome> = files
            .iter()
            .map(|incoming| {
                let result = parse_file_name(&incoming.file_name)
                    .and_then(|name| self.write_file(key, &dir, name, &incoming.bytes));
                if let Err(e) = &result {
                    tracing::warn!(folder = %key, file = %incoming.file_name, "batch save failed: {e}");
                }
                SaveOutcome {
                    file_name: incoming.file_name.clone(),
                    result,
                }
            })
            .collect();

        tracing::info!(
            folder = %key,
            saved = outcomes.iter().filter(|o| o.is_saved()).count(),
            total = outcomes.len(),
            "saved file batch"
        );
        Ok(outcomes)
    }

    /// Opens a stored file without reading it into memory.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - `file_name` is invalid ([`FilesError::InvalidArgument`])
    /// - no regular file with that name exists ([`FilesError::NotFound`])
    /// - the file cannot be opened ([`FilesError::Io`])
    pub fn load(&self, key: &FolderKey, file_name: &str) -> FilesResult<FileHandle> {
        let name = parse_file_name(file_name)?;
        let path = paths::file_path(&self.cfg, key, &name);
        let metadata = regular_file_metadata(&path, key, &name)?;

        let file = fs::File::open(&path).map_err(|e| not_found_or_io(e, key, &name))?;
        let media_type = sniff_media_type(&path);

        Ok(FileHandle {
            file_name: name,
            path,
            file,
            size_bytes: metadata.len(),
            media_type,
        })
    }

    /// Reads a stored file's full contents.
    ///
    /// # Errors
    ///
    /// Same as [`FilesService::load`].
    pub fn read(&self, key: &FolderKey, file_name: &str) -> FilesResult<Vec<u8>> {
        let name = parse_file_name(file_name)?;
        let path = paths::file_path(&self.cfg, key, &name);
        regular_file_metadata(&path, key, &name)?;

        fs::read(&path).map_err(|e| not_found_or_io(e, key, &name))
    }

    /// Returns size, modification time and media type of a stored file.
    ///
    /// # Errors
    ///
    /// Same as [`FilesService::load`].
    pub fn describe(&self, key: &FolderKey, file_name: &str) -> FilesResult<FileMetadata> {
        let name = parse_file_name(file_name)?;
        let path = paths::file_path(&self.cfg, key, &name);
        let metadata = regular_file_metadata(&path, key, &name)?;

        Ok(FileMetadata {
            size_bytes: metadata.len(),
            modified_at: metadata.modified().ok().map(DateTime::<Utc>::from),
            media_type: sniff_media_type(&path).map(str::to_owned),
            file_name: name,
        })
    }

    /// Deletes one stored file.
    ///
    /// # Returns
    ///
    /// The name of the deleted file.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - `file_name` is blank or otherwise invalid ([`FilesError::InvalidArgument`])
    /// - the file does not exist ([`FilesError::NotFound`])
    /// - removal fails ([`FilesError::Io`])
    pub fn delete_one(&self, key: &FolderKey, file_name: &str) -> FilesResult<FileName> {
        let name = parse_file_name(file_name)?;
        let path = paths::file_path(&self.cfg, key, &name);
        regular_file_metadata(&path, key, &name)?;

        fs::remove_file(&path).map_err(|e| not_found_or_io(e, key, &name))?;
        tracing::info!(folder = %key, file = %name, "deleted file");
        Ok(name)
    }

    /// Recursively deletes the category folder identified by `key`.
    ///
    /// For resource-scoped categories this removes only that resource's folder.
    /// Deleting a folder that does not exist succeeds, so repeated calls are safe.
    ///
    /// # Returns
    ///
    /// A confirmation message naming the folder.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::Io`] if any entry cannot be removed. Entries
    /// removed before the failure stay removed.
    pub fn delete_category_folder(&self, key: &FolderKey) -> FilesResult<String> {
        let dir = self.resolve(key);
        let stats = remove_dir_bottom_up(&dir)?;

        tracing::info!(
            folder = %key,
            files = stats.files,
            dirs = stats.dirs,
            "deleted category folder"
        );

        let scope = match key.resource() {
            Some(resource) => format!(" {resource}"),
            None => String::new(),
        };
        Ok(format!(
            "Deleted {} folder{} of tenant {}",
            key.category().label(),
            scope,
            key.tenant()
        ))
    }

    /// Lists the direct children of the category folder identified by `key`.
    ///
    /// The returned iterator is lazy, single-pass and yields paths relative to
    /// the folder in filesystem order. Subdirectories are listed but not
    /// descended into. A folder that does not exist yet lists as empty.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::Io`] if the folder exists but cannot be read;
    /// later read failures are yielded by the iterator.
    pub fn list(&self, key: &FolderKey) -> FilesResult<FolderEntries> {
        let dir = self.resolve(key);
        match fs::read_dir(&dir) {
            Ok(inner) => Ok(FolderEntries { inner: Some(inner) }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(FolderEntries { inner: None }),
            Err(e) => Err(FilesError::Io(e)),
        }
    }

    /// Lists the category folder with metadata for every regular file.
    ///
    /// Entries that are not regular files, or that vanish while the listing
    /// runs, are skipped. Results are sorted by file name.
    pub fn list_metadata(&self, key: &FolderKey) -> FilesResult<Vec<FileMetadata>> {
        let mut files = Vec::new();
        for entry in self.list(key)? {
            let entry = entry?;
            let Some(name) = entry.to_str() else {
                continue;
            };
            match self.describe(key, name) {
                Ok(metadata) => files.push(metadata),
                Err(FilesError::NotFound(_) | FilesError::InvalidArgument(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(files)
    }

    fn create_folder(&self, key: &FolderKey) -> FilesResult<PathBuf> {
        let dir = self.resolve(key);
        fs::create_dir_all(&dir).map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to create folder {}: {}", dir.display(), e),
            ))
        })?;
        Ok(dir)
    }

    fn write_file(
        &self,
        key: &FolderKey,
        dir: &Path,
        name: FileName,
        bytes: &[u8],
    ) -> FilesResult<FileName> {
        let dest = dir.join(&name);
        write_replacing(&dest, bytes).map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to write {}: {}", dest.display(), e),
            ))
        })?;

        tracing::info!(folder = %key, file = %name, bytes = bytes.len(), "saved file");
        Ok(name)
    }
}

/// Lazy listing of a category folder's direct children.
///
/// Yields each child's path relative to the folder. In-flight uploads are
/// skipped.
#[derive(Debug)]
pub struct FolderEntries {
    inner: Option<fs::ReadDir>,
}

impl Iterator for FolderEntries {
    type Item = FilesResult<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        let inner = self.inner.as_mut()?;
        loop {
            match inner.next()? {
                Ok(entry) => {
                    let name = entry.file_name();
                    if is_upload_temp(&name) {
                        continue;
                    }
                    return Some(Ok(PathBuf::from(name)));
                }
                Err(e) => return Some(Err(FilesError::Io(e))),
            }
        }
    }
}

fn regular_file_metadata(
    path: &Path,
    key: &FolderKey,
    name: &FileName,
) -> FilesResult<fs::Metadata> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => Ok(metadata),
        Ok(_) => Err(not_found(key, name)),
        Err(e) => Err(not_found_or_io(e, key, name)),
    }
}

fn not_found(key: &FolderKey, name: &FileName) -> FilesError {
    FilesError::NotFound(format!("{key}/{name}"))
}

fn not_found_or_io(e: std::io::Error, key: &FolderKey, name: &FileName) -> FilesError {
    if e.kind() == ErrorKind::NotFound {
        not_found(key, name)
    } else {
        FilesError::Io(e)
    }
}

fn sniff_media_type(path: &Path) -> Option<&'static str> {
    infer::get_from_path(path)
        .ok()
        .flatten()
        .map(|kind| kind.mime_type())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CategoryDirNames;
    use crate::Category;
    use std::collections::HashSet;
    use std::io::Read;
    use tempfile::TempDir;

    const PNG_HEADER: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn test_service(root: &Path) -> FilesService {
        let cfg = StorageConfig::new(root.join("files"), "Cenad", &CategoryDirNames::default())
            .expect("StorageConfig::new should succeed");
        FilesService::new(Arc::new(cfg))
    }

    fn crest_key(tenant: &str) -> FolderKey {
        FolderKey::parse(Category::Crest, tenant, None).unwrap()
    }

    fn doc_key(tenant: &str, resource: &str) -> FolderKey {
        FolderKey::parse(Category::ResourceDoc, tenant, Some(resource)).unwrap()
    }

    fn listed(service: &FilesService, key: &FolderKey) -> HashSet<String> {
        service
            .list(key)
            .unwrap()
            .map(|entry| entry.unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_save_creates_folders_lazily() {
        let temp = TempDir::new().unwrap();
        let service = test_service(temp.path());
        let key = crest_key("7");

        assert!(!service.config().root().exists());

        let stored = service.save(&key, "crest.png", &PNG_HEADER).unwrap();

        assert_eq!(stored.as_str(), "crest.png");
        let expected = temp.path().join("files").join("Cenad 7").join("escudos").join("crest.png");
        assert_eq!(fs::read(&expected).unwrap(), PNG_HEADER);
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let service = test_service(temp.path());
        let key = FolderKey::parse(Category::Regulation, "42", None).unwrap();

        service.save(&key, "a.txt", b"Hello, World!").unwrap();
        let mut handle = service.load(&key, "a.txt").unwrap();

        let mut content = Vec::new();
        handle.file.read_to_end(&mut content).unwrap();
        assert_eq!(content, b"Hello, World!");
        assert_eq!(handle.size_bytes, 13);
        assert_eq!(handle.file_name.as_str(), "a.txt");
        assert_eq!(service.read(&key, "a.txt").unwrap(), b"Hello, World!");
    }

    #[test]
    fn test_save_overwrites_same_name() {
        let temp = TempDir::new().unwrap();
        let service = test_service(temp.path());
        let key = FolderKey::parse(Category::Cartography, "3", None).unwrap();

        service.save(&key, "a.txt", b"first version").unwrap();
        service.save(&key, "a.txt", b"second").unwrap();

        assert_eq!(service.read(&key, "a.txt").unwrap(), b"second");
        assert_eq!(listed(&service, &key), HashSet::from(["a.txt".to_string()]));
    }

    #[test]
    fn test_save_rejects_traversal_names() {
        let temp = TempDir::new().unwrap();
        let service = test_service(temp.path());
        let key = crest_key("7");

        for bad in ["", "..", "../escape.txt", "sub/dir.txt"] {
            assert!(
                matches!(service.save(&key, bad, b"x"), Err(FilesError::InvalidArgument(_))),
                "{bad:?} should be rejected"
            );
        }
        assert!(!temp.path().join("escape.txt").exists());
        assert!(!temp.path().join("files").join("Cenad 7").join("escape.txt").exists());
    }

    #[test]
    fn test_save_many_reports_per_file_results() {
        let temp = TempDir::new().unwrap();
        let service = test_service(temp.path());
        let key = doc_key("7", "31");

        let files = vec![
            IncomingFile {
                file_name: "one.pdf".into(),
                bytes: b"1".to_vec(),
            },
            IncomingFile {
                file_name: "../bad.pdf".into(),
                bytes: b"2".to_vec(),
            },
            IncomingFile {
                file_name: "three.pdf".into(),
                bytes: b"3".to_vec(),
            },
        ];

        let outcomes = service.save_many(&key, &files).unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_saved());
        assert!(matches!(outcomes[1].result, Err(FilesError::InvalidArgument(_))));
        assert!(outcomes[2].is_saved());
        assert_eq!(
            listed(&service, &key),
            HashSet::from(["one.pdf".to_string(), "three.pdf".to_string()])
        );
    }

    #[test]
    fn test_save_many_empty_batch_creates_folder() {
        let temp = TempDir::new().unwrap();
        let service = test_service(temp.path());
        let key = doc_key("7", "31");

        let outcomes = service.save_many(&key, &[]).unwrap();

        assert!(outcomes.is_empty());
        assert!(service.resolve(&key).is_dir());
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let temp = TempDir::new().unwrap();
        let service = test_service(temp.path());
        let key = crest_key("7");

        assert!(matches!(
            service.load(&key, "missing.png"),
            Err(FilesError::NotFound(_))
        ));

        service.save(&key, "present.png", b"x").unwrap();
        assert!(matches!(
            service.load(&key, "missing.png"),
            Err(FilesError::NotFound(_))
        ));
    }

    #[test]
    fn test_load_directory_is_not_found() {
        let temp = TempDir::new().unwrap();
        let service = test_service(temp.path());
        let key = crest_key("7");
        fs::create_dir_all(service.resolve(&key).join("nested")).unwrap();

        assert!(matches!(
            service.load(&key, "nested"),
            Err(FilesError::NotFound(_))
        ));
    }

    #[test]
    fn test_load_detects_media_type() {
        let temp = TempDir::new().unwrap();
        let service = test_service(temp.path());
        let key = FolderKey::parse(Category::FacilityInfo, "7", None).unwrap();

        service.save(&key, "front.png", &PNG_HEADER).unwrap();
        service.save(&key, "notes.txt", b"plain text").unwrap();

        assert_eq!(service.load(&key, "front.png").unwrap().media_type, Some("image/png"));
        assert_eq!(service.load(&key, "notes.txt").unwrap().media_type, None);
    }

    #[test]
    fn test_delete_one() {
        let temp = TempDir::new().unwrap();
        let service = test_service(temp.path());
        let key = crest_key("1");

        service.save(&key, "crest.png", b"x").unwrap();
        let deleted = service.delete_one(&key, "crest.png").unwrap();

        assert_eq!(deleted.as_str(), "crest.png");
        assert!(listed(&service, &key).is_empty());
    }

    #[test]
    fn test_delete_one_errors() {
        let temp = TempDir::new().unwrap();
        let service = test_service(temp.path());
        let key = crest_key("1");

        assert!(matches!(
            service.delete_one(&key, ""),
            Err(FilesError::InvalidArgument(_))
        ));
        assert!(matches!(
            service.delete_one(&key, "   "),
            Err(FilesError::InvalidArgument(_))
        ));
        assert!(matches!(
            service.delete_one(&key, "missing.png"),
            Err(FilesError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_excludes_other_resources() {
        let temp = TempDir::new().unwrap();
        let service = test_service(temp.path());
        let mine = doc_key("7", "1");
        let other = doc_key("7", "2");

        service.save(&mine, "a.txt", b"a").unwrap();
        service.save(&mine, "b.txt", b"b").unwrap();
        service.save(&other, "c.txt", b"c").unwrap();

        assert_eq!(
            listed(&service, &mine),
            HashSet::from(["a.txt".to_string(), "b.txt".to_string()])
        );
    }

    #[test]
    fn test_list_is_shallow() {
        let temp = TempDir::new().unwrap();
        let service = test_service(temp.path());
        let key = crest_key("7");

        service.save(&key, "a.txt", b"a").unwrap();
        let nested = service.resolve(&key).join("sub");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("deep.txt"), b"d").unwrap();

        assert_eq!(
            listed(&service, &key),
            HashSet::from(["a.txt".to_string(), "sub".to_string()])
        );
    }

    #[test]
    fn test_list_missing_folder_is_empty() {
        let temp = TempDir::new().unwrap();
        let service = test_service(temp.path());

        assert_eq!(service.list(&crest_key("404")).unwrap().count(), 0);
    }

    #[test]
    fn test_list_skips_in_flight_uploads() {
        let temp = TempDir::new().unwrap();
        let service = test_service(temp.path());
        let key = crest_key("7");

        service.save(&key, "a.txt", b"a").unwrap();
        fs::write(service.resolve(&key).join(".upload-0123.tmp"), b"partial").unwrap();

        assert_eq!(listed(&service, &key), HashSet::from(["a.txt".to_string()]));
    }

    #[test]
    fn test_save_rejects_names_hidden_from_listings() {
        let temp = TempDir::new().unwrap();
        let service = test_service(temp.path());
        let key = crest_key("7");

        service.save(&key, "a.txt", b"a").unwrap();
        assert!(matches!(
            service.save(&key, ".upload-notes.tmp", b"user data"),
            Err(FilesError::InvalidArgument(_))
        ));
        let outcomes = service
            .save_many(
                &key,
                &[IncomingFile {
                    file_name: ".upload-x.tmp".into(),
                    bytes: b"x".to_vec(),
                }],
            )
            .unwrap();
        assert!(matches!(outcomes[0].result, Err(FilesError::InvalidArgument(_))));

        assert_eq!(listed(&service, &key), HashSet::from(["a.txt".to_string()]));
        assert_eq!(fs::read_dir(service.resolve(&key)).unwrap().count(), 1);
    }

    #[test]
    fn test_list_metadata_sorted_files_only() {
        let temp = TempDir::new().unwrap();
        let service = test_service(temp.path());
        let key = FolderKey::parse(Category::Regulation, "7", None).unwrap();

        service.save(&key, "b.pdf", b"bb").unwrap();
        service.save(&key, "a.png", &PNG_HEADER).unwrap();
        fs::create_dir_all(service.resolve(&key).join("folder")).unwrap();

        let files = service.list_metadata(&key).unwrap();

        let names: Vec<_> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.pdf"]);
        assert_eq!(files[0].media_type.as_deref(), Some("image/png"));
        assert_eq!(files[1].size_bytes, 2);
        assert!(files[1].modified_at.is_some());
    }

    #[test]
    fn test_file_metadata_serializes_plain_name() {
        let temp = TempDir::new().unwrap();
        let service = test_service(temp.path());
        let key = crest_key("7");
        service.save(&key, "crest.png", &PNG_HEADER).unwrap();

        let value = serde_json::to_value(service.describe(&key, "crest.png").unwrap()).unwrap();

        assert_eq!(value["file_name"], "crest.png");
        assert_eq!(value["size_bytes"], 8);
        assert_eq!(value["media_type"], "image/png");
    }

    #[test]
    fn test_delete_category_folder_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let service = test_service(temp.path());
        let key = crest_key("7");

        service.save(&key, "crest.png", b"x").unwrap();
        let first = service.delete_category_folder(&key).unwrap();
        let second = service.delete_category_folder(&key).unwrap();

        assert!(!service.resolve(&key).exists());
        assert_eq!(first, "Deleted crest folder of tenant 7");
        assert_eq!(first, second);
    }

    #[test]
    fn test_delete_resource_folder_keeps_siblings() {
        let temp = TempDir::new().unwrap();
        let service = test_service(temp.path());
        let doomed = doc_key("7", "1");
        let kept = doc_key("7", "2");

        service.save(&doomed, "a.txt", b"a").unwrap();
        service.save(&kept, "b.txt", b"b").unwrap();

        let message = service.delete_category_folder(&doomed).unwrap();

        assert_eq!(message, "Deleted resource documents folder 1 of tenant 7");
        assert!(!service.resolve(&doomed).exists());
        assert_eq!(service.read(&kept, "b.txt").unwrap(), b"b");
    }

    #[test]
    fn test_concurrent_saves_with_distinct_names() {
        let temp = TempDir::new().unwrap();
        let service = test_service(temp.path());
        let key = FolderKey::parse(Category::Cartography, "7", None).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let service = service.clone();
                let key = key.clone();
                std::thread::spawn(move || {
                    service
                        .save(&key, &format!("sheet-{i}.tif"), format!("map {i}").as_bytes())
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let names = listed(&service, &key);
        assert_eq!(names.len(), 8);
        for i in 0..8 {
            assert_eq!(
                service.read(&key, &format!("sheet-{i}.tif")).unwrap(),
                format!("map {i}").as_bytes()
            );
        }
    }

    #[test]
    fn test_concurrent_saves_same_name_leave_one_complete_file() {
        let temp = TempDir::new().unwrap();
        let service = test_service(temp.path());
        let key = crest_key("7");
        let payloads: Vec<Vec<u8>> = (0..4u8).map(|i| vec![i; 64 * 1024]).collect();

        let handles: Vec<_> = payloads
            .iter()
            .cloned()
            .map(|bytes| {
                let service = service.clone();
                let key = key.clone();
                std::thread::spawn(move || service.save(&key, "crest.png", &bytes).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stored = service.read(&key, "crest.png").unwrap();
        assert!(payloads.contains(&stored));
        assert_eq!(listed(&service, &key).len(), 1);
    }
}
