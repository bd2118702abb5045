//! Constants used throughout the CENAD files crate.
//!
//! Default folder names match the layout already present on deployed servers,
//! so a process started without overrides reads and writes the same tree.

/// Default storage root when no explicit directory is configured.
pub const DEFAULT_ROOT_DIR: &str = "cenad_files";

/// Default prefix of every tenant folder (`"<prefix> <tenant id>"`).
pub const DEFAULT_TENANT_PREFIX: &str = "Cenad";

/// Default folder name for crest images.
pub const DEFAULT_CREST_DIR: &str = "escudos";

/// Default folder name for resource documents.
pub const DEFAULT_RESOURCE_DOC_DIR: &str = "docRecursos";

/// Default folder name for request documents.
pub const DEFAULT_REQUEST_DOC_DIR: &str = "docSolicitudes";

/// Default folder name for cartography sets.
pub const DEFAULT_CARTOGRAPHY_DIR: &str = "cartografias";

/// Default folder name for regulation documents.
pub const DEFAULT_REGULATION_DIR: &str = "normativas";

/// Default folder name for facility-info images.
pub const DEFAULT_FACILITY_INFO_DIR: &str = "infoCenads";

/// Separator between the tenant prefix and the tenant id in a tenant folder name.
pub const TENANT_FOLDER_SEPARATOR: &str = " ";

/// Prefix of in-flight upload files; these never appear in listings.
pub const UPLOAD_TEMP_PREFIX: &str = ".upload-";

/// Suffix of in-flight upload files.
pub const UPLOAD_TEMP_SUFFIX: &str = ".tmp";

/// Environment variable names read by [`crate::StorageConfig::from_lookup`].
pub mod env {
    pub const ROOT: &str = "CENAD_FILES_ROOT";
    pub const TENANT_PREFIX: &str = "CENAD_TENANT_PREFIX";
    pub const CREST_DIR: &str = "CENAD_CREST_DIR";
    pub const RESOURCE_DOC_DIR: &str = "CENAD_RESOURCE_DOC_DIR";
    pub const REQUEST_DOC_DIR: &str = "CENAD_REQUEST_DOC_DIR";
    pub const CARTOGRAPHY_DIR: &str = "CENAD_CARTOGRAPHY_DIR";
    pub const REGULATION_DIR: &str = "CENAD_REGULATION_DIR";
    pub const FACILITY_INFO_DIR: &str = "CENAD_FACILITY_INFO_DIR";
}
