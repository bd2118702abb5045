//! Upload size limits per category.
//!
//! The storage core accepts any size; limits are enforced here, before bytes
//! reach the service.

use cenad_files::{Category, FilesError, FilesResult};

const MIB: usize = 1024 * 1024;

/// Environment variable names read by [`UploadLimits::from_lookup`].
pub mod env {
    pub const MAX_IMAGE_BYTES: &str = "CENAD_MAX_IMAGE_BYTES";
    pub const MAX_RESOURCE_DOC_BYTES: &str = "CENAD_MAX_RESOURCE_DOC_BYTES";
    pub const MAX_REQUEST_DOC_BYTES: &str = "CENAD_MAX_REQUEST_DOC_BYTES";
    pub const MAX_DOCUMENT_BYTES: &str = "CENAD_MAX_DOCUMENT_BYTES";
}

/// Maximum bytes accepted in one upload request, summed across files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadLimits {
    /// Crest and facility-info images
    pub image: usize,
    pub resource_doc: usize,
    pub request_doc: usize,
    /// Cartography and regulations
    pub document: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            image: 5 * MIB,
            resource_doc: 6 * MIB,
            request_doc: 7 * MIB,
            document: 10 * MIB,
        }
    }
}

impl UploadLimits {
    /// Resolve limits from a key lookup, falling back to defaults for missing keys.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::InvalidConfig`] if a value is not a positive integer.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> FilesResult<Self> {
        let defaults = Self::default();
        let value = |key: &str, default: usize| -> FilesResult<usize> {
            match lookup(key).filter(|v| !v.trim().is_empty()) {
                None => Ok(default),
                Some(raw) => match raw.trim().parse::<usize>() {
                    Ok(n) if n > 0 => Ok(n),
                    _ => Err(FilesError::InvalidConfig(format!(
                        "{key} must be a positive byte count, got {raw:?}"
                    ))),
                },
            }
        };

        Ok(Self {
            image: value(env::MAX_IMAGE_BYTES, defaults.image)?,
            resource_doc: value(env::MAX_RESOURCE_DOC_BYTES, defaults.resource_doc)?,
            request_doc: value(env::MAX_REQUEST_DOC_BYTES, defaults.request_doc)?,
            document: value(env::MAX_DOCUMENT_BYTES, defaults.document)?,
        })
    }

    pub fn limit_for(&self, category: Category) -> usize {
        match category {
            Category::Crest | Category::FacilityInfo => self.image,
            Category::ResourceDoc => self.resource_doc,
            Category::RequestDoc => self.request_doc,
            Category::Cartography | Category::Regulation => self.document,
        }
    }

    /// Largest limit of any category.
    pub fn largest(&self) -> usize {
        self.image
            .max(self.resource_doc)
            .max(self.request_doc)
            .max(self.document)
    }
}
