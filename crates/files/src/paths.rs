//! On-disk path definitions for tenant files.
//!
//! This module contains **no I/O** - only typed path construction. It is the
//! single place where the storage layout is defined:
//!
//! ```text
//! <root>/
//!     <tenant prefix> <tenant id>/
//!         <category dir>/                  # crest, cartography, regulation, facility info
//!             <file name>
//!         <category dir>/<resource id>/    # resource and request documents
//!             <file name>
//! ```
//!
//! Identifiers reach this module only as validated [`cenad_types`] values, so
//! every joined segment is a single plain component and resolution cannot fail
//! or escape the root.

use crate::category::Category;
use crate::config::StorageConfig;
use crate::constants::{TENANT_FOLDER_SEPARATOR, UPLOAD_TEMP_PREFIX, UPLOAD_TEMP_SUFFIX};
use crate::{FilesError, FilesResult};
use cenad_types::{FileName, ResourceId, TenantId};
use std::fmt;
use std::path::PathBuf;

/// Identifies one category folder: the category, its tenant and, for
/// resource-scoped categories, the sub-resource.
///
/// A `FolderKey` can only be built when the resource id matches the category's
/// scope, which makes [`category_dir`] infallible.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FolderKey {
    category: Category,
    tenant: TenantId,
    resource: Option<ResourceId>,
}

impl FolderKey {
    /// Builds a key from validated identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::InvalidArgument`] if a resource-scoped category is
    /// given no resource id, or a tenant-scoped category is given one.
    pub fn new(
        category: Category,
        tenant: TenantId,
        resource: Option<ResourceId>,
    ) -> FilesResult<Self> {
        match (category.is_resource_scoped(), &resource) {
            (true, None) => Err(FilesError::InvalidArgument(format!(
                "{} folders require a resource id",
                category.label()
            ))),
            (false, Some(resource)) => Err(FilesError::InvalidArgument(format!(
                "{} folders do not take a resource id (got {resource:?})",
                category.label()
            ))),
            _ => Ok(Self {
                category,
                tenant,
                resource,
            }),
        }
    }

    /// Validates raw identifiers and builds a key.
    ///
    /// This is the validation gate for untrusted input: traversal sequences,
    /// separators and blank ids are rejected before any path is built.
    pub fn parse(category: Category, tenant: &str, resource: Option<&str>) -> FilesResult<Self> {
        let tenant = parse_tenant(tenant)?;
        let resource = resource
            .map(|r| {
                ResourceId::parse(r)
                    .map_err(|e| FilesError::InvalidArgument(format!("resource id: {e}")))
            })
            .transpose()?;
        Self::new(category, tenant, resource)
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn tenant(&self) -> &TenantId {
        &self.tenant
    }

    pub fn resource(&self) -> Option<&ResourceId> {
        self.resource.as_ref()
    }
}

impl fmt::Display for FolderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.resource {
            Some(resource) => write!(f, "{}/{}/{}", self.tenant, self.category, resource),
            None => write!(f, "{}/{}", self.tenant, self.category),
        }
    }
}

/// Validates a raw tenant id.
pub fn parse_tenant(tenant: &str) -> FilesResult<TenantId> {
    TenantId::parse(tenant).map_err(|e| FilesError::InvalidArgument(format!("tenant id: {e}")))
}

/// Validates a raw file name.
///
/// Names of the form `.upload-*.tmp` are reserved for in-flight uploads and
/// rejected, since listings never show them.
pub fn parse_file_name(name: &str) -> FilesResult<FileName> {
    let parsed =
        FileName::parse(name).map_err(|e| FilesError::InvalidArgument(format!("file name: {e}")))?;
    if is_reserved_name(parsed.as_str()) {
        return Err(FilesError::InvalidArgument(format!(
            "file name: {name:?} is reserved for in-flight uploads"
        )));
    }
    Ok(parsed)
}

/// Whether `name` has the shape of an in-flight upload.
pub(crate) fn is_reserved_name(name: &str) -> bool {
    name.starts_with(UPLOAD_TEMP_PREFIX) && name.ends_with(UPLOAD_TEMP_SUFFIX)
}

/// Name of a tenant's folder: `"<prefix> <tenant id>"`.
pub fn tenant_folder_name(cfg: &StorageConfig, tenant: &TenantId) -> String {
    format!(
        "{}{}{}",
        cfg.tenant_prefix(),
        TENANT_FOLDER_SEPARATOR,
        tenant
    )
}

/// Absolute path of a tenant's folder.
pub fn tenant_dir(cfg: &StorageConfig, tenant: &TenantId) -> PathBuf {
    cfg.root().join(tenant_folder_name(cfg, tenant))
}

/// Absolute path of a category folder.
pub fn category_dir(cfg: &StorageConfig, key: &FolderKey) -> PathBuf {
    let dir = tenant_dir(cfg, &key.tenant).join(cfg.category_dir(key.category));
    match &key.resource {
        Some(resource) => dir.join(resource),
        None => dir,
    }
}

/// Absolute path of a stored file.
pub fn file_path(cfg: &StorageConfig, key: &FolderKey, name: &FileName) -> PathBuf {
    category_dir(cfg, key).join(name)
}
