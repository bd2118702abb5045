//! Tenant teardown.
//!
//! Removes a tenant's whole folder tree. This is the only operation that
//! crosses category boundaries.

use crate::fs_ops::remove_dir_bottom_up;
use crate::paths;
use crate::{FilesResult, FilesService};
use cenad_types::TenantId;

impl FilesService {
    /// Recursively deletes every file and folder belonging to `tenant`.
    ///
    /// Deleting a tenant with no folder succeeds, so repeated calls are safe.
    /// Other tenants' folders are never touched.
    ///
    /// # Returns
    ///
    /// A confirmation message naming the tenant.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FilesError::Io`] if any entry cannot be removed. The
    /// tree may be partially deleted in that case.
    pub fn delete_tenant(&self, tenant: &TenantId) -> FilesResult<String> {
        let dir = paths::tenant_dir(self.config(), tenant);
        let stats = remove_dir_bottom_up(&dir)?;

        if stats.dirs == 0 && stats.files == 0 {
            tracing::info!(tenant = %tenant, "tenant folder already absent");
        } else {
            tracing::info!(
                tenant = %tenant,
                files = stats.files,
                dirs = stats.dirs,
                "deleted tenant folder"
            );
        }

        Ok(format!(
            "Deleted folder {}",
            paths::tenant_folder_name(self.config(), tenant)
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::CategoryDirNames;
    use crate::paths::{parse_tenant, FolderKey};
    use crate::{Category, FilesError, FilesService, StorageConfig};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn test_service(temp: &TempDir) -> FilesService {
        let cfg = StorageConfig::new(temp.path(), "Cenad", &CategoryDirNames::default()).unwrap();
        FilesService::new(Arc::new(cfg))
    }

    #[test]
    fn test_delete_tenant_removes_every_category() {
        let temp = TempDir::new().unwrap();
        let service = test_service(&temp);

        for category in Category::ALL {
            let resource = category.is_resource_scoped().then_some("9");
            let key = FolderKey::parse(category, "7", resource).unwrap();
            service.save(&key, "f.bin", b"data").unwrap();
        }

        let message = service.delete_tenant(&parse_tenant("7").unwrap()).unwrap();

        assert_eq!(message, "Deleted folder Cenad 7");
        assert!(!temp.path().join("Cenad 7").exists());
    }

    #[test]
    fn test_delete_tenant_keeps_other_tenants() {
        let temp = TempDir::new().unwrap();
        let service = test_service(&temp);
        let doomed = FolderKey::parse(Category::Crest, "7", None).unwrap();
        let kept = FolderKey::parse(Category::Crest, "70", None).unwrap();

        service.save(&doomed, "crest.png", b"a").unwrap();
        service.save(&kept, "crest.png", b"b").unwrap();

        service.delete_tenant(doomed.tenant()).unwrap();

        assert_eq!(service.read(&kept, "crest.png").unwrap(), b"b");
    }

    #[cfg(unix)]
    #[test]
    fn test_delete_tenant_unlinks_symlinked_tenant_folder() {
        let temp = TempDir::new().unwrap();
        let service = test_service(&temp);
        let outside = TempDir::new().unwrap();
        let precious = outside.path().join("escudos").join("crest.png");
        std::fs::create_dir_all(precious.parent().unwrap()).unwrap();
        std::fs::write(&precious, b"precious").unwrap();
        std::os::unix::fs::symlink(outside.path(), temp.path().join("Cenad 7")).unwrap();

        service.delete_tenant(&parse_tenant("7").unwrap()).unwrap();

        assert!(std::fs::symlink_metadata(temp.path().join("Cenad 7")).is_err());
        assert_eq!(std::fs::read(&precious).unwrap(), b"precious");
    }

    #[test]
    fn test_delete_tenant_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let service = test_service(&temp);
        let tenant = parse_tenant("404").unwrap();

        assert!(service.delete_tenant(&tenant).is_ok());
        assert!(service.delete_tenant(&tenant).is_ok());
    }

    #[test]
    fn test_crest_lifecycle_ends_not_found() {
        let temp = TempDir::new().unwrap();
        let service = test_service(&temp);
        let key = FolderKey::parse(Category::Crest, "7", None).unwrap();

        service.save(&key, "crest.png", b"png bytes").unwrap();
        assert_eq!(service.read(&key, "crest.png").unwrap(), b"png bytes");

        service.delete_tenant(key.tenant()).unwrap();

        assert!(matches!(
            service.load(&key, "crest.png"),
            Err(FilesError::NotFound(_))
        ));
        assert_eq!(service.list(&key).unwrap().count(), 0);
    }
}
