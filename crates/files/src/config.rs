//! Storage configuration.
//!
//! This module defines configuration that is resolved once at process startup
//! and then passed into [`crate::FilesService`]. Request handling never reads
//! environment variables; binaries call [`StorageConfig::from_lookup`] once and
//! share the result behind an `Arc`.

use crate::category::Category;
use crate::constants::{
    env, DEFAULT_CARTOGRAPHY_DIR, DEFAULT_CREST_DIR, DEFAULT_FACILITY_INFO_DIR,
    DEFAULT_REGULATION_DIR, DEFAULT_REQUEST_DOC_DIR, DEFAULT_RESOURCE_DOC_DIR, DEFAULT_ROOT_DIR,
    DEFAULT_TENANT_PREFIX,
};
use crate::{FilesError, FilesResult};
use cenad_types::PathSegment;
use std::path::{Path, PathBuf};

/// Raw folder names for each category, before validation.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
pub struct CategoryDirNames {
    pub crest: String,
    pub resource_doc: String,
    pub request_doc: String,
    pub cartography: String,
    pub regulation: String,
    pub facility_info: String,
}

impl Default for CategoryDirNames {
    fn default() -> Self {
        Self {
            crest: DEFAULT_CREST_DIR.into(),
            resource_doc: DEFAULT_RESOURCE_DOC_DIR.into(),
            request_doc: DEFAULT_REQUEST_DOC_DIR.into(),
            cartography: DEFAULT_CARTOGRAPHY_DIR.into(),
            regulation: DEFAULT_REGULATION_DIR.into(),
            facility_info: DEFAULT_FACILITY_INFO_DIR.into(),
        }
    }
}

impl CategoryDirNames {
    fn get(&self, category: Category) -> &str {
        match category {
            Category::Crest => &self.crest,
            Category::ResourceDoc => &self.resource_doc,
            Category::RequestDoc => &self.request_doc,
            Category::Cartography => &self.cartography,
            Category::Regulation => &self.regulation,
            Category::FacilityInfo => &self.facility_info,
        }
    }
}

/// Storage configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    root: PathBuf,
    tenant_prefix: PathSegment,
    // Indexed in `Category::ALL` order.
    category_dirs: [PathSegment; 6],
}

impl StorageConfig {
    /// Create a new `StorageConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::InvalidConfig`] if:
    /// - `root` is empty,
    /// - the tenant prefix or any category folder name is not a single plain path component,
    /// - two categories share a folder name.
    pub fn new(
        root: impl Into<PathBuf>,
        tenant_prefix: &str,
        dirs: &CategoryDirNames,
    ) -> FilesResult<Self> {
        let root = root.into();
        if root.as_os_str().is_empty() {
            return Err(FilesError::InvalidConfig("root cannot be empty".into()));
        }

        let tenant_prefix = PathSegment::new(tenant_prefix)
            .map_err(|e| FilesError::InvalidConfig(format!("tenant prefix: {e}")))?;

        let mut category_dirs = Vec::with_capacity(Category::ALL.len());
        for category in Category::ALL {
            let segment = PathSegment::new(dirs.get(category)).map_err(|e| {
                FilesError::InvalidConfig(format!("{} folder name: {e}", category.label()))
            })?;

            if category_dirs.contains(&segment) {
                return Err(FilesError::InvalidConfig(format!(
                    "folder name {segment:?} is used by more than one category"
                )));
            }
            category_dirs.push(segment);
        }

        let category_dirs: [PathSegment; 6] = category_dirs
            .try_into()
            .map_err(|_| FilesError::InvalidConfig("expected six category folders".into()))?;

        Ok(Self {
            root,
            tenant_prefix,
            category_dirs,
        })
    }

    /// Resolve configuration from a key lookup, falling back to defaults for missing keys.
    ///
    /// Binaries pass `|key| std::env::var(key).ok()`; tests pass a map. Empty or
    /// whitespace-only values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> FilesResult<Self> {
        let value = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_owned())
        };

        let dirs = CategoryDirNames {
            crest: value(env::CREST_DIR, DEFAULT_CREST_DIR),
            resource_doc: value(env::RESOURCE_DOC_DIR, DEFAULT_RESOURCE_DOC_DIR),
            request_doc: value(env::REQUEST_DOC_DIR, DEFAULT_REQUEST_DOC_DIR),
            cartography: value(env::CARTOGRAPHY_DIR, DEFAULT_CARTOGRAPHY_DIR),
            regulation: value(env::REGULATION_DIR, DEFAULT_REGULATION_DIR),
            facility_info: value(env::FACILITY_INFO_DIR, DEFAULT_FACILITY_INFO_DIR),
        };

        Self::new(
            value(env::ROOT, DEFAULT_ROOT_DIR),
            &value(env::TENANT_PREFIX, DEFAULT_TENANT_PREFIX),
            &dirs,
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tenant_prefix(&self) -> &PathSegment {
        &self.tenant_prefix
    }

    /// Folder name configured for `category`.
    pub fn category_dir(&self, category: Category) -> &PathSegment {
        &self.category_dirs[category.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let cfg = StorageConfig::from_lookup(|_| None).unwrap();

        assert_eq!(cfg.root(), Path::new(DEFAULT_ROOT_DIR));
        assert_eq!(cfg.tenant_prefix().as_str(), "Cenad");
        assert_eq!(cfg.category_dir(Category::Crest).as_str(), "escudos");
        assert_eq!(cfg.category_dir(Category::ResourceDoc).as_str(), "docRecursos");
        assert_eq!(cfg.category_dir(Category::RequestDoc).as_str(), "docSolicitudes");
        assert_eq!(cfg.category_dir(Category::Cartography).as_str(), "cartografias");
        assert_eq!(cfg.category_dir(Category::Regulation).as_str(), "normativas");
        assert_eq!(cfg.category_dir(Category::FacilityInfo).as_str(), "infoCenads");
    }

    #[test]
    fn test_overrides_and_blank_values() {
        let cfg = StorageConfig::from_lookup(lookup_from(&[
            (env::ROOT, "/srv/files"),
            (env::TENANT_PREFIX, "CMT"),
            (env::CREST_DIR, "crests"),
            (env::REGULATION_DIR, "   "),
        ]))
        .unwrap();

        assert_eq!(cfg.root(), Path::new("/srv/files"));
        assert_eq!(cfg.tenant_prefix().as_str(), "CMT");
        assert_eq!(cfg.category_dir(Category::Crest).as_str(), "crests");
        assert_eq!(cfg.category_dir(Category::Regulation).as_str(), "normativas");
    }

    #[test]
    fn test_rejects_duplicate_category_dirs() {
        let dirs = CategoryDirNames {
            cartography: "shared".into(),
            regulation: "shared".into(),
            ..CategoryDirNames::default()
        };

        let result = StorageConfig::new("root", "Cenad", &dirs);
        assert!(matches!(result, Err(FilesError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_traversing_names() {
        let dirs = CategoryDirNames {
            crest: "../escudos".into(),
            ..CategoryDirNames::default()
        };
        assert!(matches!(
            StorageConfig::new("root", "Cenad", &dirs),
            Err(FilesError::InvalidConfig(_))
        ));

        assert!(matches!(
            StorageConfig::new("root", "a/b", &CategoryDirNames::default()),
            Err(FilesError::InvalidConfig(_))
        ));
        assert!(matches!(
            StorageConfig::new("", "Cenad", &CategoryDirNames::default()),
            Err(FilesError::InvalidConfig(_))
        ));
    }
}
