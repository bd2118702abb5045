//! File categories.
//!
//! A single enum replaces one method family per kind of document. Each
//! category knows whether its folder carries an extra sub-resource segment and
//! the token used for it in URLs and on the command line.

use crate::{FilesError, FilesResult};
use std::fmt;
use std::str::FromStr;

/// The kinds of file a tenant can store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Crest image of the facility.
    Crest,
    /// Documents attached to a resource.
    ResourceDoc,
    /// Documents attached to a request.
    RequestDoc,
    /// Cartography sets.
    Cartography,
    /// Regulation documents.
    Regulation,
    /// Facility information images.
    FacilityInfo,
}

impl Category {
    /// Every category, in a fixed order.
    pub const ALL: [Category; 6] = [
        Category::Crest,
        Category::ResourceDoc,
        Category::RequestDoc,
        Category::Cartography,
        Category::Regulation,
        Category::FacilityInfo,
    ];

    /// Whether this category's folder is keyed by a sub-resource id below the tenant.
    pub fn is_resource_scoped(self) -> bool {
        matches!(self, Category::ResourceDoc | Category::RequestDoc)
    }

    /// Position of this category in [`Category::ALL`].
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Token used for this category in URLs and CLI arguments.
    pub fn slug(self) -> &'static str {
        match self {
            Category::Crest => "crest",
            Category::ResourceDoc => "resource-docs",
            Category::RequestDoc => "request-docs",
            Category::Cartography => "cartography",
            Category::Regulation => "regulations",
            Category::FacilityInfo => "facility-info",
        }
    }

    /// Human readable name used in confirmation messages.
    pub fn label(self) -> &'static str {
        match self {
            Category::Crest => "crest",
            Category::ResourceDoc => "resource documents",
            Category::RequestDoc => "request documents",
            Category::Cartography => "cartography",
            Category::Regulation => "regulations",
            Category::FacilityInfo => "facility info",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Category {
    type Err = FilesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.slug() == s)
            .ok_or_else(|| FilesError::UnknownCategory(s.to_owned()))
    }
}

/// Parses a category token, for callers that prefer a function to `str::parse`.
pub fn parse_category(s: &str) -> FilesResult<Category> {
    s.parse()
}
