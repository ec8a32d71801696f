//! Category model and the tax-sphere vocabulary
//!
//! Categories classify transactions for German nonprofit accounting
//! (Gemeinnützigkeitsrecht). Every category carries exactly one tax sphere;
//! donors restrict which spheres they may fund. The category taxonomy is a
//! fixed table keyed by slug, so category ids are string slugs rather than
//! UUIDs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four German nonprofit-accounting cost-center classifications
///
/// The wire strings (`non-profit`, `asset-management`, `purpose-operations`,
/// `commercial-operations`) are domain vocabulary and must not be renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaxSphere {
    /// Ideeller Bereich
    NonProfit,
    /// Vermögensverwaltung
    AssetManagement,
    /// Zweckbetrieb
    PurposeOperations,
    /// Wirtschaftlicher Geschäftsbetrieb
    CommercialOperations,
}

impl TaxSphere {
    /// All spheres, in their canonical order
    pub const ALL: [TaxSphere; 4] = [
        TaxSphere::NonProfit,
        TaxSphere::AssetManagement,
        TaxSphere::PurposeOperations,
        TaxSphere::CommercialOperations,
    ];

    /// The wire string for this sphere
    pub const fn as_str(&self) -> &'static str {
        match self {
            TaxSphere::NonProfit => "non-profit",
            TaxSphere::AssetManagement => "asset-management",
            TaxSphere::PurposeOperations => "purpose-operations",
            TaxSphere::CommercialOperations => "commercial-operations",
        }
    }

    /// The German accounting label
    pub const fn label_de(&self) -> &'static str {
        match self {
            TaxSphere::NonProfit => "Ideeller Bereich",
            TaxSphere::AssetManagement => "Vermögensverwaltung",
            TaxSphere::PurposeOperations => "Zweckbetrieb",
            TaxSphere::CommercialOperations => "Wirtschaftlicher Geschäftsbetrieb",
        }
    }
}

impl fmt::Display for TaxSphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifier of a category in the fixed taxonomy (a slug like "raummiete")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    /// Wrap a taxonomy slug
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    /// The underlying slug
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CategoryId {
    fn from(slug: &str) -> Self {
        Self(slug.to_string())
    }
}

/// An expense/income category from the shared taxonomy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Taxonomy slug, unique across the table
    pub id: CategoryId,

    /// Display label (German)
    pub name: String,

    /// Short description of what belongs in this category
    #[serde(default)]
    pub description: String,

    /// The single tax sphere this category books into
    pub taxsphere: TaxSphere,
}

impl Category {
    /// Create a new category
    pub fn new(
        id: impl Into<CategoryId>,
        name: impl Into<String>,
        taxsphere: TaxSphere,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            taxsphere,
        }
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl From<String> for CategoryId {
    fn from(slug: String) -> Self {
        Self(slug)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_sphere_wire_strings() {
        assert_eq!(
            serde_json::to_string(&TaxSphere::NonProfit).unwrap(),
            "\"non-profit\""
        );
        assert_eq!(
            serde_json::to_string(&TaxSphere::AssetManagement).unwrap(),
            "\"asset-management\""
        );
        assert_eq!(
            serde_json::to_string(&TaxSphere::PurposeOperations).unwrap(),
            "\"purpose-operations\""
        );
        assert_eq!(
            serde_json::to_string(&TaxSphere::CommercialOperations).unwrap(),
            "\"commercial-operations\""
        );
    }

    #[test]
    fn test_tax_sphere_roundtrip() {
        for sphere in TaxSphere::ALL {
            let json = serde_json::to_string(&sphere).unwrap();
            let back: TaxSphere = serde_json::from_str(&json).unwrap();
            assert_eq!(sphere, back);
            assert_eq!(json, format!("\"{}\"", sphere.as_str()));
        }
    }

    #[test]
    fn test_category_id_transparent() {
        let id = CategoryId::new("raummiete");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"raummiete\"");
    }

    #[test]
    fn test_category_construction() {
        let cat = Category::new("raummiete", "Raummiete", TaxSphere::NonProfit)
            .with_description("Miete für Veranstaltungsräume");
        assert_eq!(cat.id.as_str(), "raummiete");
        assert_eq!(cat.taxsphere, TaxSphere::NonProfit);
        assert!(!cat.description.is_empty());
    }
}
