//! Read-only category lookup
//!
//! The category taxonomy (labels and tax-sphere tags) is shared static
//! data rather than a per-organization store. Consumers inject it through
//! the `CategoryCatalog` trait so a deployment can override the table
//! without touching the engine.

use crate::models::{Category, CategoryId, TaxSphere};

/// Read-only lookup of the category taxonomy
pub trait CategoryCatalog {
    /// Resolve a category by its slug
    fn resolve(&self, id: &CategoryId) -> Option<&Category>;

    /// All categories, in table order
    fn all(&self) -> &[Category];

    /// Display label for a category, falling back to the raw slug
    fn label(&self, id: &CategoryId) -> String {
        self.resolve(id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| id.as_str().to_string())
    }
}

/// The built-in German nonprofit category table
pub struct StaticCatalog {
    categories: Vec<Category>,
}

impl StaticCatalog {
    /// Build a catalog from an explicit table
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// The standard table shipped with the engine
    pub fn standard() -> Self {
        use TaxSphere::*;

        Self::new(vec![
            // Verpflegung
            Category::new("essen-catering", "Essen/Catering", PurposeOperations)
                .with_description("Kosten für Speisen und Catering-Service"),
            Category::new("getraenke-alkoholfrei", "Getränke (alkoholfrei)", PurposeOperations)
                .with_description("Wasser, Säfte, Softdrinks"),
            Category::new("getraenke-alkoholisch", "Getränke (alkoholisch)", CommercialOperations)
                .with_description("Bier, Wein, Spirituosen"),
            Category::new("helfer-verpflegung", "Helfer-Verpflegung", NonProfit)
                .with_description("Verpflegung für ehrenamtliche Helfer"),
            // Location & Infrastruktur
            Category::new("raummiete", "Raummiete", NonProfit)
                .with_description("Miete für Veranstaltungsräume"),
            Category::new("nebenkosten", "Nebenkosten (Reinigung, Energie)", NonProfit)
                .with_description("Zusätzliche Kosten für Reinigung und Energie"),
            Category::new("technik", "Technik (Beamer, Mikrofone, Leinwand)", PurposeOperations)
                .with_description("Grundlegende Veranstaltungstechnik"),
            Category::new("kaution", "Kaution", AssetManagement)
                .with_description("Sicherheitskaution für Location"),
            // Personal & Honorare
            Category::new("honorare", "Honorare (Referenten, Künstler)", PurposeOperations)
                .with_description("Vergütung für Referenten und Künstler"),
            Category::new("reisekosten", "Reisekosten", NonProfit)
                .with_description("Fahrt- und Übernachtungskosten"),
            // Einnahmen
            Category::new("spenden-eingang", "Spendeneingang", NonProfit)
                .with_description("Eingehende Spenden"),
            Category::new("mitgliedsbeitraege", "Mitgliedsbeiträge", NonProfit)
                .with_description("Beiträge der Vereinsmitglieder"),
            Category::new("ticketverkauf", "Ticketverkauf", PurposeOperations)
                .with_description("Einnahmen aus Eintrittskarten"),
            Category::new("sponsoring", "Sponsoring", CommercialOperations)
                .with_description("Werbeleistungen für Sponsoren"),
            Category::new("zinsertraege", "Zinserträge", AssetManagement)
                .with_description("Erträge aus Rücklagen"),
        ])
    }
}

impl CategoryCatalog for StaticCatalog {
    fn resolve(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }

    fn all(&self) -> &[Category] {
        &self.categories
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
