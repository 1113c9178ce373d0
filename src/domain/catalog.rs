//! Static FRED series catalog.
//!
//! Read-only configuration mapping `(category, country)` to a FRED series id.
//! The catalog is held as an explicit value inside `PipelineConfig` so that
//! fetch/clean/merge entry points receive it as an input instead of reading a
//! module-level global.

use crate::domain::SeriesCategory;

/// One catalog entry: a country's series id within a category.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub category: SeriesCategory,
    pub country: String,
    pub series_id: String,
}

/// The set of quarterly macro series the pipeline knows about.
#[derive(Debug, Clone)]
pub struct SeriesCatalog {
    entries: Vec<CatalogEntry>,
}

/// Quarterly core CPI (OECD, excluding food and energy) and nominal GDP.
const DEFAULT_SERIES: &[(SeriesCategory, &str, &str)] = &[
    (SeriesCategory::Cpi, "New Zealand", "NZLCPICORQINMEI"),
    (SeriesCategory::Cpi, "Australia", "AUSCPICORQINMEI"),
    (SeriesCategory::Cpi, "United Kingdom", "GBRCPICORQINMEI"),
    (SeriesCategory::Cpi, "United States", "USACPICORQINMEI"),
    (SeriesCategory::Cpi, "Germany", "DEUCPICORQINMEI"),
    (SeriesCategory::Cpi, "France", "FRACPICORQINMEI"),
    (SeriesCategory::Cpi, "Japan", "JPNCPICORQINMEI"),
    (SeriesCategory::Cpi, "Canada", "CANCPICORQINMEI"),
    (SeriesCategory::Cpi, "South Korea", "KORCPICORQINMEI"),
    (SeriesCategory::Cpi, "Sweden", "SWECPICORQINMEI"),
    (SeriesCategory::Gdp, "New Zealand", "NZLGDPNQDSMEI"),
    (SeriesCategory::Gdp, "Australia", "AUSGDPNQDSMEI"),
    (SeriesCategory::Gdp, "United Kingdom", "UKNGDP"),
    (SeriesCategory::Gdp, "United States", "GDP"),
    (SeriesCategory::Gdp, "Germany", "CPMNACNSAB1GQDE"),
    (SeriesCategory::Gdp, "France", "CPMNACSCAB1GQFR"),
    (SeriesCategory::Gdp, "Japan", "JPNNGDP"),
    (SeriesCategory::Gdp, "Canada", "CANGDPNQDSMEI"),
    (SeriesCategory::Gdp, "South Korea", "NAEXKP01KRQ661S"),
    (SeriesCategory::Gdp, "Sweden", "CLVMNACSCAB1GQSE"),
];

impl Default for SeriesCatalog {
    fn default() -> Self {
        let entries = DEFAULT_SERIES
            .iter()
            .map(|&(category, country, series_id)| CatalogEntry {
                category,
                country: country.to_string(),
                series_id: series_id.to_string(),
            })
            .collect();
        Self { entries }
    }
}

impl SeriesCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Entries belonging to one category, in catalog order.
    pub fn category(&self, category: SeriesCategory) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(move |e| e.category == category)
    }

    /// Country labels for one category, in catalog order.
    pub fn countries(&self, category: SeriesCategory) -> Vec<String> {
        self.category(category).map(|e| e.country.clone()).collect()
    }

    /// Series id for a `(category, country)` pair.
    pub fn series_id(&self, category: SeriesCategory, country: &str) -> Option<&str> {
        self.category(category)
            .find(|e| e.country == country)
            .map(|e| e.series_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_ten_countries_per_category() {
        let catalog = SeriesCatalog::default();
        assert_eq!(catalog.countries(SeriesCategory::Cpi).len(), 10);
        assert_eq!(catalog.countries(SeriesCategory::Gdp).len(), 10);
    }

    #[test]
    fn series_id_lookup() {
        let catalog = SeriesCatalog::default();
        assert_eq!(
            catalog.series_id(SeriesCategory::Cpi, "New Zealand"),
            Some("NZLCPICORQINMEI")
        );
        assert_eq!(catalog.series_id(SeriesCategory::Gdp, "United States"), Some("GDP"));
        assert_eq!(catalog.series_id(SeriesCategory::Cpi, "Atlantis"), None);
    }
}
