use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

/// Brands known a priori to sell through multiple storefronts.
///
/// Entries are lowercase; comparison is space- and hyphen-insensitive, so
/// `"3D-MAXpider"` and `"3d maxpider"` both resolve to the same entry.
/// Extend via `config/brands.yaml` rather than editing this table.
const BUILTIN_BRANDS: &[&str] = &[
    "3d maxpider",
    "abstract ocean",
    "adreama",
    "basenor",
    "bestevmod",
    "carwiner",
    "enjoyev",
    "evannex",
    "evbase",
    "evfit",
    "hansshow",
    "jeda",
    "jowua",
    "kenriko",
    "lasfit",
    "maier",
    "maxmat",
    "motrobe",
    "nillkin",
    "ohuhu",
    "pimpmyev",
    "rpmtesla",
    "satonic",
    "spigen",
    "t sportline",
    "taptes",
    "tesbros",
    "tesery",
    "teslahubs",
    "teslaunch",
    "tesmanian",
    "tessories",
    "tlyard",
    "topabyte",
    "topfit",
    "tuxmat",
    "unplugged performance",
    "weathertech",
    "xpel",
    "yeslak",
];

/// Subset of the registry whose catalog is floor/cargo mats sold in several
/// named material lines (e.g. Kagu vs. Elegant). For these brands a material
/// difference distinguishes products that are otherwise described identically.
const BUILTIN_MAT_SPECIALISTS: &[&str] = &[
    "3d maxpider",
    "lasfit",
    "maxmat",
    "tuxmat",
    "weathertech",
];

/// One brand entry in `config/brands.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct BrandEntry {
    pub name: String,
    #[serde(default)]
    pub mat_specialist: bool,
}

#[derive(Debug, Deserialize)]
struct BrandsFile {
    brands: Vec<BrandEntry>,
}

/// Registry of known multi-store brands.
///
/// Purely data: the clustering engine only asks membership questions, so the
/// set can grow without touching algorithm code.
#[derive(Debug, Clone)]
pub struct BrandRegistry {
    /// Canonical lowercase names, for display and iteration.
    names: Vec<String>,
    /// Compacted (space/hyphen-free) forms, index-aligned with `names`.
    compact: Vec<String>,
    /// Compacted forms of mat-specialist brands.
    mat_specialists: Vec<String>,
}

impl BrandRegistry {
    /// Registry containing only the built-in brand table.
    #[must_use]
    pub fn builtin() -> Self {
        let names: Vec<String> = BUILTIN_BRANDS.iter().map(|b| (*b).to_string()).collect();
        let compact = names.iter().map(|n| compact_brand(n)).collect();
        let mat_specialists = BUILTIN_MAT_SPECIALISTS
            .iter()
            .map(|b| compact_brand(b))
            .collect();
        Self {
            names,
            compact,
            mat_specialists,
        }
    }

    /// Built-in registry extended with the entries from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed, or fails
    /// validation (empty names, duplicates against the file or the built-in
    /// table).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::BrandsFileIo {
            path: path.display().to_string(),
            source: e,
        })?;
        let file: BrandsFile = serde_yaml::from_str(&content)?;

        let mut registry = Self::builtin();
        registry.extend(file.brands)?;
        Ok(registry)
    }

    /// Add entries to the registry, validating as the file loader does.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` on empty names or duplicates.
    pub fn extend(&mut self, entries: Vec<BrandEntry>) -> Result<(), ConfigError> {
        let mut seen: HashSet<String> = self.compact.iter().cloned().collect();

        for entry in entries {
            let name = entry.name.trim().to_lowercase();
            if name.is_empty() {
                return Err(ConfigError::Validation(
                    "brand name must be non-empty".to_string(),
                ));
            }
            let compacted = compact_brand(&name);
            if !seen.insert(compacted.clone()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate brand name: '{name}'"
                )));
            }
            if entry.mat_specialist {
                self.mat_specialists.push(compacted.clone());
            }
            self.names.push(name);
            self.compact.push(compacted);
        }
        Ok(())
    }

    /// Whether `brand` contains a known registry entry.
    ///
    /// Containment is checked on the compacted forms, so spacing and
    /// hyphenation differences do not matter.
    #[must_use]
    pub fn is_known(&self, brand: &str) -> bool {
        let compacted = compact_brand(brand);
        if compacted.is_empty() {
            return false;
        }
        self.compact.iter().any(|e| compacted.contains(e.as_str()))
    }

    /// Whether `brand` contains a mat-specialist registry entry.
    #[must_use]
    pub fn is_mat_specialist(&self, brand: &str) -> bool {
        let compacted = compact_brand(brand);
        if compacted.is_empty() {
            return false;
        }
        self.mat_specialists
            .iter()
            .any(|e| compacted.contains(e.as_str()))
    }

    /// First registry entry contained in `text`, as its canonical name.
    ///
    /// Used to recover a brand from a listing title when the vendor field is
    /// absent or unusable.
    #[must_use]
    pub fn find_in(&self, text: &str) -> Option<&str> {
        let compacted = compact_brand(text);
        if compacted.is_empty() {
            return None;
        }
        self.compact
            .iter()
            .position(|e| compacted.contains(e.as_str()))
            .map(|idx| self.names[idx].as_str())
    }

    /// Canonical brand names, in registry order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl Default for BrandRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Lowercase a brand string and drop spaces and hyphens.
fn compact_brand(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_contains_known_brand() {
        let registry = BrandRegistry::builtin();
        assert!(registry.is_known("3d maxpider"));
        assert!(registry.is_known("taptes"));
    }

    #[test]
    fn is_known_tolerates_spacing_and_hyphens() {
        let registry = BrandRegistry::builtin();
        assert!(registry.is_known("3D-MAXpider"));
        assert!(registry.is_known("3dmaxpider"));
        assert!(registry.is_known("T Sportline"));
        assert!(registry.is_known("t-sportline"));
    }

    #[test]
    fn is_known_matches_by_containment() {
        let registry = BrandRegistry::builtin();
        assert!(registry.is_known("tesmanian official"));
    }

    #[test]
    fn unknown_brand_is_not_known() {
        let registry = BrandRegistry::builtin();
        assert!(!registry.is_known("some random shop"));
        assert!(!registry.is_known(""));
    }

    #[test]
    fn mat_specialist_subset() {
        let registry = BrandRegistry::builtin();
        assert!(registry.is_mat_specialist("3d maxpider"));
        assert!(registry.is_mat_specialist("tuxmat"));
        assert!(!registry.is_mat_specialist("taptes"));
        assert!(!registry.is_mat_specialist(""));
    }

    #[test]
    fn find_in_returns_canonical_name() {
        let registry = BrandRegistry::builtin();
        let found = registry.find_in("3d maxpider kagu floormat modely");
        assert_eq!(found, Some("3d maxpider"));
        assert!(registry.find_in("generic no name floor mat").is_none());
    }

    #[test]
    fn extend_rejects_empty_name() {
        let mut registry = BrandRegistry::builtin();
        let err = registry
            .extend(vec![BrandEntry {
                name: "  ".to_string(),
                mat_specialist: false,
            }])
            .unwrap_err();
        assert!(err.to_string().contains("non-empty"));
    }

    #[test]
    fn extend_rejects_duplicate_of_builtin() {
        let mut registry = BrandRegistry::builtin();
        let err = registry
            .extend(vec![BrandEntry {
                name: "3D MAXpider".to_string(),
                mat_specialist: true,
            }])
            .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn extend_adds_new_brand_and_specialist_flag() {
        let mut registry = BrandRegistry::builtin();
        registry
            .extend(vec![BrandEntry {
                name: "cybermat".to_string(),
                mat_specialist: true,
            }])
            .expect("extend failed");
        assert!(registry.is_known("cybermat"));
        assert!(registry.is_mat_specialist("cybermat"));
    }

    #[test]
    fn load_brands_from_real_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("config")
            .join("brands.yaml");
        assert!(
            path.exists(),
            "brands.yaml missing at {path:?} — required for this test"
        );
        let registry = BrandRegistry::load(&path);
        assert!(registry.is_ok(), "failed to load brands.yaml: {registry:?}");
        let registry = registry.unwrap();
        assert!(registry.names().count() > BUILTIN_BRANDS.len());
    }
}
