//! Catalog loading from JSON/YAML documents.

use serde::Serialize;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use super::schema::validate_catalog_schema;
use crate::criteria::FilterCriteria;
use crate::filter::filter_products;
use crate::types::{LoanProduct, ProductListing};

/// Errors that can occur when loading a catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Catalog failed schema validation: {}", .0.join("; "))]
    Schema(Vec<String>),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// An immutable snapshot of loan products, in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    products: Vec<LoanProduct>,
}

impl Catalog {
    /// Build a catalog from records that are already typed.
    pub fn new(products: Vec<LoanProduct>) -> Result<Self, CatalogError> {
        let catalog = Self { products };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse a catalog from a JSON array of products.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Parse a catalog from a YAML sequence of products.
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let value: serde_json::Value = serde_yaml::from_str(yaml)?;
        Self::from_value(value)
    }

    /// Schema-check and deserialize an already parsed document.
    pub fn from_value(value: serde_json::Value) -> Result<Self, CatalogError> {
        validate_catalog_schema(&value).map_err(CatalogError::Schema)?;
        let products: Vec<LoanProduct> = serde_json::from_value(value)?;
        Self::new(products)
    }

    /// Load a catalog file. `.yaml`/`.yml` parse as YAML, anything else as JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        let catalog = if is_yaml {
            Self::from_yaml(&contents)?
        } else {
            Self::from_json(&contents)?
        };

        debug!(path = %path.display(), products = catalog.len(), "Loaded catalog");
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        for (index, product) in self.products.iter().enumerate() {
            if product.name.trim().is_empty() {
                return Err(CatalogError::MissingField(format!("[{}].name", index)));
            }
        }
        Ok(())
    }

    /// All products, in document order.
    pub fn products(&self) -> &[LoanProduct] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LoanProduct> {
        self.products.iter()
    }

    /// Filter the catalog. `None` returns every product.
    pub fn filter(&self, criteria: Option<&FilterCriteria>) -> Vec<LoanProduct> {
        filter_products(&self.products, criteria)
    }

    /// Filter the catalog and wrap the result as `{ total, products }`.
    pub fn listing(&self, criteria: Option<&FilterCriteria>) -> ProductListing {
        ProductListing::from(self.filter(criteria))
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a LoanProduct;
    type IntoIter = std::slice::Iter<'a, LoanProduct>;

    fn into_iter(self) -> Self::IntoIter {
        self.products.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Program, RateType, Tier};

    const CATALOG_JSON: &str = r#"[
        {
            "name": "Conventional 30yr Fixed Elite",
            "program": "CONV",
            "tier": "ELITE",
            "balance_bucket": "STANDARD",
            "construction_type": "EXISTING",
            "arm_or_fixed": "FIXED",
            "rate": 6.125,
            "price_15_day": 100.5,
            "price_30_day": 100.25,
            "price_45_day": 100.0,
            "term": "21-30",
            "lender": "Harbor Mortgage"
        },
        {
            "name": "FHA 30yr Fixed",
            "program": "FHA",
            "tier": "STANDARD",
            "balance_bucket": "STANDARD",
            "construction_type": "EXISTING",
            "arm_or_fixed": "FIXED",
            "rate": 6.25,
            "price_15_day": 100.75,
            "price_30_day": 100.5,
            "price_45_day": 100.25,
            "term": "30",
            "lender": "Summit Home Loans"
        }
    ]"#;

    const CATALOG_YAML: &str = r#"
- name: Conventional 5/6 ARM
  program: CONV
  tier: STANDARD
  balance_bucket: JUMBO
  construction_type: EXISTING
  arm_or_fixed: ARM
  rate: 5.875
  price_15_day: 100.25
  price_30_day: 100.0
  price_45_day: 99.75
  term: "5/6"
  lender: Harbor Mortgage
"#;

    #[test]
    fn test_parse_json_catalog() {
        let catalog = Catalog::from_json(CATALOG_JSON).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.products()[0].tier, Tier::Elite);
        assert_eq!(catalog.products()[1].program, Program::Fha);
    }

    #[test]
    fn test_parse_yaml_catalog() {
        let catalog = Catalog::from_yaml(CATALOG_YAML).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.products()[0].arm_or_fixed, RateType::Arm);
        assert_eq!(catalog.products()[0].term, "5/6");
    }

    #[test]
    fn test_schema_violation_is_reported() {
        let json = CATALOG_JSON.replace("\"FHA\"", "\"HELOC\"");
        let result = Catalog::from_json(&json);
        assert!(matches!(result, Err(CatalogError::Schema(ref errors)) if errors.len() == 1));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Catalog::from_json("[{"),
            Err(CatalogError::JsonError(_))
        ));
    }

    #[test]
    fn test_blank_name_rejected() {
        let json = CATALOG_JSON.replace("\"FHA 30yr Fixed\"", "\"   \"");
        assert!(matches!(
            Catalog::from_json(&json),
            Err(CatalogError::MissingField(ref field)) if field == "[1].name"
        ));
    }

    #[test]
    fn test_listing() {
        let catalog = Catalog::from_json(CATALOG_JSON).unwrap();

        let all = catalog.listing(None);
        assert_eq!(all.total, 2);

        let criteria = FilterCriteria::new().with_fha_loans(true).with_loan_term(30);
        let listing = catalog.listing(Some(&criteria));
        assert_eq!(listing.total, 2);

        let listing = catalog.listing(Some(&FilterCriteria::new()));
        assert_eq!(listing.total, 1);
        assert_eq!(listing.products[0].name, "Conventional 30yr Fixed Elite");
    }

    #[test]
    fn test_catalog_serializes_as_array() {
        let catalog = Catalog::from_yaml(CATALOG_YAML).unwrap();
        let value = serde_json::to_value(&catalog).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["balance_bucket"], "JUMBO");
    }

    #[test]
    fn test_from_path_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("catalog.YML");
        std::fs::write(&yaml_path, CATALOG_YAML).unwrap();
        let catalog = Catalog::from_path(&yaml_path).unwrap();
        assert_eq!(catalog.products()[0].balance_bucket, crate::types::BalanceBucket::Jumbo);

        // No extension: read as JSON
        let json_path = dir.path().join("catalog");
        std::fs::write(&json_path, CATALOG_JSON).unwrap();
        assert_eq!(Catalog::from_path(&json_path).unwrap().len(), 2);

        // YAML content behind a JSON name is a JSON error
        let misnamed = dir.path().join("catalog.json");
        std::fs::write(&misnamed, CATALOG_YAML).unwrap();
        assert!(matches!(
            Catalog::from_path(&misnamed),
            Err(CatalogError::JsonError(_))
        ));
    }

    #[test]
    fn test_from_path_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Catalog::from_path(dir.path().join("missing.json"));
        assert!(matches!(result, Err(CatalogError::IoError(_))));
    }
}
