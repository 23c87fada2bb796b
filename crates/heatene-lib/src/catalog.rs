//! Legacy panel catalog and SKU matching.
//!
//! Panels are the fixed-wattage products the skirting range replaced. Quotes
//! can still be priced against them, so each market carries a small catalog,
//! and operators may load a replacement from CSV.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};

/// Relative slack on the match threshold so a target computed as
/// `rated / ratio` still selects `rated` despite rounding.
const MATCH_EPSILON: f64 = 1e-9;

/// One fixed-wattage product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductSku {
    pub name: String,
    /// Rated output in watts.
    pub wattage: f64,
    pub price: f64,
    /// Equivalent length of skirting, for comparison.
    pub metres: f64,
}

impl ProductSku {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Catalog {
                message: "product name must not be empty".to_string(),
            });
        }
        for (field, value) in [
            ("wattage", self.wattage),
            ("price", self.price),
            ("metres", self.metres),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Catalog {
                    message: format!(
                        "product '{}' has invalid {field}: {value}",
                        self.name
                    ),
                });
            }
        }
        if self.wattage <= 0.0 {
            return Err(Error::Catalog {
                message: format!("product '{}' must have positive wattage", self.name),
            });
        }
        Ok(())
    }
}

/// Non-empty set of SKUs in ascending wattage order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCatalog {
    skus: Vec<ProductSku>,
    source: Option<PathBuf>,
}

impl ProductCatalog {
    /// Validate, de-duplicate by name (case-insensitive) and sort by wattage.
    ///
    /// Equal wattages keep their input order.
    pub fn new(mut skus: Vec<ProductSku>) -> Result<Self> {
        if skus.is_empty() {
            return Err(Error::Catalog {
                message: "catalog must contain at least one product".to_string(),
            });
        }
        let mut seen = HashSet::new();
        for sku in &skus {
            sku.validate()?;
            let key = normalize_name(&sku.name);
            if !seen.insert(key.clone()) {
                return Err(Error::DuplicateSku { name: key });
            }
        }
        skus.sort_by(|a, b| a.wattage.total_cmp(&b.wattage));
        Ok(Self { skus, source: None })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = fs::File::open(path)?;
        let mut catalog = Self::from_reader(file)?;
        catalog.source = Some(path.to_path_buf());
        info!(
            path = %path.display(),
            products = catalog.skus.len(),
            "loaded product catalog"
        );
        Ok(catalog)
    }

    /// Read `name,wattage,price,metres` rows; header order and spelling are flexible.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new().trim(Trim::Fields).from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|err| Error::Catalog {
                message: format!("failed to read catalog headers: {err}"),
            })?
            .clone();

        let normalized: Vec<String> = headers.iter().map(normalize_header).collect();

        let synonyms: &[(&str, &[&str])] = &[
            ("name", &["name", "product", "product_name", "sku"]),
            ("wattage", &["wattage", "watts", "power_w", "rated_watts", "w"]),
            ("price", &["price", "unit_price", "cost"]),
            ("metres", &["metres", "meters", "length_m", "equivalent_metres"]),
        ];

        let mut index_map: BTreeMap<&str, usize> = BTreeMap::new();
        for (canon, alts) in synonyms {
            if let Some(i) = alts
                .iter()
                .find_map(|alt| normalized.iter().position(|h| *h == normalize_header(alt)))
            {
                index_map.insert(*canon, i);
            }
        }

        let missing: Vec<&str> = synonyms
            .iter()
            .map(|(canon, _)| *canon)
            .filter(|c| !index_map.contains_key(c))
            .collect();
        if !missing.is_empty() {
            return Err(Error::Catalog {
                message: format!(
                    "catalog missing required columns: {}. Available: {}",
                    missing.join(", "),
                    headers.iter().collect::<Vec<_>>().join(", ")
                ),
            });
        }

        let mut skus = Vec::new();
        for (offset, result) in csv_reader.records().enumerate() {
            let row = offset + 2;
            let record = result.map_err(|e| Error::Catalog {
                message: e.to_string(),
            })?;
            let get = |field: &str| -> &str {
                index_map
                    .get(field)
                    .and_then(|&i| record.get(i))
                    .unwrap_or_default()
            };

            let name = get("name").to_string();
            let number = |field: &str| -> Result<f64> {
                get(field).parse::<f64>().map_err(|e| Error::Catalog {
                    message: format!("invalid {field} for product '{name}' at row {row}: {e}"),
                })
            };

            skus.push(ProductSku {
                wattage: number("wattage")?,
                price: number("price")?,
                metres: number("metres")?,
                name: name.clone(),
            });
        }

        Self::new(skus)
    }

    /// SKUs in ascending wattage order.
    pub fn skus(&self) -> &[ProductSku] {
        &self.skus
    }

    pub fn largest(&self) -> &ProductSku {
        // `new` rejects empty catalogs.
        &self.skus[self.skus.len() - 1]
    }

    /// Case-insensitive lookup by product name.
    pub fn get(&self, name: &str) -> Option<&ProductSku> {
        let key = normalize_name(name);
        self.skus.iter().find(|s| normalize_name(&s.name) == key)
    }

    /// Smallest SKU rated at least `ratio` of `target_watts`, else the largest.
    ///
    /// The boundary is inclusive: a SKU rated exactly `ratio * target_watts`
    /// matches.
    pub fn select(&self, target_watts: f64, ratio: f64) -> Result<&ProductSku> {
        if !target_watts.is_finite() || target_watts < 0.0 {
            return Err(Error::invalid_input(format!(
                "target wattage must be finite and non-negative, got {target_watts}"
            )));
        }
        let threshold = ratio * target_watts;
        let slack = MATCH_EPSILON * target_watts.max(1.0);
        Ok(self
            .skus
            .iter()
            .find(|sku| sku.wattage + slack >= threshold)
            .unwrap_or_else(|| self.largest()))
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

fn normalize_header(s: &str) -> String {
    s.to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sku(name: &str, wattage: f64) -> ProductSku {
        ProductSku {
            name: name.to_string(),
            wattage,
            price: wattage / 2.0,
            metres: wattage / 70.0,
        }
    }

    fn catalog() -> ProductCatalog {
        ProductCatalog::new(vec![
            sku("P1000", 1000.0),
            sku("P400", 400.0),
            sku("P800", 800.0),
            sku("P600", 600.0),
        ])
        .expect("valid catalog")
    }

    #[test]
    fn catalog_is_sorted_ascending() {
        let watts: Vec<f64> = catalog().skus().iter().map(|s| s.wattage).collect();
        assert_eq!(watts, vec![400.0, 600.0, 800.0, 1000.0]);
    }

    #[test]
    fn boundary_match_is_inclusive() {
        let catalog = catalog();
        let target = 800.0 / 0.85;
        assert_eq!(catalog.select(target, 0.85).unwrap().name, "P800");
        assert_eq!(catalog.select(target + 1.0, 0.85).unwrap().name, "P1000");
    }

    #[test]
    fn oversized_target_returns_largest() {
        assert_eq!(catalog().select(5000.0, 0.85).unwrap().name, "P1000");
    }

    #[test]
    fn zero_target_returns_smallest() {
        assert_eq!(catalog().select(0.0, 0.85).unwrap().name, "P400");
        assert!(catalog().select(f64::NAN, 0.85).is_err());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = ProductCatalog::new(vec![sku("Panel", 400.0), sku("panel ", 600.0)]).unwrap_err();
        assert!(matches!(err, Error::DuplicateSku { name } if name == "panel"));
    }

    #[test]
    fn csv_header_synonyms_are_accepted() {
        let csv = "Product,Watts,Cost,Meters\nBig,900,450,12.9\nSmall,300,200,4.3\n";
        let catalog = ProductCatalog::from_reader(Cursor::new(csv)).expect("parses");
        assert_eq!(catalog.skus()[0].name, "Small");
        assert_eq!(catalog.get("BIG").map(|s| s.wattage), Some(900.0));
    }

    #[test]
    fn csv_missing_column_is_reported() {
        let csv = "name,wattage,price\nA,400,100\n";
        let err = ProductCatalog::from_reader(Cursor::new(csv)).unwrap_err();
        assert!(err.to_string().contains("metres"), "{err}");
    }
}
