//! Unit-size catalog, size categories and the box record.

use crate::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Size of a storage unit in tenths of a square metre.
///
/// Catalog sizes such as 1.5 m² and 2.5 m² are kept as integers so they can
/// key ordered maps and compare exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSize", into = "String")]
pub struct UnitSize(u16);

impl UnitSize {
    /// The smallest size in any catalog (1 m²), used for top-up fills.
    pub const SMALLEST: UnitSize = UnitSize(10);

    pub const fn from_tenths(tenths: u16) -> Self {
        UnitSize(tenths)
    }

    /// Converts an area in m² to a size if it is a whole number of tenths.
    pub fn from_area(area: f64) -> Option<Self> {
        if !area.is_finite() || area <= 0.0 {
            return None;
        }
        let tenths = (area * 10.0).round();
        if (tenths / 10.0 - area).abs() > 1e-9 || tenths > u16::MAX as f64 {
            return None;
        }
        Some(UnitSize(tenths as u16))
    }

    /// Parses "2.5" or "2,5".
    pub fn parse(raw: &str) -> Option<Self> {
        let cleaned = raw.trim().replace(',', ".");
        cleaned.parse::<f64>().ok().and_then(Self::from_area)
    }

    pub fn tenths(self) -> u16 {
        self.0
    }

    /// Area in m².
    pub fn area(self) -> f64 {
        f64::from(self.0) / 10.0
    }
}

impl fmt::Display for UnitSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 10 == 0 {
            write!(f, "{}", self.0 / 10)
        } else {
            write!(f, "{}.{}", self.0 / 10, self.0 % 10)
        }
    }
}

impl From<UnitSize> for String {
    fn from(size: UnitSize) -> Self {
        size.to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSize {
    Number(f64),
    Text(String),
}

impl TryFrom<RawSize> for UnitSize {
    type Error = String;

    fn try_from(raw: RawSize) -> Result<Self, Self::Error> {
        match raw {
            RawSize::Number(n) => {
                UnitSize::from_area(n).ok_or_else(|| format!("invalid unit size: {n}"))
            }
            RawSize::Text(s) => UnitSize::parse(&s).ok_or_else(|| format!("invalid unit size: {s}")),
        }
    }
}

const SMALL_SIZES: [UnitSize; 5] = [
    UnitSize(10),
    UnitSize(15),
    UnitSize(20),
    UnitSize(25),
    UnitSize(30),
];
const MEDIUM_SIZES: [UnitSize; 4] = [UnitSize(40), UnitSize(50), UnitSize(60), UnitSize(70)];
const LARGE_SIZES: [UnitSize; 4] = [UnitSize(80), UnitSize(100), UnitSize(120), UnitSize(150)];

// Fraction of a category's target area assigned to each size; each table sums to 1.
const SMALL_WEIGHTS: [(UnitSize, f64); 5] = [
    (UnitSize(10), 0.15),
    (UnitSize(15), 0.20),
    (UnitSize(20), 0.35),
    (UnitSize(25), 0.20),
    (UnitSize(30), 0.10),
];
const MEDIUM_WEIGHTS: [(UnitSize, f64); 4] = [
    (UnitSize(40), 0.40),
    (UnitSize(50), 0.30),
    (UnitSize(60), 0.20),
    (UnitSize(70), 0.10),
];
const LARGE_WEIGHTS: [(UnitSize, f64); 4] = [
    (UnitSize(80), 0.50),
    (UnitSize(100), 0.30),
    (UnitSize(120), 0.15),
    (UnitSize(150), 0.05),
];

/// Size category of a storage unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// 1–3 m² lockers.
    Small,
    /// 4–7 m² rooms.
    Medium,
    /// 8–15 m² garages.
    Large,
}

impl Category {
    /// Generation order: large, then medium, then small.
    pub const ALL: [Category; 3] = [Category::Large, Category::Medium, Category::Small];

    /// Allowed sizes, ascending.
    pub fn catalog(self) -> &'static [UnitSize] {
        match self {
            Category::Small => &SMALL_SIZES,
            Category::Medium => &MEDIUM_SIZES,
            Category::Large => &LARGE_SIZES,
        }
    }

    /// Default weighted distribution used by automatic generation.
    pub fn default_weights(self) -> &'static [(UnitSize, f64)] {
        match self {
            Category::Small => &SMALL_WEIGHTS,
            Category::Medium => &MEDIUM_WEIGHTS,
            Category::Large => &LARGE_WEIGHTS,
        }
    }

    /// Clear opening width of the unit's door in metres.
    ///
    /// Large units use 2.0 m for both roller and double hinged doors.
    pub fn door_width(self) -> f64 {
        match self {
            Category::Small => 0.75,
            Category::Medium => 1.0,
            Category::Large => 2.0,
        }
    }

    pub fn offers(self, size: UnitSize) -> bool {
        self.catalog().contains(&size)
    }

    /// Category whose catalog contains `size`. Catalogs are disjoint.
    pub fn of_size(size: UnitSize) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.offers(size))
    }

    pub fn parse(raw: &str) -> Option<Category> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "small" => Some(Category::Small),
            "medium" => Some(Category::Medium),
            "large" => Some(Category::Large),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Small => "small",
            Category::Medium => "medium",
            Category::Large => "large",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One physical storage unit. Identity is its index in the inventory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BoxRecord {
    category: Category,
    size: UnitSize,
}

impl BoxRecord {
    /// Creates a record, rejecting sizes outside the category catalog.
    pub fn new(category: Category, size: UnitSize) -> Result<Self, ValidationError> {
        if !category.offers(size) {
            return Err(ValidationError::SizeNotInCatalog { category, size });
        }
        Ok(BoxRecord { category, size })
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn size(&self) -> UnitSize {
        self.size
    }

    /// Area in m².
    pub fn area(&self) -> f64 {
        self.size.area()
    }
}

/// Per-category unit counts entered by the user or extracted from a document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManualCounts {
    pub small: BTreeMap<UnitSize, u32>,
    pub medium: BTreeMap<UnitSize, u32>,
    pub large: BTreeMap<UnitSize, u32>,
}

impl ManualCounts {
    pub fn for_category(&self, category: Category) -> &BTreeMap<UnitSize, u32> {
        match category {
            Category::Small => &self.small,
            Category::Medium => &self.medium,
            Category::Large => &self.large,
        }
    }

    /// Sets the count of one size. A zero count removes the entry.
    pub fn set(
        &mut self,
        category: Category,
        size: UnitSize,
        count: u32,
    ) -> Result<(), ValidationError> {
        if !category.offers(size) {
            return Err(ValidationError::SizeNotInCatalog { category, size });
        }
        let map = match category {
            Category::Small => &mut self.small,
            Category::Medium => &mut self.medium,
            Category::Large => &mut self.large,
        };
        if count == 0 {
            map.remove(&size);
        } else {
            map.insert(size, count);
        }
        Ok(())
    }

    pub fn units(&self, category: Category) -> u32 {
        self.for_category(category)
            .values()
            .fold(0u32, |acc, &n| acc.saturating_add(n))
    }

    /// Total area of the counted units of one category, in m².
    pub fn area(&self, category: Category) -> f64 {
        self.for_category(category)
            .iter()
            .map(|(size, &n)| size.area() * f64::from(n))
            .sum()
    }

    pub fn total_units(&self) -> u32 {
        Category::ALL
            .into_iter()
            .fold(0u32, |acc, c| acc.saturating_add(self.units(c)))
    }

    /// True when no category holds a nonzero count.
    pub fn is_empty(&self) -> bool {
        self.total_units() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_parse_and_display() {
        assert_eq!(UnitSize::parse("2.5"), Some(UnitSize::from_tenths(25)));
        assert_eq!(UnitSize::parse("2,5"), Some(UnitSize::from_tenths(25)));
        assert_eq!(UnitSize::parse("abc"), None);
        assert_eq!(UnitSize::parse("-4"), None);
        assert_eq!(UnitSize::from_tenths(150).to_string(), "15");
        assert_eq!(UnitSize::from_tenths(15).to_string(), "1.5");
        assert_eq!(UnitSize::from_tenths(25).area(), 2.5);
    }

    #[test]
    fn weights_sum_to_one() {
        for c in Category::ALL {
            let sum: f64 = c.default_weights().iter().map(|(_, w)| w).sum();
            assert!((sum - 1.0).abs() < 1e-12, "{c} weights sum to {sum}");
            for (size, _) in c.default_weights() {
                assert!(c.offers(*size));
            }
        }
    }

    #[test]
    fn catalogs_are_disjoint() {
        assert_eq!(Category::of_size(UnitSize::from_tenths(30)), Some(Category::Small));
        assert_eq!(Category::of_size(UnitSize::from_tenths(70)), Some(Category::Medium));
        assert_eq!(Category::of_size(UnitSize::from_tenths(150)), Some(Category::Large));
        assert_eq!(Category::of_size(UnitSize::from_tenths(35)), None);
        assert_eq!(UnitSize::SMALLEST, Category::Small.catalog()[0]);
    }

    #[test]
    fn box_record_rejects_off_catalog_size() {
        let err = BoxRecord::new(Category::Small, UnitSize::from_tenths(80)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::SizeNotInCatalog {
                category: Category::Small,
                size: UnitSize::from_tenths(80)
            }
        );
        let b = BoxRecord::new(Category::Large, UnitSize::from_tenths(80)).unwrap();
        assert_eq!(b.area(), 8.0);
        assert_eq!(b.category(), Category::Large);
    }

    #[test]
    fn manual_counts_totals() {
        let mut m = ManualCounts::default();
        m.set(Category::Small, UnitSize::from_tenths(15), 4).unwrap();
        m.set(Category::Large, UnitSize::from_tenths(100), 2).unwrap();
        assert!(m.set(Category::Medium, UnitSize::from_tenths(10), 1).is_err());
        assert_eq!(m.units(Category::Small), 4);
        assert_eq!(m.area(Category::Small), 6.0);
        assert_eq!(m.area(Category::Large), 20.0);
        assert_eq!(m.total_units(), 6);
        m.set(Category::Small, UnitSize::from_tenths(15), 0).unwrap();
        m.set(Category::Large, UnitSize::from_tenths(100), 0).unwrap();
        assert!(m.is_empty());
    }

    #[test]
    fn manual_counts_serde_roundtrip() {
        let mut m = ManualCounts::default();
        m.set(Category::Small, UnitSize::from_tenths(25), 3).unwrap();
        let s = serde_json::to_string(&m).unwrap();
        assert!(s.contains("\"2.5\":3"));
        let back: ManualCounts = serde_json::from_str(&s).unwrap();
        assert_eq!(back, m);
    }
}
