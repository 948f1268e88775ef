//! Box inventory generation under an area budget.
//!
//! Placement is area-only: the generator decides how many units of each
//! catalog size exist, never where they stand.

use crate::area::{category_budgets, usable_area, CategoryBudgets};
use serde::Serialize;
use std::collections::BTreeMap;
use storage_core::{
    BoxRecord, Category, CategorySplit, Config, ManualCounts, UnitSize, ValidationError,
};
use tracing::{debug, info};

/// Manual counts may exceed a category budget by at most this much, m².
pub const OVERBUDGET_TOLERANCE: f64 = 0.01;

/// Tolerance on the "split sums to 100" check, absorbing float noise only.
const SPLIT_EPSILON: f64 = 1e-9;

/// Largest unit area a single generate will fill, m².
pub const MAX_UNIT_AREA: f64 = 1_000_000.0;

/// How the inventory is produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InventoryMode<'a> {
    /// Default weighted distribution per category.
    Automatic,
    /// Exactly the given counts, topped up with the smallest unit.
    Manual(&'a ManualCounts),
}

impl<'a> InventoryMode<'a> {
    /// Manual only when the manual toggle is on and some count is nonzero.
    pub fn select(config: &'a Config) -> Self {
        if config.manual_mode && !config.manual_counts.is_empty() {
            InventoryMode::Manual(&config.manual_counts)
        } else {
            InventoryMode::Automatic
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, InventoryMode::Manual(_))
    }
}

/// Ordered units, largest first.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Inventory {
    boxes: Vec<BoxRecord>,
    net_area: f64,
}

impl Inventory {
    fn from_boxes(mut boxes: Vec<BoxRecord>) -> Self {
        boxes.sort_by(|a, b| b.size().cmp(&a.size()));
        let net_area = boxes.iter().map(BoxRecord::area).sum();
        Inventory { boxes, net_area }
    }

    pub fn boxes(&self) -> &[BoxRecord] {
        &self.boxes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BoxRecord> {
        self.boxes.iter()
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Sum of all unit areas (PUM), m².
    pub fn net_area(&self) -> f64 {
        self.net_area
    }

    pub fn count(&self, category: Category) -> usize {
        self.boxes
            .iter()
            .filter(|b| b.category() == category)
            .count()
    }

    pub fn area(&self, category: Category) -> f64 {
        self.boxes
            .iter()
            .filter(|b| b.category() == category)
            .map(BoxRecord::area)
            .sum()
    }

    /// Units per catalog size.
    pub fn size_counts(&self) -> BTreeMap<UnitSize, usize> {
        let mut counts = BTreeMap::new();
        for b in &self.boxes {
            *counts.entry(b.size()).or_insert(0) += 1;
        }
        counts
    }

    /// Net over gross, percent. Zero for an empty hall.
    pub fn achieved_efficiency(&self, gross: f64) -> f64 {
        if gross <= 0.0 {
            0.0
        } else {
            self.net_area / gross * 100.0
        }
    }

    /// Everything that is not unit area: corridors and service space.
    pub fn corridor_area(&self, gross: f64) -> f64 {
        gross - self.net_area
    }
}

impl<'a> IntoIterator for &'a Inventory {
    type Item = &'a BoxRecord;
    type IntoIter = std::slice::Iter<'a, BoxRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.boxes.iter()
    }
}

/// Rejects splits that do not add up to exactly 100.
pub fn validate_split(split: &CategorySplit) -> Result<(), ValidationError> {
    let sum = split.sum();
    if (sum - 100.0).abs() > SPLIT_EPSILON {
        return Err(ValidationError::SplitNotHundred { sum });
    }
    Ok(())
}

/// Rejects manual counts whose area exceeds a category budget.
pub fn validate_manual_counts(
    counts: &ManualCounts,
    budgets: &CategoryBudgets,
) -> Result<(), ValidationError> {
    for category in Category::ALL {
        let area = counts.area(category);
        let budget = budgets.get(category);
        if area > budget + OVERBUDGET_TOLERANCE {
            return Err(ValidationError::CategoryOverBudget {
                category,
                area,
                budget,
            });
        }
    }
    Ok(())
}

/// Fills `usable_area` with units according to `mode`.
///
/// No validation against budgets happens here; see [`generate_inventory`].
/// Areas above [`MAX_UNIT_AREA`] are rejected before anything is allocated.
pub fn generate(
    usable_area: f64,
    split: &CategorySplit,
    mode: InventoryMode<'_>,
) -> Result<Inventory, ValidationError> {
    check_area(usable_area)?;
    if let InventoryMode::Manual(counts) = mode {
        check_area(Category::ALL.iter().map(|&c| counts.area(c)).sum())?;
    }
    let mut boxes = match mode {
        InventoryMode::Manual(counts) => fill_manual(counts)?,
        InventoryMode::Automatic => fill_automatic(usable_area, split)?,
    };
    let added = top_up(&mut boxes, usable_area)?;
    debug!(added, "topped up with smallest units");
    Ok(Inventory::from_boxes(boxes))
}

/// Validates the configuration and generates its inventory.
pub fn generate_inventory(config: &Config) -> Result<Inventory, ValidationError> {
    validate_split(&config.split)?;
    let mode = InventoryMode::select(config);
    if let InventoryMode::Manual(counts) = mode {
        validate_manual_counts(counts, &category_budgets(config))?;
    }
    let inventory = generate(usable_area(config), &config.split, mode)?;
    info!(
        manual = mode.is_manual(),
        units = inventory.len(),
        net_area = inventory.net_area(),
        "inventory generated"
    );
    Ok(inventory)
}

fn check_area(area: f64) -> Result<(), ValidationError> {
    if area <= MAX_UNIT_AREA {
        Ok(())
    } else {
        Err(ValidationError::AreaTooLarge {
            area,
            max: MAX_UNIT_AREA,
        })
    }
}

fn fill_manual(counts: &ManualCounts) -> Result<Vec<BoxRecord>, ValidationError> {
    let mut boxes = Vec::with_capacity(counts.total_units() as usize);
    for category in Category::ALL {
        for (&size, &n) in counts.for_category(category) {
            let record = BoxRecord::new(category, size)?;
            boxes.extend(std::iter::repeat(record).take(n as usize));
        }
    }
    Ok(boxes)
}

fn fill_automatic(
    usable_area: f64,
    split: &CategorySplit,
) -> Result<Vec<BoxRecord>, ValidationError> {
    let mut boxes = Vec::new();
    for category in Category::ALL {
        let target = usable_area * split.get(category) / 100.0;
        for &(size, weight) in category.default_weights() {
            let record = BoxRecord::new(category, size)?;
            let size_target = target * weight;
            let mut acc = 0.0;
            // Never overshoot the size's own sub-target.
            while acc + record.area() <= size_target {
                boxes.push(record);
                acc += record.area();
            }
        }
        debug!(%category, target, "category filled");
    }
    Ok(boxes)
}

/// Appends smallest units while a whole one still fits the usable area.
fn top_up(boxes: &mut Vec<BoxRecord>, usable_area: f64) -> Result<usize, ValidationError> {
    let smallest = BoxRecord::new(Category::Small, UnitSize::SMALLEST)?;
    let step = smallest.area();
    let mut remaining = usable_area - boxes.iter().map(BoxRecord::area).sum::<f64>();
    let mut added = 0;
    while remaining >= step {
        boxes.push(smallest);
        remaining -= step;
        added += 1;
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config_600() -> Config {
        let mut c = Config::default();
        c.hall.length = 30.0;
        c.hall.width = 20.0;
        c.target_efficiency = 70.0;
        c
    }

    fn size(tenths: u16) -> UnitSize {
        UnitSize::from_tenths(tenths)
    }

    #[test]
    fn automatic_fill_matches_weighted_targets() {
        let inv = generate_inventory(&config_600()).unwrap();
        let counts = inv.size_counts();
        // Large target 84 m²: 8 m² gets 42 m² -> five units.
        assert_eq!(counts.get(&size(80)), Some(&5));
        // 10 m² gets 25.2 m² -> two units; 12 m² gets 12.6 -> one; 15 m² gets 4.2 -> none.
        assert_eq!(counts.get(&size(100)), Some(&2));
        assert_eq!(counts.get(&size(120)), Some(&1));
        assert_eq!(counts.get(&size(150)), None);
        assert!(inv.net_area() <= 420.0);
        assert!(420.0 - inv.net_area() < 1.0);
    }

    #[test]
    fn inventory_sorted_descending() {
        let inv = generate_inventory(&config_600()).unwrap();
        for pair in inv.boxes().windows(2) {
            assert!(pair[0].size() >= pair[1].size());
        }
    }

    #[test]
    fn split_must_be_exactly_hundred() {
        let mut c = config_600();
        c.split.small = 40.0;
        c.split.medium = 40.0;
        c.split.large = 30.0;
        assert_eq!(
            generate_inventory(&c),
            Err(ValidationError::SplitNotHundred { sum: 110.0 })
        );
        c.split.large = 19.0;
        assert!(generate_inventory(&c).is_err());
        c.split.large = 21.0;
        assert!(generate_inventory(&c).is_err());
    }

    #[test]
    fn manual_counts_are_exact_then_topped_up() {
        let mut c = config_600();
        c.manual_mode = true;
        c.manual_counts.set(Category::Large, size(100), 3).unwrap();
        c.manual_counts.set(Category::Medium, size(50), 4).unwrap();
        c.manual_counts.set(Category::Small, size(25), 2).unwrap();
        let inv = generate_inventory(&c).unwrap();
        assert_eq!(inv.count(Category::Large), 3);
        assert_eq!(inv.count(Category::Medium), 4);
        // 420 - 30 - 20 - 5 = 365 m² of 1 m² top-up units.
        assert_eq!(inv.size_counts().get(&size(10)), Some(&365));
        assert_eq!(inv.count(Category::Small), 367);
        assert_eq!(inv.net_area(), 420.0);
    }

    #[test]
    fn manual_over_budget_is_rejected() {
        let mut c = config_600();
        c.manual_mode = true;
        // Large budget is 84 m²; 6 × 15 = 90 m².
        c.manual_counts.set(Category::Large, size(150), 6).unwrap();
        assert_eq!(
            generate_inventory(&c),
            Err(ValidationError::CategoryOverBudget {
                category: Category::Large,
                area: 90.0,
                budget: 84.0
            })
        );
    }

    #[test]
    fn toggle_off_ignores_counts() {
        let mut c = config_600();
        c.manual_counts.set(Category::Large, size(150), 6).unwrap();
        assert_eq!(InventoryMode::select(&c), InventoryMode::Automatic);
        assert!(generate_inventory(&c).is_ok());
        c.manual_mode = true;
        assert!(InventoryMode::select(&c).is_manual());
        c.manual_counts = ManualCounts::default();
        assert_eq!(InventoryMode::select(&c), InventoryMode::Automatic);
    }

    #[test]
    fn generate_does_not_validate_budgets() {
        let mut counts = ManualCounts::default();
        counts.set(Category::Large, size(150), 10).unwrap();
        let inv = generate(100.0, &CategorySplit::default(), InventoryMode::Manual(&counts))
            .unwrap();
        assert_eq!(inv.net_area(), 150.0);
        assert!(inv.corridor_area(100.0) < 0.0);
    }

    #[test]
    fn oversized_areas_are_rejected() {
        let mut c = config_600();
        c.hall.gross_area_override = Some(1e12);
        assert!(matches!(
            generate_inventory(&c),
            Err(ValidationError::AreaTooLarge { max, .. }) if max == MAX_UNIT_AREA
        ));
        assert!(generate(f64::NAN, &CategorySplit::default(), InventoryMode::Automatic).is_err());

        let mut counts = ManualCounts::default();
        counts.set(Category::Large, size(150), u32::MAX).unwrap();
        assert!(matches!(
            generate(100.0, &CategorySplit::default(), InventoryMode::Manual(&counts)),
            Err(ValidationError::AreaTooLarge { .. })
        ));
        // The limit itself is still accepted.
        assert!(generate(MAX_UNIT_AREA, &CategorySplit::default(), InventoryMode::Automatic).is_ok());
    }

    #[test]
    fn zero_usable_area_is_empty() {
        let inv = generate(0.0, &CategorySplit::default(), InventoryMode::Automatic).unwrap();
        assert!(inv.is_empty());
        assert_eq!(inv.net_area(), 0.0);
        assert_eq!(inv.achieved_efficiency(0.0), 0.0);
    }

    proptest! {
        #[test]
        fn net_area_is_sum_and_budget_is_used(
            usable in 0.0f64..5_000.0,
            small in 0u32..=100,
            medium_share in 0.0f64..=1.0,
        ) {
            let medium = (f64::from(100 - small) * medium_share).floor() as u32;
            let split = CategorySplit {
                small: f64::from(small),
                medium: f64::from(medium),
                large: f64::from(100 - small - medium),
            };
            let inv = generate(usable, &split, InventoryMode::Automatic).unwrap();
            let sum: f64 = inv.iter().map(BoxRecord::area).sum();
            prop_assert_eq!(inv.net_area(), sum);
            prop_assert!(usable - inv.net_area() < 1.0 + 1e-9);
            prop_assert!(inv.net_area() <= usable + 1e-9);
            for b in &inv {
                prop_assert!(b.category().offers(b.size()));
            }
        }

        #[test]
        fn generation_is_deterministic(usable in 0.0f64..2_000.0) {
            let split = CategorySplit::default();
            let a = generate(usable, &split, InventoryMode::Automatic).unwrap();
            let b = generate(usable, &split, InventoryMode::Automatic).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
