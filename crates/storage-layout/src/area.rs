//! Gross, usable and per-category area budgets.

use serde::Serialize;
use storage_core::{Category, Config, HallShape};

/// Over a single straight corridor run.
pub const CORRIDOR_SAFETY_FACTOR: f64 = 1.3;
/// No real layout exceeds this efficiency, percent.
pub const MAX_EFFICIENCY_CAP: f64 = 88.0;
/// Run-length proxy for custom halls: `sqrt(gross) × 1.2`.
pub const CUSTOM_RUN_FACTOR: f64 = 1.2;

/// Gross hall area in m². A manual override wins over the shape formula.
pub fn gross_area(config: &Config) -> f64 {
    let hall = &config.hall;
    if let Some(area) = hall.gross_area_override {
        return area;
    }
    match hall.shape {
        HallShape::Rectangle => hall.length * hall.width,
        HallShape::LShape => {
            // The two arms share a corner square.
            let overlap = hall.arm_a.width.min(hall.arm_b.width);
            hall.arm_a.area() + hall.arm_b.area() - overlap * overlap
        }
        HallShape::Custom => hall.total_area,
    }
}

/// Area meant to become rentable units.
pub fn usable_area(config: &Config) -> f64 {
    gross_area(config) * config.target_efficiency / 100.0
}

/// Length of the main corridor run in metres.
pub fn corridor_run_length(config: &Config, gross: f64) -> f64 {
    let hall = &config.hall;
    match hall.shape {
        HallShape::Rectangle => hall.length,
        HallShape::LShape => hall.arm_a.length + hall.arm_b.length,
        HallShape::Custom => gross.max(0.0).sqrt() * CUSTOM_RUN_FACTOR,
    }
}

/// Best efficiency the shape allows, in percent, within [0, 88].
pub fn theoretical_max_efficiency(config: &Config) -> f64 {
    let gross = gross_area(config);
    if gross <= 0.0 {
        return 0.0;
    }
    let corridor =
        config.corridor_width * corridor_run_length(config, gross) * CORRIDOR_SAFETY_FACTOR;
    ((gross - corridor) / gross * 100.0).clamp(0.0, MAX_EFFICIENCY_CAP)
}

/// Maximum unit area per category, m².
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct CategoryBudgets {
    pub small: f64,
    pub medium: f64,
    pub large: f64,
}

impl CategoryBudgets {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Small => self.small,
            Category::Medium => self.medium,
            Category::Large => self.large,
        }
    }

    pub fn total(&self) -> f64 {
        self.small + self.medium + self.large
    }
}

/// Splits the usable area by the category percentages, normalised by their sum.
///
/// Tolerates any split (a zero sum yields zero budgets); it also serves as the
/// "maximum m² for this category" hint while the split is being edited.
pub fn category_budgets(config: &Config) -> CategoryBudgets {
    let usable = usable_area(config);
    let sum = config.split.sum();
    let normalized = if sum == 0.0 { 1.0 } else { sum / 100.0 };
    let budget = |c: Category| usable * config.split.get(c) / 100.0 / normalized;
    CategoryBudgets {
        small: budget(Category::Small),
        medium: budget(Category::Medium),
        large: budget(Category::Large),
    }
}

/// Area figures of one configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct AreaSummary {
    pub gross: f64,
    pub usable: f64,
    pub non_usable: f64,
    /// Percent.
    pub max_efficiency: f64,
}

impl AreaSummary {
    pub fn of(config: &Config) -> Self {
        let gross = gross_area(config);
        let usable = usable_area(config);
        AreaSummary {
            gross,
            usable,
            non_usable: gross - usable,
            max_efficiency: theoretical_max_efficiency(config),
        }
    }

    /// Whole-m² values for display.
    pub fn rounded(&self) -> Self {
        AreaSummary {
            gross: self.gross.round(),
            usable: self.usable.round(),
            non_usable: self.non_usable.round(),
            max_efficiency: self.max_efficiency.round(),
        }
    }
}
