//! Line-item cost breakdown.

use crate::calibration::Coefficients;
use crate::{to_decimal, EconError};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use storage_core::{Config, CostItem, CostOverrides, Unit};
use storage_layout::{gross_area, Inventory, OpeningCounts, WallLengths};
use tracing::{debug, info};

/// Mean door width when the inventory has no single doors, m.
pub const FALLBACK_DOOR_WIDTH: f64 = 0.875;
/// Floor area covered by one camera, m².
pub const CAMERA_COVERAGE: f64 = 50.0;
/// Corridor length lit by one lamp, m.
pub const LAMP_SPACING: f64 = 10.0;

/// One priced quantity.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineItem {
    pub item: CostItem,
    pub quantity: f64,
    pub unit: Unit,
    pub unit_price: Decimal,
    /// `quantity × unit_price`, rounded to 0.01.
    pub line_total: Decimal,
    pub formula: String,
    /// Quantity came from a manual override.
    pub overridden: bool,
}

/// All line items of a takeoff and their grand total.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CostBreakdown {
    /// Net area the density formulas were applied to.
    pub pum: f64,
    lines: BTreeMap<CostItem, LineItem>,
    grand_total: Decimal,
}

impl CostBreakdown {
    fn from_lines(pum: f64, lines: BTreeMap<CostItem, LineItem>) -> Self {
        let grand_total = lines.values().map(|l| l.line_total).sum();
        CostBreakdown {
            pum,
            lines,
            grand_total,
        }
    }

    pub fn line(&self, item: CostItem) -> Option<&LineItem> {
        self.lines.get(&item)
    }

    /// Quantity of a line, zero when absent.
    pub fn quantity(&self, item: CostItem) -> f64 {
        self.line(item).map_or(0.0, |l| l.quantity)
    }

    pub fn line_total(&self, item: CostItem) -> Decimal {
        self.line(item).map_or(Decimal::ZERO, |l| l.line_total)
    }

    /// Lines in report order.
    pub fn lines(&self) -> impl Iterator<Item = &LineItem> {
        self.lines.values()
    }

    pub fn grand_total(&self) -> Decimal {
        self.grand_total
    }
}

/// Costs with the reference-calibrated coefficients.
pub fn compute_costs(
    config: &Config,
    inventory: &Inventory,
    walls: &WallLengths,
    overrides: Option<&CostOverrides>,
) -> Result<CostBreakdown, EconError> {
    compute_costs_with(config, inventory, walls, overrides, &Coefficients::default())
}

/// Costs with explicit coefficients.
///
/// Overrides replace individual quantities (and PUM) field by field; every
/// other line keeps its computed value.
pub fn compute_costs_with(
    config: &Config,
    inventory: &Inventory,
    walls: &WallLengths,
    overrides: Option<&CostOverrides>,
    coefficients: &Coefficients,
) -> Result<CostBreakdown, EconError> {
    let pum_override = overrides.and_then(|o| o.pum);
    let pum = pum_override.unwrap_or_else(|| inventory.net_area());
    let h = config.system_height;
    let features = &config.features;
    let openings = OpeningCounts::of(inventory, features.roller_doors);
    let avg_door = openings.mean_single_width(FALLBACK_DOOR_WIDTH);
    let lintel = (h - config.door_height).max(0.0);
    let gross = gross_area(config);
    let on = |enabled: bool, q: f64| if enabled { q } else { 0.0 };

    let computed: [(CostItem, f64, String); 13] = [
        (
            CostItem::GrayWall,
            pum * coefficients.gray_wall * h,
            format!("{pum:.2} m² × {:.4} × {h:.2} m", coefficients.gray_wall),
        ),
        (
            CostItem::WhiteWall,
            pum * coefficients.white_wall_lower * h
                + pum * coefficients.door_density * avg_door * lintel,
            format!(
                "{pum:.2} m² × {:.4} × {h:.2} m + {pum:.2} m² × {:.2} × {avg_door:.3} m × {lintel:.2} m",
                coefficients.white_wall_lower, coefficients.door_density
            ),
        ),
        (
            CostItem::KickPlate,
            pum * coefficients.kick_plate,
            format!("{pum:.2} m² × {:.4}", coefficients.kick_plate),
        ),
        (
            CostItem::Mesh,
            on(features.mesh, pum),
            "net unit area".to_string(),
        ),
        (
            CostItem::Soffit,
            on(features.soffit, walls.corridor),
            "corridor run length".to_string(),
        ),
        (
            CostItem::Door075,
            openings.single_075 as f64,
            "one per small unit".to_string(),
        ),
        (
            CostItem::Door100,
            openings.single_100 as f64,
            "one per medium unit".to_string(),
        ),
        (
            CostItem::DoubleDoor,
            openings.double as f64,
            "one per large unit without roller doors".to_string(),
        ),
        (
            CostItem::RollerDoor,
            openings.roller as f64,
            "one per large unit with roller doors".to_string(),
        ),
        (
            CostItem::ElectronicLock,
            on(features.electronic_locks, inventory.len() as f64),
            "one per unit".to_string(),
        ),
        (
            CostItem::Camera,
            on(features.cameras, (gross / CAMERA_COVERAGE).ceil().max(0.0)),
            format!("ceil({gross:.0} m² / {CAMERA_COVERAGE:.0} m²)"),
        ),
        (
            CostItem::Lamp,
            on(features.lighting, (walls.corridor / LAMP_SPACING).ceil().max(0.0)),
            format!("ceil({:.1} m / {LAMP_SPACING:.0} m)", walls.corridor),
        ),
        (
            CostItem::Gate,
            on(features.gate, 1.0),
            "flat fee".to_string(),
        ),
    ];

    let mut lines = BTreeMap::new();
    for (item, auto_quantity, formula) in computed {
        let manual = overrides.and_then(|o| o.quantity(item));
        let (quantity, formula) = match manual {
            Some(q) => (q, "manual override".to_string()),
            None => (auto_quantity, formula),
        };
        let unit_price = config.prices.price(item);
        let line_total = (to_decimal(quantity)? * unit_price).round_dp(2);
        debug!(item = %item, quantity, %line_total, "line priced");
        lines.insert(
            item,
            LineItem {
                item,
                quantity,
                unit: item.unit(),
                unit_price,
                line_total,
                formula,
                overridden: manual.is_some(),
            },
        );
    }

    let breakdown = CostBreakdown::from_lines(pum, lines);
    info!(
        pum,
        overridden = overrides.map_or(0, |o| o.quantities.len()),
        grand_total = %breakdown.grand_total(),
        "costs computed"
    );
    Ok(breakdown)
}
