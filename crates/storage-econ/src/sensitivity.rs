//! Cost impact of changing the partition system height.

use crate::costs::{compute_costs, CostBreakdown};
use crate::EconError;
use rust_decimal::Decimal;
use serde::Serialize;
use storage_core::{Config, CostItem, CostOverrides};
use storage_layout::{Inventory, WallLengths};

/// Two breakdowns of the same inventory at different heights.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HeightSensitivity {
    pub height_high: f64,
    pub height_low: f64,
    pub high: CostBreakdown,
    pub low: CostBreakdown,
    /// Front wall (lintel) savings from lowering the system.
    pub savings_white: Decimal,
    pub savings_gray: Decimal,
    pub savings_total: Decimal,
}

impl HeightSensitivity {
    /// Wall areas (white, gray) at the high and low height, m².
    pub fn wall_areas(&self) -> ((f64, f64), (f64, f64)) {
        let areas = |b: &CostBreakdown| {
            (
                b.quantity(CostItem::WhiteWall),
                b.quantity(CostItem::GrayWall),
            )
        };
        (areas(&self.high), areas(&self.low))
    }
}

/// Recomputes the costs at `height_high` and `height_low`, everything else fixed.
pub fn height_sensitivity(
    config: &Config,
    inventory: &Inventory,
    walls: &WallLengths,
    overrides: Option<&CostOverrides>,
    height_high: f64,
    height_low: f64,
) -> Result<HeightSensitivity, EconError> {
    let at = |h: f64| {
        let mut c = config.clone();
        c.system_height = h;
        compute_costs(&c, inventory, walls, overrides)
    };
    let high = at(height_high)?;
    let low = at(height_low)?;
    let saving = |item: CostItem| high.line_total(item) - low.line_total(item);
    Ok(HeightSensitivity {
        height_high,
        height_low,
        savings_white: saving(CostItem::WhiteWall),
        savings_gray: saving(CostItem::GrayWall),
        savings_total: high.grand_total() - low.grand_total(),
        high,
        low,
    })
}
