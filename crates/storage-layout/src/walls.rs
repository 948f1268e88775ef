//! Aggregate wall lengths and door openings derived from an inventory.

use crate::area::{corridor_run_length, gross_area};
use crate::inventory::Inventory;
use serde::Serialize;
use storage_core::{Category, Config};

/// Every unit is assumed to be this deep, metres.
pub const ASSUMED_UNIT_DEPTH: f64 = 3.0;

/// Wall and corridor lengths in metres, full precision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct WallLengths {
    /// Front wall, never shorter than the doors it carries.
    pub front: f64,
    /// Partitions between neighbours plus the back-wall estimate.
    pub partition: f64,
    pub corridor: f64,
    /// Σ area / depth before the door-width floor.
    pub raw_front: f64,
    /// Σ door widths.
    pub door_width_total: f64,
    /// Back wall approximated as the front length; not a geometric derivation.
    pub back_wall_estimate: f64,
}

impl WallLengths {
    /// Values rounded to 0.1 m for reporting.
    pub fn rounded(&self) -> Self {
        let r = |v: f64| (v * 10.0).round() / 10.0;
        WallLengths {
            front: r(self.front),
            partition: r(self.partition),
            corridor: r(self.corridor),
            raw_front: r(self.raw_front),
            door_width_total: r(self.door_width_total),
            back_wall_estimate: r(self.back_wall_estimate),
        }
    }
}

/// Door openings by type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OpeningCounts {
    /// 0.75 m single doors, one per small unit.
    pub single_075: usize,
    /// 1.0 m single doors, one per medium unit.
    pub single_100: usize,
    /// 2.0 m double hinged doors for large units.
    pub double: usize,
    /// 2.0 m roller doors for large units.
    pub roller: usize,
}

impl OpeningCounts {
    pub fn of(inventory: &Inventory, roller_doors: bool) -> Self {
        let large = inventory.count(Category::Large);
        OpeningCounts {
            single_075: inventory.count(Category::Small),
            single_100: inventory.count(Category::Medium),
            double: if roller_doors { 0 } else { large },
            roller: if roller_doors { large } else { 0 },
        }
    }

    pub fn total(&self) -> usize {
        self.single_075 + self.single_100 + self.double + self.roller
    }

    /// Count-weighted mean width of the single doors, `fallback` without any.
    pub fn mean_single_width(&self, fallback: f64) -> f64 {
        let n = self.single_075 + self.single_100;
        if n == 0 {
            return fallback;
        }
        (self.single_075 as f64 * Category::Small.door_width()
            + self.single_100 as f64 * Category::Medium.door_width())
            / n as f64
    }
}

/// Front, partition and corridor lengths for an inventory.
pub fn compute_wall_lengths(config: &Config, inventory: &Inventory) -> WallLengths {
    let raw_front: f64 = inventory
        .iter()
        .map(|b| b.area() / ASSUMED_UNIT_DEPTH)
        .sum();
    let door_width_total: f64 = inventory.iter().map(|b| b.category().door_width()).sum();
    let front = raw_front.max(door_width_total);

    // Two facing rows; the longer one gets the odd unit.
    let per_row = inventory.len().div_ceil(2);
    let between = per_row.saturating_sub(1) as f64 * ASSUMED_UNIT_DEPTH * 2.0;
    let back_wall_estimate = front;

    WallLengths {
        front,
        partition: between + back_wall_estimate,
        corridor: corridor_run_length(config, gross_area(config)),
        raw_front,
        door_width_total,
        back_wall_estimate,
    }
}
