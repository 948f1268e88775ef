#![deny(warnings)]

//! Area model, box inventory generator and wall-length calculator.
//!
//! Everything here is a pure function of a [`storage_core::Config`]:
//! gross area -> usable area -> category budgets -> inventory -> walls.

pub mod area;
pub mod inventory;
pub mod walls;

pub use area::{
    category_budgets, corridor_run_length, gross_area, theoretical_max_efficiency, usable_area,
    AreaSummary, CategoryBudgets,
};
pub use inventory::{
    generate, generate_inventory, validate_manual_counts, validate_split, Inventory,
    InventoryMode, MAX_UNIT_AREA,
};
pub use walls::{compute_wall_lengths, OpeningCounts, WallLengths, ASSUMED_UNIT_DEPTH};
