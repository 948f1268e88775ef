#![deny(warnings)]

//! Core domain models for the self-storage takeoff engine.
//!
//! This crate defines the caller-owned [`Config`], the fixed unit-size
//! catalog, the line-item vocabulary shared by the cost model and manual
//! reconciliation, and the error kinds reported across the workspace.
//! Everything that turns untrusted text into numbers lives in [`coerce`].

pub mod catalog;
pub mod coerce;
pub mod config;

pub use catalog::{BoxRecord, Category, ManualCounts, UnitSize};
pub use config::{
    Arm, CategorySplit, Config, CostItem, CostOverrides, Features, HallGeometry, HallShape,
    LeasingParams, PriceTable, Unit,
};

use thiserror::Error;

/// Rejections raised before a takeoff is accepted. Never auto-corrected.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Category percentages must add up to exactly 100 for a takeoff.
    #[error("category percentages sum to {sum}, expected exactly 100")]
    SplitNotHundred { sum: f64 },
    /// Manually counted units do not fit the category's area budget.
    #[error("{category} units occupy {area:.2} m², exceeding the category budget of {budget:.2} m²")]
    CategoryOverBudget {
        category: Category,
        area: f64,
        budget: f64,
    },
    /// A unit size outside the category catalog.
    #[error("{size} m² is not a catalog size for the {category} category")]
    SizeNotInCatalog { category: Category, size: UnitSize },
    /// Unit area to generate is beyond what one hall can hold.
    #[error("{area} m² of unit area exceeds the supported maximum of {max} m²")]
    AreaTooLarge { area: f64, max: f64 },
    /// Leasing horizon beyond the supported number of years.
    #[error("contract length of {years} years exceeds the supported maximum of {max}")]
    ContractTooLong { years: u32, max: u32 },
}

/// Operations requested before their inputs exist.
#[derive(Debug, Error, PartialEq)]
pub enum PreconditionError {
    /// Cost reconciliation or cash flow requested before any takeoff ran.
    #[error("no takeoff has been generated yet")]
    NoTakeoff,
    /// Cash-flow simulation needs a non-zero investment.
    #[error("cash-flow simulation requires a non-zero investment")]
    MissingInvestment,
}

/// Errors raised at the configuration-mutation edge.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Field name not recognised by [`Config::set`] or [`CostOverrides::set`].
    #[error("unknown configuration field: {0}")]
    UnknownField(String),
    /// Hall shape name other than rectangle, l_shape or custom.
    #[error("unknown hall shape: {0}")]
    UnknownShape(String),
    /// Size key in a `counts.*` field that the category does not offer.
    #[error("invalid unit size for {category}: {raw}")]
    InvalidSize { category: Category, raw: String },
}
