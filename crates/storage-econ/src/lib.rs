#![deny(warnings)]

//! Economic models for the storage takeoff.
//!
//! This crate provides:
//! - Linear-density coefficients calibrated on a reference project
//! - The line-item cost breakdown and its manual reconciliation mode
//! - Height sensitivity of the wall costs
//! - The month-stepped leasing cash-flow projection

pub mod calibration;
pub mod cashflow;
pub mod costs;
pub mod sensitivity;

pub use calibration::{calibration_check, CalibrationReport, Coefficients, ReferenceProject};
pub use cashflow::{
    simulate_cash_flow, BreakEven, CashFlowSeries, MonthRecord, MAX_CONTRACT_YEARS,
};
pub use costs::{compute_costs, compute_costs_with, CostBreakdown, LineItem};
pub use sensitivity::{height_sensitivity, HeightSensitivity};

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use storage_core::{PreconditionError, ValidationError};
use thiserror::Error;

/// Errors produced by economic helpers.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    /// Numeric conversion between floating point and decimal failed.
    #[error("non-finite numeric conversion")]
    NonFinite,
    /// Reference project quantities must be strictly positive.
    #[error("invalid reference project: net area and height must be > 0")]
    InvalidReference,
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub(crate) fn to_decimal(v: f64) -> Result<Decimal, EconError> {
    Decimal::from_f64(v).ok_or(EconError::NonFinite)
}
