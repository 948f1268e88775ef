//! Month-stepped leasing projection.

use crate::{to_decimal, EconError};
use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use storage_core::{LeasingParams, PreconditionError, ValidationError};
use tracing::info;

/// Longest leasing horizon that will be projected, years.
pub const MAX_CONTRACT_YEARS: u32 = 100;

/// First month whose cumulative cash flow is non-negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakEven {
    Month(u32),
    /// Not reached within the contract; a valid if unfavourable outcome.
    BeyondContract,
}

impl fmt::Display for BreakEven {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakEven::Month(m) => write!(f, "month {m}"),
            BreakEven::BeyondContract => f.write_str("beyond contract length"),
        }
    }
}

/// One projected month. Money rounded to 0.01.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonthRecord {
    /// 1-based.
    pub month: u32,
    pub date: Option<NaiveDate>,
    pub rented_area: f64,
    pub gross_revenue: Decimal,
    pub license_fee: Decimal,
    pub fixed_cost: Decimal,
    pub net_revenue: Decimal,
    pub cumulative: Decimal,
}

/// Full projection with summary metrics.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CashFlowSeries {
    pub investment: Decimal,
    /// Net area × maximum occupancy, m².
    pub max_rentable_area: f64,
    pub months: Vec<MonthRecord>,
    pub break_even: BreakEven,
    /// First month at the occupancy cap, if reached.
    pub occupancy_cap_month: Option<u32>,
    /// Final cumulative cash flow.
    pub total_profit: Decimal,
    pub roi_pct: Decimal,
    pub annual_return_pct: Decimal,
}

fn month_date(start: Option<NaiveDate>, month: u32) -> Option<NaiveDate> {
    start.and_then(|d| d.checked_add_months(Months::new(month - 1)))
}

/// Projects `params.contract_years × 12` months of leasing.
///
/// Fails when `investment` is absent or not positive, or when the contract
/// is longer than [`MAX_CONTRACT_YEARS`].
pub fn simulate_cash_flow(
    params: &LeasingParams,
    net_area: f64,
    investment: Option<Decimal>,
) -> Result<CashFlowSeries, EconError> {
    let investment = investment
        .filter(|i| *i > Decimal::ZERO)
        .ok_or(PreconditionError::MissingInvestment)?;
    if params.contract_years > MAX_CONTRACT_YEARS {
        return Err(ValidationError::ContractTooLong {
            years: params.contract_years,
            max: MAX_CONTRACT_YEARS,
        }
        .into());
    }
    let horizon = params.contract_years * 12;
    let max_rentable_area = net_area * params.max_occupancy / 100.0;
    let hundred = Decimal::ONE_HUNDRED;

    let mut months = Vec::with_capacity(horizon as usize);
    let mut rented: f64 = 0.0;
    let mut cumulative = -investment;
    let mut break_even = BreakEven::BeyondContract;
    let mut occupancy_cap_month = None;

    for month in 1..=horizon {
        rented = (rented + params.monthly_absorption).min(max_rentable_area);
        if occupancy_cap_month.is_none() && rented >= max_rentable_area {
            occupancy_cap_month = Some(month);
        }
        let gross_revenue = (to_decimal(rented)? * params.rent_price).round_dp(2);
        let license_fee = (gross_revenue * params.license_fee / hundred).round_dp(2);
        let fixed_cost = params.fixed_monthly_cost;
        let net_revenue = gross_revenue - license_fee - fixed_cost;
        cumulative += net_revenue;
        if break_even == BreakEven::BeyondContract && cumulative >= Decimal::ZERO {
            break_even = BreakEven::Month(month);
        }
        months.push(MonthRecord {
            month,
            date: month_date(params.start_date, month),
            rented_area: rented,
            gross_revenue,
            license_fee,
            fixed_cost,
            net_revenue,
            cumulative,
        });
    }

    let total_profit = cumulative;
    let roi_pct = ((total_profit + investment) / investment * hundred - hundred).round_dp(4);
    let annual_return_pct = if params.contract_years == 0 {
        Decimal::ZERO
    } else {
        (roi_pct / Decimal::from(params.contract_years)).round_dp(4)
    };

    info!(
        months = months.len(),
        break_even = %break_even,
        %total_profit,
        %roi_pct,
        "cash flow simulated"
    );
    Ok(CashFlowSeries {
        investment,
        max_rentable_area,
        months,
        break_even,
        occupancy_cap_month,
        total_profit,
        roi_pct,
        annual_return_pct,
    })
}
