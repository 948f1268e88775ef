#![deny(warnings)]

//! Takeoff session and the full estimation pipeline.
//!
//! [`run_pipeline`] is the pure end-to-end function. [`Estimator`] wraps a
//! caller-owned configuration with last-write-wins edits and keeps the most
//! recent successful takeoff; a failed generate never replaces it.

use rust_decimal::Decimal;
use serde::Serialize;
use storage_core::{Config, ConfigError, CostOverrides, PreconditionError, ValidationError};
use storage_econ::{
    compute_costs, height_sensitivity, simulate_cash_flow, CashFlowSeries, CostBreakdown,
    EconError, HeightSensitivity,
};
use storage_layout::{
    category_budgets, compute_wall_lengths, generate_inventory, AreaSummary, CategoryBudgets,
    Inventory, WallLengths,
};
use thiserror::Error;
use tracing::{info, warn};

/// Any failure of the pipeline, by kind.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Econ(#[from] EconError),
}

/// Everything derived from one generate.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Takeoff {
    pub area: AreaSummary,
    pub budgets: CategoryBudgets,
    pub inventory: Inventory,
    /// Net over gross, percent.
    pub achieved_efficiency: f64,
    /// Gross minus net, m².
    pub corridor_area: f64,
    pub walls: WallLengths,
    pub costs: CostBreakdown,
}

impl Takeoff {
    /// Construction cost, the investment fed to the cash-flow projection.
    pub fn investment(&self) -> Decimal {
        self.costs.grand_total()
    }
}

/// Takeoff plus its cash-flow projection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub takeoff: Takeoff,
    pub cash_flow: CashFlowSeries,
}

/// Area -> inventory -> walls -> costs.
pub fn run_takeoff(
    config: &Config,
    overrides: Option<&CostOverrides>,
) -> Result<Takeoff, EngineError> {
    let area = AreaSummary::of(config);
    let inventory = generate_inventory(config)?;
    let walls = compute_wall_lengths(config, &inventory);
    let costs = compute_costs(config, &inventory, &walls, overrides)?;
    Ok(Takeoff {
        area,
        budgets: category_budgets(config),
        achieved_efficiency: inventory.achieved_efficiency(area.gross),
        corridor_area: inventory.corridor_area(area.gross),
        inventory,
        walls,
        costs,
    })
}

fn project(config: &Config, takeoff: &Takeoff) -> Result<CashFlowSeries, EngineError> {
    Ok(simulate_cash_flow(
        &config.leasing,
        takeoff.costs.pum,
        Some(takeoff.investment()),
    )?)
}

/// Takeoff followed by the cash-flow projection of its grand total.
pub fn run_pipeline(
    config: &Config,
    overrides: Option<&CostOverrides>,
) -> Result<Report, EngineError> {
    let takeoff = run_takeoff(config, overrides)?;
    let cash_flow = project(config, &takeoff)?;
    Ok(Report {
        takeoff,
        cash_flow,
    })
}

/// Interactive session over one configuration.
#[derive(Clone, Debug, Default)]
pub struct Estimator {
    config: Config,
    overrides: CostOverrides,
    takeoff: Option<Takeoff>,
}

impl Estimator {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            overrides: CostOverrides::default(),
            takeoff: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn overrides(&self) -> &CostOverrides {
        &self.overrides
    }

    /// Last successful takeoff.
    pub fn takeoff(&self) -> Option<&Takeoff> {
        self.takeoff.as_ref()
    }

    /// Edits one configuration field. Derived state is left as is until the
    /// next [`Estimator::generate`].
    pub fn set(&mut self, field: &str, raw: &str) -> Result<(), EngineError> {
        self.config.set(field, raw)?;
        Ok(())
    }

    /// Edits one manual reconciliation field (`pum` or a line-item key).
    pub fn set_override(&mut self, key: &str, raw: &str) -> Result<(), EngineError> {
        self.overrides.set(key, raw)?;
        Ok(())
    }

    pub fn replace_overrides(&mut self, overrides: CostOverrides) {
        self.overrides = overrides;
    }

    pub fn clear_overrides(&mut self) {
        self.overrides = CostOverrides::default();
    }

    /// Budget hint for the split as currently edited.
    pub fn category_budgets(&self) -> CategoryBudgets {
        category_budgets(&self.config)
    }

    fn active_overrides(&self) -> Option<&CostOverrides> {
        (!self.overrides.is_empty()).then_some(&self.overrides)
    }

    /// Rebuilds all derived state, priced with the current overrides.
    /// On failure the previous takeoff stays.
    pub fn generate(&mut self) -> Result<&Takeoff, EngineError> {
        match run_takeoff(&self.config, self.active_overrides()) {
            Ok(takeoff) => {
                info!(
                    units = takeoff.inventory.len(),
                    grand_total = %takeoff.investment(),
                    "takeoff committed"
                );
                Ok(self.takeoff.insert(takeoff))
            }
            Err(e) => {
                warn!(error = %e, "takeoff rejected");
                Err(e)
            }
        }
    }

    /// Reprices the committed takeoff with the current prices and overrides.
    pub fn recompute_costs(&mut self) -> Result<&CostBreakdown, EngineError> {
        let takeoff = self.takeoff.as_mut().ok_or(PreconditionError::NoTakeoff)?;
        let costs = compute_costs(
            &self.config,
            &takeoff.inventory,
            &takeoff.walls,
            Some(&self.overrides),
        )?;
        takeoff.costs = costs;
        Ok(&takeoff.costs)
    }

    /// Projects the committed takeoff's grand total.
    pub fn simulate_cash_flow(&self) -> Result<CashFlowSeries, EngineError> {
        let takeoff = self.takeoff.as_ref().ok_or(PreconditionError::NoTakeoff)?;
        project(&self.config, takeoff)
    }

    /// Wall-cost comparison of the committed takeoff at two heights.
    pub fn height_sensitivity(
        &self,
        height_high: f64,
        height_low: f64,
    ) -> Result<HeightSensitivity, EngineError> {
        let takeoff = self.takeoff.as_ref().ok_or(PreconditionError::NoTakeoff)?;
        Ok(height_sensitivity(
            &self.config,
            &takeoff.inventory,
            &takeoff.walls,
            self.active_overrides(),
            height_high,
            height_low,
        )?)
    }

    /// Runs generate and the projection, committing only the takeoff.
    pub fn report(&mut self) -> Result<Report, EngineError> {
        let takeoff = self.generate()?.clone();
        let cash_flow = project(&self.config, &takeoff)?;
        Ok(Report {
            takeoff,
            cash_flow,
        })
    }
}

/// Convenience accessor used by front ends to print the inventory mix.
pub fn inventory_mix(inventory: &Inventory) -> Vec<(storage_core::UnitSize, usize)> {
    inventory.size_counts().into_iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use storage_core::{Category, CostItem};
    use storage_econ::BreakEven;

    fn estimator_600() -> Estimator {
        let mut e = Estimator::new(Config::default());
        e.set("hall.shape", "rectangle").unwrap();
        e.set("hall.length", "30").unwrap();
        e.set("hall.width", "20").unwrap();
        e.set("target_efficiency", "70").unwrap();
        e
    }

    #[test]
    fn generate_commits_takeoff() {
        let mut e = estimator_600();
        let t = e.generate().unwrap();
        assert_eq!(t.area.gross, 600.0);
        assert_eq!(t.area.usable, 420.0);
        assert_eq!(t.budgets.large, 84.0);
        let sum: f64 = t.inventory.iter().map(|b| b.area()).sum();
        assert_eq!(t.inventory.net_area(), sum);
        assert!((t.corridor_area - (600.0 - sum)).abs() < 1e-9);
        assert!(e.takeoff().is_some());
    }

    #[test]
    fn failed_generate_keeps_previous_takeoff() {
        let mut e = estimator_600();
        let before = e.generate().unwrap().clone();
        e.set("split.small", "40").unwrap();
        e.set("split.medium", "40").unwrap();
        e.set("split.large", "30").unwrap();
        let err = e.generate().unwrap_err();
        assert_eq!(
            err,
            EngineError::Validation(ValidationError::SplitNotHundred { sum: 110.0 })
        );
        assert_eq!(e.takeoff(), Some(&before));
        // The hint still works on the uneven split.
        assert!((e.category_budgets().total() - 420.0).abs() < 1e-9);
    }

    #[test]
    fn over_hundred_split_is_not_clamped() {
        let mut e = estimator_600();
        e.set("split.small", "101").unwrap();
        e.set("split.medium", "0").unwrap();
        e.set("split.large", "0").unwrap();
        assert_eq!(
            e.generate().unwrap_err(),
            EngineError::Validation(ValidationError::SplitNotHundred { sum: 101.0 })
        );
        assert!(e.takeoff().is_none());
    }

    #[test]
    fn over_budget_manual_counts_are_rejected() {
        let mut e = estimator_600();
        e.set("manual_mode", "on").unwrap();
        e.set("counts.large.15", "6").unwrap();
        let err = e.generate().unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::CategoryOverBudget {
                category: Category::Large,
                ..
            })
        ));
        assert!(e.takeoff().is_none());
    }

    #[test]
    fn recompute_and_cash_flow_need_a_takeoff() {
        let mut e = estimator_600();
        assert_eq!(
            e.recompute_costs().unwrap_err(),
            EngineError::Precondition(PreconditionError::NoTakeoff)
        );
        assert_eq!(
            e.simulate_cash_flow().unwrap_err(),
            EngineError::Precondition(PreconditionError::NoTakeoff)
        );
        assert!(e.height_sensitivity(3.0, 2.5).is_err());
    }

    #[test]
    fn reconciliation_replaces_only_overridden_lines() {
        let mut e = estimator_600();
        let auto = e.generate().unwrap().costs.clone();
        e.set_override("gray_wall", "250").unwrap();
        e.set_override("door_075", "garbage").unwrap();
        let manual = e.recompute_costs().unwrap().clone();
        assert_eq!(manual.quantity(CostItem::GrayWall), 250.0);
        assert_eq!(
            manual.quantity(CostItem::Door075),
            auto.quantity(CostItem::Door075)
        );
        assert_eq!(manual.line(CostItem::Camera), auto.line(CostItem::Camera));
        assert_ne!(manual.grand_total(), auto.grand_total());
    }

    #[test]
    fn report_prices_and_projects_with_stored_overrides() {
        let mut e = estimator_600();
        e.set_override("pum", "84").unwrap();
        e.set_override("camera", "1").unwrap();
        let report = e.report().unwrap();
        let costs = &report.takeoff.costs;
        assert_eq!(costs.pum, 84.0);
        assert_eq!(costs.quantity(CostItem::Camera), 1.0);
        assert!((costs.quantity(CostItem::GrayWall) - 217.5).abs() < 1e-9);
        assert_eq!(report.cash_flow.max_rentable_area, 84.0 * 85.0 / 100.0);
        assert_eq!(report.cash_flow.investment, costs.grand_total());
        assert_eq!(e.takeoff(), Some(&report.takeoff));

        // Same height on both sides reproduces the committed breakdown.
        let s = e.height_sensitivity(2.5, 2.5).unwrap();
        assert_eq!(s.high.grand_total(), costs.grand_total());

        e.clear_overrides();
        let automatic = e.generate().unwrap();
        assert_eq!(automatic.costs.pum, automatic.inventory.net_area());
    }

    #[test]
    fn cash_flow_uses_grand_total_as_investment() {
        let mut e = estimator_600();
        let investment = e.generate().unwrap().investment();
        let s = e.simulate_cash_flow().unwrap();
        assert_eq!(s.investment, investment);
        assert_eq!(s.months.len(), 120);
        assert_eq!(s.months[0].cumulative, -investment + s.months[0].net_revenue);
        assert!(matches!(
            s.break_even,
            BreakEven::Month(_) | BreakEven::BeyondContract
        ));
    }

    #[test]
    fn pipeline_is_idempotent() {
        let config = estimator_600().config().clone();
        let a = run_pipeline(&config, None).unwrap();
        let b = run_pipeline(&config, None).unwrap();
        assert_eq!(a, b);
        let json = serde_json::to_string(&a).unwrap();
        assert!(json.contains("\"grand_total\""));
    }

    #[test]
    fn report_matches_pipeline() {
        let mut e = estimator_600();
        let via_session = e.report().unwrap();
        let via_fn = run_pipeline(e.config(), None).unwrap();
        assert_eq!(via_session, via_fn);
        let mix = inventory_mix(&via_fn.takeoff.inventory);
        assert!(mix.windows(2).all(|w| w[0].0 > w[1].0));
    }

    proptest! {
        #[test]
        fn net_area_matches_inventory(length in 5.0f64..60.0, width in 5.0f64..40.0, eff in 40.0f64..88.0) {
            let mut config = Config::default();
            config.hall.length = length;
            config.hall.width = width;
            config.target_efficiency = eff;
            let t = run_takeoff(&config, None).unwrap();
            let sum: f64 = t.inventory.iter().map(|b| b.area()).sum();
            prop_assert_eq!(t.inventory.net_area(), sum);
            prop_assert_eq!(t.costs.pum, sum);
        }
    }
}
