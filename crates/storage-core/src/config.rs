//! Caller-owned configuration and the line-item vocabulary.

use crate::catalog::{Category, ManualCounts, UnitSize};
use crate::coerce;
use crate::ConfigError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Hall footprint variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HallShape {
    #[default]
    Rectangle,
    LShape,
    Custom,
}

impl HallShape {
    pub fn parse(raw: &str) -> Option<HallShape> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "rectangle" | "rect" => Some(HallShape::Rectangle),
            "l_shape" | "l" => Some(HallShape::LShape),
            "custom" => Some(HallShape::Custom),
            _ => None,
        }
    }
}

/// One rectangular arm of an L-shaped hall. `length` runs along the corridor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Arm {
    pub length: f64,
    pub width: f64,
}

impl Arm {
    pub fn area(&self) -> f64 {
        self.length * self.width
    }
}

/// Hall dimensions for every shape; `shape` selects which ones apply.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HallGeometry {
    pub shape: HallShape,
    /// Rectangle run length in metres.
    pub length: f64,
    /// Rectangle width in metres.
    pub width: f64,
    pub arm_a: Arm,
    pub arm_b: Arm,
    /// Gross area entered directly for custom halls, m².
    pub total_area: f64,
    /// Replaces the computed gross area when set.
    pub gross_area_override: Option<f64>,
}

impl Default for HallGeometry {
    fn default() -> Self {
        Self {
            shape: HallShape::Rectangle,
            length: 30.0,
            width: 20.0,
            arm_a: Arm {
                length: 20.0,
                width: 10.0,
            },
            arm_b: Arm {
                length: 15.0,
                width: 10.0,
            },
            total_area: 600.0,
            gross_area_override: None,
        }
    }
}

/// Share of usable area per category, in percent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategorySplit {
    pub small: f64,
    pub medium: f64,
    pub large: f64,
}

impl Default for CategorySplit {
    fn default() -> Self {
        Self {
            small: 50.0,
            medium: 30.0,
            large: 20.0,
        }
    }
}

impl CategorySplit {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Small => self.small,
            Category::Medium => self.medium,
            Category::Large => self.large,
        }
    }

    pub fn set(&mut self, category: Category, pct: f64) {
        match category {
            Category::Small => self.small = pct,
            Category::Medium => self.medium = pct,
            Category::Large => self.large = pct,
        }
    }

    pub fn sum(&self) -> f64 {
        self.small + self.medium + self.large
    }
}

/// Optional equipment switches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    pub mesh: bool,
    pub soffit: bool,
    pub electronic_locks: bool,
    /// Roller doors for large units; double hinged doors otherwise.
    pub roller_doors: bool,
    pub gate: bool,
    pub cameras: bool,
    pub lighting: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            mesh: true,
            soffit: true,
            electronic_locks: false,
            roller_doors: false,
            gate: false,
            cameras: true,
            lighting: true,
        }
    }
}

impl Features {
    fn get_mut(&mut self, name: &str) -> Option<&mut bool> {
        Some(match name {
            "mesh" => &mut self.mesh,
            "soffit" => &mut self.soffit,
            "electronic_locks" => &mut self.electronic_locks,
            "roller_doors" => &mut self.roller_doors,
            "gate" => &mut self.gate,
            "cameras" => &mut self.cameras,
            "lighting" => &mut self.lighting,
            _ => return None,
        })
    }
}

/// Measurement unit of a cost line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    SquareMeters,
    Meters,
    Pieces,
    LumpSum,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Unit::SquareMeters => "m²",
            Unit::Meters => "m",
            Unit::Pieces => "pcs",
            Unit::LumpSum => "lump sum",
        })
    }
}

/// Cost line items, in report order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostItem {
    GrayWall,
    WhiteWall,
    KickPlate,
    Mesh,
    Soffit,
    #[serde(rename = "door_075")]
    Door075,
    #[serde(rename = "door_100")]
    Door100,
    DoubleDoor,
    RollerDoor,
    ElectronicLock,
    Camera,
    Lamp,
    Gate,
}

impl CostItem {
    pub const ALL: [CostItem; 13] = [
        CostItem::GrayWall,
        CostItem::WhiteWall,
        CostItem::KickPlate,
        CostItem::Mesh,
        CostItem::Soffit,
        CostItem::Door075,
        CostItem::Door100,
        CostItem::DoubleDoor,
        CostItem::RollerDoor,
        CostItem::ElectronicLock,
        CostItem::Camera,
        CostItem::Lamp,
        CostItem::Gate,
    ];

    pub fn key(self) -> &'static str {
        match self {
            CostItem::GrayWall => "gray_wall",
            CostItem::WhiteWall => "white_wall",
            CostItem::KickPlate => "kick_plate",
            CostItem::Mesh => "mesh",
            CostItem::Soffit => "soffit",
            CostItem::Door075 => "door_075",
            CostItem::Door100 => "door_100",
            CostItem::DoubleDoor => "double_door",
            CostItem::RollerDoor => "roller_door",
            CostItem::ElectronicLock => "electronic_lock",
            CostItem::Camera => "camera",
            CostItem::Lamp => "lamp",
            CostItem::Gate => "gate",
        }
    }

    pub fn from_key(key: &str) -> Option<CostItem> {
        CostItem::ALL.into_iter().find(|i| i.key() == key)
    }

    pub fn unit(self) -> Unit {
        match self {
            CostItem::GrayWall | CostItem::WhiteWall | CostItem::Mesh => Unit::SquareMeters,
            CostItem::KickPlate | CostItem::Soffit => Unit::Meters,
            CostItem::Gate => Unit::LumpSum,
            _ => Unit::Pieces,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CostItem::GrayWall => "Partition wall (gray)",
            CostItem::WhiteWall => "Front wall (white)",
            CostItem::KickPlate => "Kick plate",
            CostItem::Mesh => "Ceiling mesh",
            CostItem::Soffit => "Corridor soffit",
            CostItem::Door075 => "Single door 0.75 m",
            CostItem::Door100 => "Single door 1.0 m",
            CostItem::DoubleDoor => "Double hinged door 2.0 m",
            CostItem::RollerDoor => "Roller door 2.0 m",
            CostItem::ElectronicLock => "Electronic lock",
            CostItem::Camera => "CCTV camera",
            CostItem::Lamp => "Corridor lamp",
            CostItem::Gate => "Vehicle gate",
        }
    }
}

impl fmt::Display for CostItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Unit prices, one per line item (PLN).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceTable {
    pub gray_wall: Decimal,
    pub white_wall: Decimal,
    pub kick_plate: Decimal,
    pub mesh: Decimal,
    pub soffit: Decimal,
    pub door_075: Decimal,
    pub door_100: Decimal,
    pub double_door: Decimal,
    pub roller_door: Decimal,
    pub electronic_lock: Decimal,
    pub camera: Decimal,
    pub lamp: Decimal,
    pub gate: Decimal,
}

impl Default for PriceTable {
    fn default() -> Self {
        Self {
            gray_wall: Decimal::new(84, 0),
            white_wall: Decimal::new(110, 0),
            kick_plate: Decimal::new(81, 0),
            mesh: Decimal::new(95, 0),
            soffit: Decimal::new(120, 0),
            door_075: Decimal::new(780, 0),
            door_100: Decimal::new(780, 0),
            double_door: Decimal::new(1650, 0),
            roller_door: Decimal::new(2900, 0),
            electronic_lock: Decimal::new(450, 0),
            camera: Decimal::new(1200, 0),
            lamp: Decimal::new(180, 0),
            gate: Decimal::new(25_000, 0),
        }
    }
}

impl PriceTable {
    pub fn price(&self, item: CostItem) -> Decimal {
        match item {
            CostItem::GrayWall => self.gray_wall,
            CostItem::WhiteWall => self.white_wall,
            CostItem::KickPlate => self.kick_plate,
            CostItem::Mesh => self.mesh,
            CostItem::Soffit => self.soffit,
            CostItem::Door075 => self.door_075,
            CostItem::Door100 => self.door_100,
            CostItem::DoubleDoor => self.double_door,
            CostItem::RollerDoor => self.roller_door,
            CostItem::ElectronicLock => self.electronic_lock,
            CostItem::Camera => self.camera,
            CostItem::Lamp => self.lamp,
            CostItem::Gate => self.gate,
        }
    }

    pub fn set_price(&mut self, item: CostItem, price: Decimal) {
        let slot = match item {
            CostItem::GrayWall => &mut self.gray_wall,
            CostItem::WhiteWall => &mut self.white_wall,
            CostItem::KickPlate => &mut self.kick_plate,
            CostItem::Mesh => &mut self.mesh,
            CostItem::Soffit => &mut self.soffit,
            CostItem::Door075 => &mut self.door_075,
            CostItem::Door100 => &mut self.door_100,
            CostItem::DoubleDoor => &mut self.double_door,
            CostItem::RollerDoor => &mut self.roller_door,
            CostItem::ElectronicLock => &mut self.electronic_lock,
            CostItem::Camera => &mut self.camera,
            CostItem::Lamp => &mut self.lamp,
            CostItem::Gate => &mut self.gate,
        };
        *slot = price;
    }
}

/// Leasing assumptions for the cash-flow projection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeasingParams {
    /// Rent per m² per month.
    pub rent_price: Decimal,
    /// Area newly let each month, m².
    pub monthly_absorption: f64,
    /// Occupancy ceiling in percent of net area.
    pub max_occupancy: f64,
    pub contract_years: u32,
    /// License fee in percent of gross revenue.
    pub license_fee: Decimal,
    pub fixed_monthly_cost: Decimal,
    /// First projected month, for calendar labels.
    pub start_date: Option<NaiveDate>,
}

impl Default for LeasingParams {
    fn default() -> Self {
        Self {
            rent_price: Decimal::new(60, 0),
            monthly_absorption: 20.0,
            max_occupancy: 85.0,
            contract_years: 10,
            license_fee: Decimal::new(8, 0),
            fixed_monthly_cost: Decimal::new(3000, 0),
            start_date: None,
        }
    }
}

/// Manual quantity substitutions used to reconcile against an external document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostOverrides {
    /// Net area to use instead of the inventory's.
    pub pum: Option<f64>,
    pub quantities: BTreeMap<CostItem, f64>,
}

impl CostOverrides {
    pub fn quantity(&self, item: CostItem) -> Option<f64> {
        self.quantities.get(&item).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.pum.is_none() && self.quantities.is_empty()
    }

    /// Sets `pum` or a line-item key. Unparsable values clear the override.
    pub fn set(&mut self, key: &str, raw: &str) -> Result<(), ConfigError> {
        let value = coerce::optional_number(raw).map(|v| v.max(0.0));
        if key == "pum" {
            self.pum = value;
            return Ok(());
        }
        let item =
            CostItem::from_key(key).ok_or_else(|| ConfigError::UnknownField(key.to_string()))?;
        match value {
            Some(v) => {
                self.quantities.insert(item, v);
            }
            None => {
                self.quantities.remove(&item);
            }
        }
        Ok(())
    }
}

/// Full takeoff configuration. Created with defaults, edited one field at a time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub hall: HallGeometry,
    /// Share of gross area meant to become rentable unit area, percent.
    pub target_efficiency: f64,
    pub split: CategorySplit,
    /// When on, nonzero `manual_counts` are authoritative.
    pub manual_mode: bool,
    pub manual_counts: ManualCounts,
    pub features: Features,
    /// Partition system height in metres.
    pub system_height: f64,
    /// Door opening height in metres; wall above it is lintel.
    pub door_height: f64,
    pub corridor_width: f64,
    pub prices: PriceTable,
    pub leasing: LeasingParams,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hall: HallGeometry::default(),
            target_efficiency: 70.0,
            split: CategorySplit::default(),
            manual_mode: false,
            manual_counts: ManualCounts::default(),
            features: Features::default(),
            system_height: 2.5,
            door_height: 2.5,
            corridor_width: 1.5,
            prices: PriceTable::default(),
            leasing: LeasingParams::default(),
        }
    }
}

impl Config {
    /// Applies one edit by dotted field name, coercing `raw` at this edge.
    ///
    /// Numeric fields never fail: unparsable input becomes zero. Unknown
    /// field names, shapes and sizes are reported.
    pub fn set(&mut self, field: &str, raw: &str) -> Result<(), ConfigError> {
        let field = field.trim();
        let unknown = || ConfigError::UnknownField(field.to_string());
        let mut parts = field.splitn(2, '.');
        let head = parts.next().unwrap_or_default();
        let rest = parts.next().unwrap_or_default();
        match (head, rest) {
            ("hall", "shape") => {
                self.hall.shape = HallShape::parse(raw)
                    .ok_or_else(|| ConfigError::UnknownShape(raw.trim().to_string()))?;
            }
            ("hall", "length") => self.hall.length = coerce::non_negative(raw),
            ("hall", "width") => self.hall.width = coerce::non_negative(raw),
            ("hall", "arm_a.length") => self.hall.arm_a.length = coerce::non_negative(raw),
            ("hall", "arm_a.width") => self.hall.arm_a.width = coerce::non_negative(raw),
            ("hall", "arm_b.length") => self.hall.arm_b.length = coerce::non_negative(raw),
            ("hall", "arm_b.width") => self.hall.arm_b.width = coerce::non_negative(raw),
            ("hall", "total_area") => self.hall.total_area = coerce::non_negative(raw),
            ("hall", "gross_area_override") => {
                self.hall.gross_area_override = coerce::optional_number(raw).map(|v| v.max(0.0));
            }
            ("target_efficiency", "") => self.target_efficiency = coerce::percent(raw),
            ("split", cat) => {
                let category = Category::parse(cat).ok_or_else(unknown)?;
                // Not clamped: an over-100 split must reach validation as entered.
                self.split.set(category, coerce::non_negative(raw));
            }
            ("manual_mode", "") => self.manual_mode = coerce::flag(raw),
            ("counts", key) => {
                let (cat, size) = key.split_once('.').ok_or_else(unknown)?;
                let category = Category::parse(cat).ok_or_else(unknown)?;
                let invalid = || ConfigError::InvalidSize {
                    category,
                    raw: size.to_string(),
                };
                let size = UnitSize::parse(size).ok_or_else(invalid)?;
                self.manual_counts
                    .set(category, size, coerce::count(raw))
                    .map_err(|_| invalid())?;
            }
            ("features", name) => *self.features.get_mut(name).ok_or_else(unknown)? = coerce::flag(raw),
            ("system_height", "") => self.system_height = coerce::non_negative(raw),
            ("door_height", "") => self.door_height = coerce::non_negative(raw),
            ("corridor_width", "") => self.corridor_width = coerce::non_negative(raw),
            ("price", key) => {
                let item = CostItem::from_key(key).ok_or_else(unknown)?;
                self.prices.set_price(item, coerce::money(raw));
            }
            ("leasing", "rent_price") => self.leasing.rent_price = coerce::money(raw),
            ("leasing", "monthly_absorption") => {
                self.leasing.monthly_absorption = coerce::non_negative(raw)
            }
            ("leasing", "max_occupancy") => self.leasing.max_occupancy = coerce::percent(raw),
            ("leasing", "contract_years") => self.leasing.contract_years = coerce::count(raw),
            ("leasing", "license_fee") => self.leasing.license_fee = coerce::money(raw),
            ("leasing", "fixed_monthly_cost") => {
                self.leasing.fixed_monthly_cost = coerce::money(raw)
            }
            ("leasing", "start_date") => self.leasing.start_date = coerce::date(raw),
            _ => return Err(unknown()),
        }
        debug!(field, raw, "config field updated");
        Ok(())
    }

    /// Applies a `field=value` assignment.
    pub fn apply_assignment(&mut self, assignment: &str) -> Result<(), ConfigError> {
        let (field, raw) = assignment
            .split_once('=')
            .ok_or_else(|| ConfigError::UnknownField(assignment.trim().to_string()))?;
        self.set(field, raw)
    }
}
