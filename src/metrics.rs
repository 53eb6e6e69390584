//! Facility and metric vocabulary plus the per-interaction widget values.

use serde::{Deserialize, Serialize};
use tourism_dash_cli::{FacilityArg, MetricArg};

pub const TOWN_COLUMN: &str = "Town";
pub const HOTELS_COLUMN: &str = "Total number of hotels";
pub const CAFES_COLUMN: &str = "Total number of cafes";
pub const RESTAURANTS_COLUMN: &str = "Total number of restaurants";
pub const GUEST_HOUSES_COLUMN: &str = "Total number of guest houses";

/// A tourism amenity tracked per town, as offered by the pie chart multiselect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facility {
    Restaurants,
    Hotels,
    Cafes,
    GuestHouses,
}

impl Facility {
    /// Multiselect order.
    pub const ALL: [Self; 4] = [
        Self::Restaurants,
        Self::Hotels,
        Self::Cafes,
        Self::GuestHouses,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Restaurants => "Restaurants",
            Self::Hotels => "Hotels",
            Self::Cafes => "Cafes",
            Self::GuestHouses => "Guest Houses",
        }
    }

    /// Integer-coded indicator column; a value of exactly 0 is counted as "has the facility".
    pub fn existence_column(self) -> &'static str {
        match self {
            Self::Restaurants => "Existence of restaurants - does not exist",
            Self::Hotels => "Existence of hotels - does not exist",
            Self::Cafes => "Existence of cafes - does not exist",
            Self::GuestHouses => "Existence of guest houses - does not exist",
        }
    }
}

impl From<FacilityArg> for Facility {
    fn from(arg: FacilityArg) -> Self {
        match arg {
            FacilityArg::Restaurants => Self::Restaurants,
            FacilityArg::Hotels => Self::Hotels,
            FacilityArg::Cafes => Self::Cafes,
            FacilityArg::GuestHouses => Self::GuestHouses,
        }
    }
}

/// A per-town count column selectable for the scatter axes and bubble size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Hotels,
    Cafes,
    Restaurants,
    GuestHouses,
}

impl Metric {
    /// Dropdown order.
    pub const ALL: [Self; 4] = [Self::Hotels, Self::Cafes, Self::Restaurants, Self::GuestHouses];

    pub fn column(self) -> &'static str {
        match self {
            Self::Hotels => HOTELS_COLUMN,
            Self::Cafes => CAFES_COLUMN,
            Self::Restaurants => RESTAURANTS_COLUMN,
            Self::GuestHouses => GUEST_HOUSES_COLUMN,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Hotels => "Hotels",
            Self::Cafes => "Cafes",
            Self::Restaurants => "Restaurants",
            Self::GuestHouses => "Guest Houses",
        }
    }

    /// Next metric in dropdown order, wrapping around.
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    /// Previous metric in dropdown order, wrapping around.
    pub fn prev(self) -> Self {
        let i = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl From<MetricArg> for Metric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Hotels => Self::Hotels,
            MetricArg::Cafes => Self::Cafes,
            MetricArg::Restaurants => Self::Restaurants,
            MetricArg::GuestHouses => Self::GuestHouses,
        }
    }
}

/// Facilities chosen for the pie chart. Keeps insertion order and never holds a duplicate.
/// Empty is a valid state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacilitySelection {
    facilities: Vec<Facility>,
}

impl FacilitySelection {
    pub fn empty() -> Self {
        Self {
            facilities: Vec::new(),
        }
    }

    pub fn all() -> Self {
        Self {
            facilities: Facility::ALL.to_vec(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    pub fn contains(&self, facility: Facility) -> bool {
        self.facilities.contains(&facility)
    }

    pub fn iter(&self) -> impl Iterator<Item = Facility> + '_ {
        self.facilities.iter().copied()
    }

    /// Add a facility at the end. Returns false if it was already selected.
    pub fn insert(&mut self, facility: Facility) -> bool {
        if self.contains(facility) {
            return false;
        }
        self.facilities.push(facility);
        true
    }

    pub fn remove(&mut self, facility: Facility) -> bool {
        let before = self.facilities.len();
        self.facilities.retain(|f| *f != facility);
        self.facilities.len() != before
    }

    pub fn toggle(&mut self, facility: Facility) {
        if !self.remove(facility) {
            self.facilities.push(facility);
        }
    }
}

impl Default for FacilitySelection {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<Facility> for FacilitySelection {
    fn from_iter<I: IntoIterator<Item = Facility>>(iter: I) -> Self {
        let mut selection = Self::empty();
        for facility in iter {
            selection.insert(facility);
        }
        selection
    }
}

/// Scatter plot axes and bubble-size metric. The three need not differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricChoice {
    pub x: Metric,
    pub y: Metric,
    pub size: Metric,
}

impl Default for MetricChoice {
    fn default() -> Self {
        Self {
            x: Metric::Hotels,
            y: Metric::Cafes,
            size: Metric::Restaurants,
        }
    }
}

/// Number of towns shown in the bar chart, always within `[MIN, MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TopNCount(u8);

impl TopNCount {
    pub const MIN: u8 = 5;
    pub const MAX: u8 = 30;
    pub const DEFAULT: u8 = 15;

    /// Clamps into range; the slider cannot produce anything else.
    pub fn new(n: u8) -> Self {
        Self(n.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }

    pub fn increment(self) -> Self {
        Self::new(self.0.saturating_add(1))
    }

    pub fn decrement(self) -> Self {
        Self::new(self.0.saturating_sub(1))
    }
}

impl Default for TopNCount {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}
