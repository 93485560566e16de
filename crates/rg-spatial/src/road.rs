//! Road metadata copied onto nodes and edges by map matching.

use std::fmt;
use std::str::FromStr;

/// Functional road class, mirroring the OSM `highway=*` hierarchy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RoadClass {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    Residential,
    Service,
    Track,
    Other,
}

impl RoadClass {
    pub fn as_str(self) -> &'static str {
        match self {
            RoadClass::Motorway    => "motorway",
            RoadClass::Trunk       => "trunk",
            RoadClass::Primary     => "primary",
            RoadClass::Secondary   => "secondary",
            RoadClass::Tertiary    => "tertiary",
            RoadClass::Residential => "residential",
            RoadClass::Service     => "service",
            RoadClass::Track       => "track",
            RoadClass::Other       => "other",
        }
    }
}

impl fmt::Display for RoadClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoadClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "motorway"    => Ok(RoadClass::Motorway),
            "trunk"       => Ok(RoadClass::Trunk),
            "primary"     => Ok(RoadClass::Primary),
            "secondary"   => Ok(RoadClass::Secondary),
            "tertiary"    => Ok(RoadClass::Tertiary),
            "residential" => Ok(RoadClass::Residential),
            "service"     => Ok(RoadClass::Service),
            "track"       => Ok(RoadClass::Track),
            "other"       => Ok(RoadClass::Other),
            other         => Err(format!("unknown road class {other:?}")),
        }
    }
}

/// Name, class, and speed limit of the road a node or edge lies on.
/// All fields are optional: the matching engine may know only some of them.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadInfo {
    pub name:          Option<String>,
    pub class:         Option<RoadClass>,
    pub max_speed_kmh: Option<f64>,
}

impl RoadInfo {
    /// `true` if nothing is known about the road.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.class.is_none() && self.max_speed_kmh.is_none()
    }
}
