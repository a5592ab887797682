//! Snap points and editable hotspots.

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::geometry::Endpoint;
use crate::layer::LayerId;
use crate::tolerance::points_equal;

/// What kind of feature a snap point marks.
///
/// `Perpendicular` and `Touching` are reserved: nothing emits them yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HotspotClass {
    Endpoint,
    Midpoint,
    Perpendicular,
    Touching,
    Grid,
}

/// A candidate location the cursor may snap to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapPoint {
    pub class: HotspotClass,
    pub point: Point,
}

impl SnapPoint {
    pub fn new(class: HotspotClass, point: Point) -> Self {
        Self { class, point }
    }
}

/// Stable address of one endpoint of a committed drawable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HotspotAddress {
    pub layer: LayerId,
    /// Position of the drawable within its layer.
    pub drawable: usize,
    pub endpoint: Endpoint,
}

/// An editable point on a committed drawable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub class: HotspotClass,
    pub point: Point,
    pub address: HotspotAddress,
}

impl Hotspot {
    /// Whether `point` is within `tolerance` of this hotspot on both axes.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        points_equal(self.point, point, tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_hotspot_hit_test() {
        let hotspot = Hotspot {
            class: HotspotClass::Endpoint,
            point: Point::new(10.0, 10.0),
            address: HotspotAddress {
                layer: Uuid::new_v4(),
                drawable: 0,
                endpoint: Endpoint::End,
            },
        };
        assert!(hotspot.hit_test(Point::new(11.5, 9.0), 2.0));
        assert!(!hotspot.hit_test(Point::new(13.0, 10.0), 2.0));
    }
}
