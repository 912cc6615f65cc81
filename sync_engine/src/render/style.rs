use crate::classify::Category;
use crate::facility::FacilityKind;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

const STROKE_COLOR: &str = "#fff";
const STROKE_WEIGHT: u8 = 2;
const FILL_OPACITY: f32 = 0.8;

const RADIUS_MOBILE: u8 = 8;
const RADIUS_DESKTOP: u8 = 10;
const POPUP_WIDTH_MOBILE: u16 = 280;
const POPUP_WIDTH_DESKTOP: u16 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MarkerShape {
    Circle { radius: u8 },
    Pin,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub shape: MarkerShape,
    pub category: Category,
    pub fill_color: &'static str,
    pub stroke_color: &'static str,
    pub weight: u8,
    pub fill_opacity: f32,
    pub popup_max_width: u16,
}

/// Device-mode input. Read once per cycle; flipping it restyles markers on
/// the next cycle.
#[derive(Debug, Clone, Default)]
pub struct Viewport {
    mobile: Arc<AtomicBool>,
}

impl Viewport {
    pub fn new(mobile: bool) -> Self {
        Self {
            mobile: Arc::new(AtomicBool::new(mobile)),
        }
    }

    pub fn is_mobile(&self) -> bool {
        self.mobile.load(Ordering::Acquire)
    }

    /// Returns whether the mode changed.
    pub fn set_mobile(&self, mobile: bool) -> bool {
        self.mobile.swap(mobile, Ordering::AcqRel) != mobile
    }
}

pub fn style_for(kind: FacilityKind, category: Category, mobile: bool) -> MarkerStyle {
    let shape = match kind {
        FacilityKind::Station => MarkerShape::Circle {
            radius: if mobile { RADIUS_MOBILE } else { RADIUS_DESKTOP },
        },
        FacilityKind::Parking => MarkerShape::Pin,
    };

    MarkerStyle {
        shape,
        category,
        fill_color: category.color(),
        stroke_color: STROKE_COLOR,
        weight: STROKE_WEIGHT,
        fill_opacity: FILL_OPACITY,
        popup_max_width: if mobile {
            POPUP_WIDTH_MOBILE
        } else {
            POPUP_WIDTH_DESKTOP
        },
    }
}
