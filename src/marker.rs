//! Marker display settings and screen-space geometry.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerShape {
    Circle,
    Square,
}

/// Presentation settings for a catalog's markers. Each source inherits
/// these unless a per-marker override is supplied (the selection highlight
/// doubles `line_width`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSettings {
    pub shape: MarkerShape,
    pub color: String,
    pub line_width: f64,
    pub radius: f64,
}

impl Default for MarkerSettings {
    fn default() -> Self {
        MarkerSettings {
            shape: MarkerShape::Circle,
            color: "#0000FF".to_string(),
            line_width: 2.0,
            radius: 10.0,
        }
    }
}

/// Field-wise update of [`MarkerSettings`]; present fields win.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerPatch {
    pub shape: Option<MarkerShape>,
    pub color: Option<String>,
    pub line_width: Option<f64>,
    pub radius: Option<f64>,
}

impl MarkerPatch {
    pub fn is_empty(&self) -> bool {
        self.shape.is_none()
            && self.color.is_none()
            && self.line_width.is_none()
            && self.radius.is_none()
    }

    pub fn apply_to(&self, settings: &mut MarkerSettings) {
        if let Some(shape) = self.shape {
            settings.shape = shape;
        }
        if let Some(color) = &self.color {
            settings.color = color.clone();
        }
        if let Some(line_width) = self.line_width {
            settings.line_width = line_width;
        }
        if let Some(radius) = self.radius {
            settings.radius = radius;
        }
    }
}

/// The image-pixel to screen-pixel mapping the viewer currently applies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportTransform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl ViewportTransform {
    pub fn new(scale: f64) -> Self {
        ViewportTransform {
            scale,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    pub fn to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.scale + self.offset_x, y * self.scale + self.offset_y)
    }
}

/// Screen-space bounding box of one marker, ready for a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerGeometry {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub line_width: f64,
}

/// Compute where a source's marker lands on screen.
///
/// When zoomed in (`scale > 1`) the radius and line width grow with the
/// image and the *scaled* radius is subtracted from each axis; at or below
/// unit scale the *unscaled* radius is subtracted while the marker keeps
/// its native size. The top-left is offset by the effective line width on
/// both axes to account for border thickness.
pub fn compute_geometry(
    x: f64,
    y: f64,
    settings: &MarkerSettings,
    transform: &ViewportTransform,
) -> MarkerGeometry {
    let (mut sx, mut sy) = transform.to_screen(x, y);
    let mut radius = settings.radius;
    let mut line_width = settings.line_width;
    if transform.scale > 1.0 {
        sx -= settings.radius * transform.scale;
        sy -= settings.radius * transform.scale;
        radius *= transform.scale;
        line_width *= transform.scale;
    } else {
        sx -= settings.radius;
        sy -= settings.radius;
    }
    MarkerGeometry {
        x: sx - line_width,
        y: sy - line_width,
        radius,
        line_width,
    }
}
