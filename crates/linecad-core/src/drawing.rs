//! A drawing: an ordered list of layers, one of them current.

use kurbo::{Point, Rect};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::drawables::Drawable;
use crate::error::{EditError, EditResult};
use crate::hotspot::{Hotspot, HotspotAddress};
use crate::interchange::InterchangeDocument;
use crate::layer::{CleanupReport, CleanupSettings, Layer, LayerId};

/// Name of the layer every new drawing starts with.
pub const DEFAULT_LAYER_NAME: &str = "0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drawing {
    pub name: String,
    layers: Vec<Layer>,
    current_layer: usize,
    #[serde(default)]
    pub cleanup: CleanupSettings,
}

impl Default for Drawing {
    fn default() -> Self {
        Self::new()
    }
}

impl Drawing {
    /// A drawing with a single default layer.
    pub fn new() -> Self {
        Self::with_name("untitled")
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layers: vec![Layer::new(DEFAULT_LAYER_NAME)],
            current_layer: 0,
            cleanup: CleanupSettings::default(),
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id() == id)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id() == id)
    }

    pub fn layer_by_name(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn current_layer(&self) -> &Layer {
        &self.layers[self.current_layer]
    }

    pub fn current_layer_mut(&mut self) -> &mut Layer {
        &mut self.layers[self.current_layer]
    }

    pub fn current_layer_id(&self) -> LayerId {
        self.current_layer().id()
    }

    pub fn current_layer_index(&self) -> usize {
        self.current_layer
    }

    pub fn set_current_layer(&mut self, index: usize) -> EditResult<()> {
        if index >= self.layers.len() {
            return Err(EditError::LayerIndexOutOfRange {
                index,
                len: self.layers.len(),
            });
        }
        self.current_layer = index;
        Ok(())
    }

    /// Append a layer and return its id.
    pub fn add_layer(&mut self, layer: Layer) -> LayerId {
        let id = layer.id();
        self.layers.push(layer);
        id
    }

    /// Remove the layer at `index`. The last remaining layer can't be
    /// removed.
    pub fn remove_layer(&mut self, index: usize) -> EditResult<Layer> {
        if index >= self.layers.len() {
            return Err(EditError::LayerIndexOutOfRange {
                index,
                len: self.layers.len(),
            });
        }
        if self.layers.len() == 1 {
            return Err(EditError::LastLayer);
        }
        let layer = self.layers.remove(index);
        if self.current_layer >= self.layers.len() || self.current_layer > index {
            self.current_layer = self.current_layer.saturating_sub(1);
        }
        Ok(layer)
    }

    /// Add a drawable to a layer and run that layer's cleanup.
    pub fn add_drawable(&mut self, layer: LayerId, drawable: impl Into<Drawable>) -> EditResult<CleanupReport> {
        let settings = self.cleanup;
        let layer = self.layer_mut(layer).ok_or(EditError::LayerNotFound(layer))?;
        Ok(layer.add_drawable(drawable, &settings))
    }

    /// Drawables of all visible layers, in layer order.
    pub fn visible_drawables(&self) -> impl Iterator<Item = &Drawable> {
        self.layers
            .iter()
            .filter(|l| l.visible)
            .flat_map(|l| l.drawables().iter())
    }

    /// Hotspots of visible drawables touching `rect`.
    pub fn hotspots_in_rect(&self, rect: Rect) -> Vec<Hotspot> {
        self.layers
            .iter()
            .filter(|l| l.visible)
            .flat_map(|l| l.hotspots_in_rect(rect))
            .collect()
    }

    /// First hotspot within `tolerance` of `point`.
    pub fn hotspot_at(&self, point: Point, tolerance: f64) -> Option<Hotspot> {
        let area = Rect::from_center_size(point, (tolerance * 2.0, tolerance * 2.0));
        self.hotspots_in_rect(area)
            .into_iter()
            .find(|h| h.hit_test(point, tolerance))
    }

    /// Move one endpoint of a committed drawable in place.
    pub fn set_endpoint(&mut self, address: HotspotAddress, point: Point) -> EditResult<()> {
        let layer = self
            .layer_mut(address.layer)
            .ok_or(EditError::LayerNotFound(address.layer))?;
        layer.set_endpoint(address.drawable, address.endpoint, point)
    }

    /// Remove the first drawable on the current layer within `margin` of
    /// `point`.
    pub fn delete_at(&mut self, point: Point, margin: f64) -> Option<Drawable> {
        self.current_layer_mut().remove_at_point(point, margin)
    }

    /// Total number of drawables across layers.
    pub fn drawable_count(&self) -> usize {
        self.layers.iter().map(Layer::len).sum()
    }

    /// Layer table plus every drawable as an interchange entity.
    pub fn to_interchange(&self) -> InterchangeDocument {
        let mut doc = InterchangeDocument::new();
        for layer in &self.layers {
            doc.layers.push(layer.to_record());
            doc.entities
                .extend(layer.drawables().iter().map(|d| d.to_entity(&layer.name)));
        }
        doc
    }

    /// Rebuild a drawing from an interchange document.
    ///
    /// Entities are added through the normal cleanup pipeline. An entity
    /// on a layer missing from the table gets a default layer of that name.
    pub fn from_interchange(name: impl Into<String>, doc: &InterchangeDocument, cleanup: CleanupSettings) -> Self {
        let mut layers: Vec<Layer> = doc.layers.iter().map(Layer::from_record).collect();
        for entity in &doc.entities {
            let index = match layers.iter().position(|l| l.name == entity.layer()) {
                Some(index) => index,
                None => {
                    warn!("entity on undeclared layer {}, creating it", entity.layer());
                    layers.push(Layer::new(entity.layer()));
                    layers.len() - 1
                }
            };
            layers[index].add_drawable(Drawable::from_entity(entity), &cleanup);
        }
        if layers.is_empty() {
            layers.push(Layer::new(DEFAULT_LAYER_NAME));
        }
        let drawing = Self {
            name: name.into(),
            layers,
            current_layer: 0,
            cleanup,
        };
        info!(
            "loaded drawing {} with {} layers and {} drawables",
            drawing.name,
            drawing.layers.len(),
            drawing.drawable_count()
        );
        drawing
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut drawing: Drawing = serde_json::from_str(json)?;
        if drawing.layers.is_empty() {
            drawing.layers.push(Layer::new(DEFAULT_LAYER_NAME));
        }
        drawing.current_layer = drawing.current_layer.min(drawing.layers.len() - 1);
        Ok(drawing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawables::{Dimension, DrawableKind, Line, Text};
    use crate::geometry::Endpoint;
    use crate::style::{LineType, LineWeight, RgbColor};

    fn line(ax: f64, ay: f64, bx: f64, by: f64) -> Line {
        Line::new(Point::new(ax, ay), Point::new(bx, by))
    }

    #[test]
    fn test_new_drawing_has_default_layer() {
        let drawing = Drawing::new();
        assert_eq!(drawing.layers().len(), 1);
        assert_eq!(drawing.current_layer().name, DEFAULT_LAYER_NAME);
    }

    #[test]
    fn test_add_drawable_unknown_layer() {
        let mut drawing = Drawing::new();
        let missing = uuid::Uuid::new_v4();
        let err = drawing.add_drawable(missing, line(0.0, 0.0, 1.0, 1.0)).unwrap_err();
        assert_eq!(err, EditError::LayerNotFound(missing));
    }

    #[test]
    fn test_remove_layer_keeps_one() {
        let mut drawing = Drawing::new();
        assert_eq!(drawing.remove_layer(0).unwrap_err(), EditError::LastLayer);
        drawing.add_layer(Layer::new("a"));
        drawing.set_current_layer(1).unwrap();
        drawing.remove_layer(1).unwrap();
        assert_eq!(drawing.current_layer_index(), 0);
        assert!(drawing.set_current_layer(4).is_err());
    }

    #[test]
    fn test_hotspot_edit_skips_cleanup() {
        let mut drawing = Drawing::new();
        let layer = drawing.current_layer_id();
        drawing.add_drawable(layer, line(0.0, 0.0, 10.0, 0.0)).unwrap();
        drawing.add_drawable(layer, line(0.0, 20.0, 10.0, 20.0)).unwrap();

        let hotspot = drawing.hotspot_at(Point::new(10.5, 19.5), 2.0).unwrap();
        assert_eq!(hotspot.address.drawable, 1);
        assert_eq!(hotspot.address.endpoint, Endpoint::End);

        // Collapse the second line onto the first: no dedupe happens.
        drawing.set_endpoint(hotspot.address, Point::new(10.0, 0.0)).unwrap();
        let mut start = hotspot.address;
        start.endpoint = Endpoint::Start;
        drawing.set_endpoint(start, Point::new(0.0, 0.0)).unwrap();
        assert_eq!(drawing.current_layer().len(), 2);
    }

    #[test]
    fn test_set_endpoint_bad_address() {
        let mut drawing = Drawing::new();
        let address = HotspotAddress {
            layer: drawing.current_layer_id(),
            drawable: 0,
            endpoint: Endpoint::Start,
        };
        assert!(matches!(
            drawing.set_endpoint(address, Point::ZERO),
            Err(EditError::DrawableOutOfRange { .. })
        ));
    }

    #[test]
    fn test_delete_at() {
        let mut drawing = Drawing::new();
        let layer = drawing.current_layer_id();
        drawing.add_drawable(layer, line(0.0, 0.0, 100.0, 0.0)).unwrap();
        assert!(drawing.delete_at(Point::new(50.0, 30.0), 5.0).is_none());
        assert!(drawing.delete_at(Point::new(50.0, 4.0), 5.0).is_some());
        assert_eq!(drawing.drawable_count(), 0);
    }

    #[test]
    fn test_interchange_roundtrip() {
        let mut drawing = Drawing::new();
        let base = drawing.current_layer_id();
        let mut walls = Layer::new("walls");
        walls.color = RgbColor::from_rgb(10, 20, 30);
        walls.line_weight = LineWeight::new(7);
        walls.line_type = LineType::DashDot;
        walls.autocut = true;
        let walls = drawing.add_layer(walls);

        drawing.add_drawable(base, line(0.0, 0.0, 10.0, 0.0)).unwrap();
        drawing
            .add_drawable(base, Text::new(Point::new(0.0, 5.0), Point::new(30.0, 5.0), "note", 12.0))
            .unwrap();
        drawing.add_drawable(walls, line(0.0, 0.0, 10.0, 10.0)).unwrap();
        drawing.add_drawable(walls, line(0.0, 10.0, 10.0, 0.0)).unwrap();
        drawing
            .add_drawable(walls, Dimension::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0)))
            .unwrap();

        let doc = drawing.to_interchange();
        let json = doc.to_json().unwrap();
        let back = Drawing::from_interchange(
            "copy",
            &InterchangeDocument::from_json(&json).unwrap(),
            CleanupSettings::default(),
        );

        assert_eq!(back.layers().len(), 2);
        let walls_back = back.layer_by_name("walls").unwrap();
        let walls_orig = drawing.layer(walls).unwrap();
        assert_eq!(walls_back.color, walls_orig.color);
        assert_eq!(walls_back.line_weight, walls_orig.line_weight);
        assert_eq!(walls_back.line_type, walls_orig.line_type);
        assert!(walls_back.autocut);
        assert_eq!(walls_back.len(), walls_orig.len());
        assert_eq!(back.layer_by_name("0").unwrap().len(), 2);
        assert!(
            walls_back
                .drawables()
                .iter()
                .any(|d| d.kind() == DrawableKind::Dimension)
        );
    }

    #[test]
    fn test_interchange_creates_missing_layer() {
        let doc = InterchangeDocument::from_json(
            r#"{"entities": [{"type": "Line", "layer": "ghost", "start": {"x": 0.0, "y": 0.0}, "end": {"x": 5.0, "y": 0.0}}]}"#,
        )
        .unwrap();
        let drawing = Drawing::from_interchange("d", &doc, CleanupSettings::default());
        assert_eq!(drawing.layer_by_name("ghost").map(Layer::len), Some(1));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut drawing = Drawing::with_name("plan");
        let layer = drawing.current_layer_id();
        drawing.add_drawable(layer, line(0.0, 0.0, 10.0, 0.0)).unwrap();
        let back = Drawing::from_json(&drawing.to_json().unwrap()).unwrap();
        assert_eq!(back.name, "plan");
        assert_eq!(back.current_layer_id(), layer);
        assert_eq!(back.drawable_count(), 1);
    }
}
