//! Interchange document: a flat, serializable record of layers and their
//! entities, used to exchange drawings with other tools.

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::style::StrokeOverride;

/// Layer table record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerRecord {
    pub name: String,
    /// Packed `0xRRGGBB` true color.
    pub true_color: u32,
    /// Line weight in hundredths of a millimetre.
    pub lineweight: i16,
    pub linetype: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Application-specific flag; readers that don't know it ignore it.
    #[serde(default)]
    pub autocut: bool,
}

fn default_visible() -> bool {
    true
}

/// One drawable on a named layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Entity {
    Line {
        layer: String,
        start: Point,
        end: Point,
        #[serde(default, skip_serializing_if = "StrokeOverride::is_by_layer")]
        style: StrokeOverride,
    },
    Text {
        layer: String,
        insert: Point,
        text: String,
        height: f64,
        /// Baseline direction in degrees.
        #[serde(default)]
        rotation: f64,
        /// Baseline length.
        #[serde(default)]
        width: Option<f64>,
        #[serde(default, skip_serializing_if = "StrokeOverride::is_by_layer")]
        style: StrokeOverride,
    },
    Dimension {
        layer: String,
        /// First measured point.
        defpoint2: Point,
        /// Second measured point.
        defpoint3: Point,
        #[serde(default)]
        offset: Option<f64>,
        #[serde(default, skip_serializing_if = "StrokeOverride::is_by_layer")]
        style: StrokeOverride,
    },
}

impl Entity {
    /// Name of the layer this entity lives on.
    pub fn layer(&self) -> &str {
        match self {
            Entity::Line { layer, .. } | Entity::Text { layer, .. } | Entity::Dimension { layer, .. } => layer,
        }
    }
}

/// A complete interchange document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterchangeDocument {
    #[serde(default)]
    pub layers: Vec<LayerRecord>,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl InterchangeDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer(&self, name: &str) -> Option<&LayerRecord> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Entities on the named layer, in document order.
    pub fn entities_on<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Entity> + 'a {
        self.entities.iter().filter(move |e| e.layer() == name)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_flag_defaults() {
        let json = r#"{
            "layers": [{"name": "A", "true_color": 255, "lineweight": 25, "linetype": "Dashed"}],
            "entities": [{"type": "Line", "layer": "A", "start": {"x": 0.0, "y": 0.0}, "end": {"x": 1.0, "y": 1.0}}]
        }"#;
        let doc = InterchangeDocument::from_json(json).unwrap();
        let layer = doc.layer("A").unwrap();
        assert!(!layer.autocut);
        assert!(layer.visible);
        assert_eq!(doc.entities_on("A").count(), 1);
        assert_eq!(doc.entities_on("B").count(), 0);
    }

    #[test]
    fn test_json_roundtrip() {
        let doc = InterchangeDocument {
            layers: vec![LayerRecord {
                name: "0".into(),
                true_color: 0,
                lineweight: 13,
                linetype: "Continuous".into(),
                visible: true,
                autocut: true,
            }],
            entities: vec![Entity::Text {
                layer: "0".into(),
                insert: Point::new(1.0, 2.0),
                text: "hi".into(),
                height: 25.0,
                rotation: 90.0,
                width: Some(30.0),
                style: StrokeOverride::default(),
            }],
        };
        let back = InterchangeDocument::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(back, doc);
    }
}
