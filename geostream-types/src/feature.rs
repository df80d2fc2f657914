//! Features and feature collections.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::bounding_rect::BoundingBox;
use crate::content::{
    CollectionHeader, FeatureContent, FeatureHeader, GeometryContent, PropertyContent,
};
use crate::geometry::{Geometry, WriteGeometry};

/// Map of feature properties. Keys are unique and keep their insertion order.
pub type PropertyMap = Map<String, Value>;

/// Identifier of a feature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureId {
    /// Integer id.
    Int(i64),
    /// String id.
    Text(String),
}

impl Display for FeatureId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureId::Int(v) => write!(f, "{v}"),
            FeatureId::Text(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for FeatureId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for FeatureId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FeatureId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A feature: an optional geometry with properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Optional identifier.
    pub id: Option<FeatureId>,
    /// Primary geometry.
    pub geometry: Option<Geometry>,
    /// Feature properties.
    pub properties: PropertyMap,
    /// Explicit bounding box.
    pub bounds: Option<BoundingBox>,
    /// Members outside of the standard feature fields.
    pub custom: PropertyMap,
}

impl Feature {
    /// Creates a feature with the given geometry and no properties.
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry: Some(geometry),
            ..Default::default()
        }
    }

    /// Sets the id.
    pub fn with_id(mut self, id: impl Into<FeatureId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Adds a property.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Sets the bounding box.
    pub fn with_bounds(mut self, bounds: BoundingBox) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Writes the feature into the sink.
    pub fn write_to(&self, sink: &mut dyn FeatureContent) {
        let header = FeatureHeader {
            id: self.id.as_ref(),
            properties: Some(&self.properties),
            bounds: self.bounds.as_ref(),
        };

        let mut geometry = |content: &mut dyn GeometryContent| {
            if let Some(geometry) = &self.geometry {
                geometry.write_geometry(content);
            }
        };
        let mut custom = |content: &mut dyn PropertyContent| write_members(&self.custom, content);

        sink.feature(
            header,
            self.geometry
                .is_some()
                .then_some(&mut geometry as &mut dyn FnMut(&mut dyn GeometryContent)),
            (!self.custom.is_empty())
                .then_some(&mut custom as &mut dyn FnMut(&mut dyn PropertyContent)),
        );
    }
}

/// Ordered list of features.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    /// Features of the collection.
    pub features: Vec<Feature>,
    /// Explicit bounding box.
    pub bounds: Option<BoundingBox>,
    /// Members outside of the standard collection fields.
    pub custom: PropertyMap,
}

impl FeatureCollection {
    /// Creates a collection of the given features.
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            features,
            ..Default::default()
        }
    }

    /// Sets the bounding box.
    pub fn with_bounds(mut self, bounds: BoundingBox) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Writes the collection into the sink.
    pub fn write_to(&self, sink: &mut dyn FeatureContent) {
        let header = CollectionHeader::with_count(self.features.len())
            .with_opt_bounds(self.bounds.as_ref());
        let mut custom = |content: &mut dyn PropertyContent| write_members(&self.custom, content);

        sink.feature_collection(
            header,
            &mut |content| {
                for feature in &self.features {
                    feature.write_to(content);
                }
            },
            (!self.custom.is_empty())
                .then_some(&mut custom as &mut dyn FnMut(&mut dyn PropertyContent)),
        );
    }
}

fn write_members(members: &PropertyMap, content: &mut dyn PropertyContent) {
    for (name, value) in members {
        match value {
            Value::Object(map) => content.properties(name, map),
            value => content.property(name, value),
        }
    }
}
