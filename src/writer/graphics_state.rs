//! Extended Graphics State (ExtGState) resources for transparency.
//!
//! Report styling needs two opacity channels: the fill alpha of shaded rows
//! and the stroke alpha of borders and decorative rules. Each distinct pair
//! becomes one `/ExtGState` resource shared by every page.
//!
//! # Example
//!
//! ```
//! use report_oxide::writer::graphics_state::ExtGStateBuilder;
//!
//! let gs = ExtGStateBuilder::new()
//!     .fill_alpha(0.7)
//!     .stroke_alpha(0.5)
//!     .build();
//! assert!(gs.as_dict().is_some());
//! ```

use crate::object::Object;
use std::collections::HashMap;

/// Builder for Extended Graphics State dictionaries.
#[derive(Debug, Clone, Default)]
pub struct ExtGStateBuilder {
    /// Fill alpha (ca) - 0.0 to 1.0
    fill_alpha: Option<f32>,
    /// Stroke alpha (CA) - 0.0 to 1.0
    stroke_alpha: Option<f32>,
}

impl ExtGStateBuilder {
    /// Create a new ExtGState builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set fill alpha (opacity for fill and text operations).
    ///
    /// Value is clamped to 0.0 (fully transparent) ..= 1.0 (fully opaque).
    pub fn fill_alpha(mut self, alpha: f32) -> Self {
        self.fill_alpha = Some(alpha.clamp(0.0, 1.0));
        self
    }

    /// Set stroke alpha (opacity for stroke operations).
    pub fn stroke_alpha(mut self, alpha: f32) -> Self {
        self.stroke_alpha = Some(alpha.clamp(0.0, 1.0));
        self
    }

    /// Build the ExtGState dictionary.
    pub fn build(&self) -> Object {
        let mut dict = HashMap::new();
        dict.insert("Type".to_string(), Object::Name("ExtGState".to_string()));

        if let Some(ca) = self.fill_alpha {
            dict.insert("ca".to_string(), Object::Real(ca as f64));
        }
        if let Some(ca) = self.stroke_alpha {
            dict.insert("CA".to_string(), Object::Real(ca as f64));
        }

        Object::Dictionary(dict)
    }
}

/// Opacity pair quantized to thousandths so it can key a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpacityKey {
    fill: u16,
    stroke: u16,
}

impl OpacityKey {
    /// Quantize a (fill, stroke) alpha pair.
    pub fn new(fill_alpha: f32, stroke_alpha: f32) -> Self {
        let q = |a: f32| (a.clamp(0.0, 1.0) * 1000.0).round() as u16;
        Self {
            fill: q(fill_alpha),
            stroke: q(stroke_alpha),
        }
    }

    /// Fill alpha as a unit value.
    pub fn fill_alpha(&self) -> f32 {
        self.fill as f32 / 1000.0
    }

    /// Stroke alpha as a unit value.
    pub fn stroke_alpha(&self) -> f32 {
        self.stroke as f32 / 1000.0
    }

    /// True when both channels are fully opaque.
    pub fn is_opaque(&self) -> bool {
        self.fill == 1000 && self.stroke == 1000
    }
}

/// Assigns resource names (`GS1`, `GS2`, ...) to distinct opacity pairs.
#[derive(Debug, Clone, Default)]
pub struct ExtGStateRegistry {
    names: HashMap<OpacityKey, String>,
    order: Vec<OpacityKey>,
}

impl ExtGStateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resource name for an opacity pair, registering it on first use.
    pub fn name_for(&mut self, key: OpacityKey) -> String {
        if let Some(name) = self.names.get(&key) {
            return name.clone();
        }
        let name = format!("GS{}", self.order.len() + 1);
        self.names.insert(key, name.clone());
        self.order.push(key);
        name
    }

    /// Registered states in registration order with their dictionaries.
    pub fn states(&self) -> impl Iterator<Item = (&str, Object)> + '_ {
        self.order.iter().filter_map(move |key| {
            self.names.get(key).map(|name| {
                let dict = ExtGStateBuilder::new()
                    .fill_alpha(key.fill_alpha())
                    .stroke_alpha(key.stroke_alpha())
                    .build();
                (name.as_str(), dict)
            })
        })
    }

    /// Number of registered states.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when no state has been registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
