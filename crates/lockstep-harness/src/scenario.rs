// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! JSON scenario files.
//!
//! A scenario describes an initial world and how long to run it:
//!
//! ```json
//! {
//!   "name": "pile",
//!   "steps": 120,
//!   "tick_rate": 60,
//!   "layer_rules": [{ "a": "player", "b": "pickup", "collide": false }],
//!   "objects": [
//!     { "shape": "plane", "normal": [0, 1, 0], "layer": "environment" },
//!     { "shape": "sphere", "radius": 0.5, "position": [0, 4, 0] }
//!   ]
//! }
//! ```
//!
//! Decimal values cross into fixed point through `Fp::from_f64`, which is
//! bit-exact on every platform, so a scenario file always builds the same
//! world.
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use lockstep_math::{Fp, Fp3};
use lockstep_phys::{Collider, InstanceId, Layer, PhysWorld, WorldConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

const fn default_tick_rate() -> u32 {
    60
}

const fn default_true() -> bool {
    true
}

fn default_layer() -> String {
    Layer::Default.name().to_owned()
}

const fn default_axis() -> [f64; 3] {
    [0.0, 1.0, 0.0]
}

/// A complete scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Display name, copied into golden files.
    pub name: String,
    /// Number of fixed steps to run.
    pub steps: u32,
    /// Steps per simulated second; `dt = 1 / tick_rate`.
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
    /// Overrides the default gravity for every object.
    #[serde(default)]
    pub gravity: Option<[f64; 3]>,
    /// Layer pairs whose collision flag differs from the all-enabled default.
    #[serde(default)]
    pub layer_rules: Vec<LayerRule>,
    /// Objects in insertion order.
    pub objects: Vec<ObjectSpec>,
}

/// One entry of the layer matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerRule {
    /// First layer name.
    pub a: String,
    /// Second layer name.
    pub b: String,
    /// Whether the two layers collide.
    pub collide: bool,
}

/// Collider shape of an object, tagged by `"shape"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ShapeSpec {
    /// Sphere centered on the object.
    Sphere {
        /// Radius.
        radius: f64,
    },
    /// Capsule centered on the object.
    Capsule {
        /// Cap radius.
        radius: f64,
        /// Tip-to-tip length.
        height: f64,
        /// Long axis in local space.
        #[serde(default = "default_axis")]
        axis: [f64; 3],
    },
    /// Axis-aligned box centered on the object.
    Aabb {
        /// Half extents.
        half_extents: [f64; 3],
    },
    /// Static plane through the object position.
    Plane {
        /// Plane normal.
        normal: [f64; 3],
    },
    /// No collider; the object only integrates.
    None,
}

/// One object.
///
/// Unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSpec {
    /// Shape and its parameters.
    #[serde(flatten)]
    pub shape: ShapeSpec,
    /// Local position.
    #[serde(default)]
    pub position: [f64; 3],
    /// Initial velocity.
    #[serde(default)]
    pub velocity: [f64; 3],
    /// Layer name (case-insensitive).
    #[serde(default = "default_layer")]
    pub layer: String,
    /// Integrated and given finite mass. Planes default to `false`.
    #[serde(default)]
    pub dynamic: Option<bool>,
    /// Moved by the solvers.
    #[serde(default = "default_true")]
    pub kinematic: bool,
    /// Restitution override.
    #[serde(default)]
    pub restitution: Option<f64>,
    /// Static friction override.
    #[serde(default)]
    pub static_friction: Option<f64>,
    /// Dynamic friction override.
    #[serde(default)]
    pub dynamic_friction: Option<f64>,
    /// Index of an earlier object in the list to parent under.
    #[serde(default)]
    pub parent: Option<usize>,
}

fn fp3(v: [f64; 3]) -> Fp3 {
    Fp3::new(Fp::from_f64(v[0]), Fp::from_f64(v[1]), Fp::from_f64(v[2]))
}

fn parse_layer(name: &str) -> Result<Layer> {
    name.parse::<Layer>()
        .with_context(|| format!("unknown layer {name:?}"))
}

impl ShapeSpec {
    fn collider(&self, layer: Layer) -> Option<Collider> {
        let collider = match *self {
            Self::Sphere { radius } => Collider::sphere(Fp3::ZERO, Fp::from_f64(radius)),
            Self::Capsule {
                radius,
                height,
                axis,
            } => Collider::capsule(
                Fp3::ZERO,
                Fp::from_f64(radius),
                Fp::from_f64(height),
                fp3(axis),
            ),
            Self::Aabb { half_extents } => {
                let half = fp3(half_extents);
                Collider::aabb(-half, half)
            }
            Self::Plane { normal } => Collider::plane(fp3(normal), Fp::ZERO),
            Self::None => return None,
        };
        Some(collider.with_layer(layer))
    }
}

impl Scenario {
    /// Parses a scenario from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let scenario: Self = serde_json::from_str(text).context("invalid scenario JSON")?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Reads and parses a scenario file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in scenario {}", path.display()))
    }

    fn validate(&self) -> Result<()> {
        if self.tick_rate == 0 {
            bail!("tick_rate must be positive");
        }
        for rule in &self.layer_rules {
            parse_layer(&rule.a)?;
            parse_layer(&rule.b)?;
        }
        for (i, object) in self.objects.iter().enumerate() {
            parse_layer(&object.layer).with_context(|| format!("object {i}"))?;
            if let Some(parent) = object.parent {
                if parent >= i {
                    bail!("object {i}: parent {parent} must refer to an earlier object");
                }
            }
        }
        Ok(())
    }

    /// Fixed step length.
    pub fn dt(&self) -> Fp {
        Fp::from_ratio(1, i64::from(self.tick_rate))
    }

    /// World configuration with the scenario's gravity override applied.
    pub fn config(&self) -> WorldConfig {
        let mut config = WorldConfig::default();
        if let Some(g) = self.gravity {
            config.gravity = fp3(g);
        }
        config
    }

    /// Builds the initial world. Object ids are assigned in list order
    /// starting at `1`.
    pub fn build(&self) -> Result<PhysWorld> {
        let mut world = PhysWorld::with_config(self.config());
        for rule in &self.layer_rules {
            world.matrix_mut().set_layer_collisions(
                parse_layer(&rule.a)?,
                parse_layer(&rule.b)?,
                rule.collide,
            );
        }

        let mut ids: Vec<InstanceId> = Vec::with_capacity(self.objects.len());
        for (i, spec) in self.objects.iter().enumerate() {
            let layer = parse_layer(&spec.layer)?;
            let is_plane = matches!(spec.shape, ShapeSpec::Plane { .. });
            let mut object = world
                .new_object()
                .with_context(|| format!("object {i}"))?
                .with_position(fp3(spec.position))
                .with_flags(spec.dynamic.unwrap_or(!is_plane), spec.kinematic);
            object.collider = spec.shape.collider(layer);
            object.velocity = fp3(spec.velocity);
            if let Some(e) = spec.restitution {
                object.restitution = Fp::from_f64(e);
            }
            if let Some(mu) = spec.static_friction {
                object.static_friction = Fp::from_f64(mu);
            }
            if let Some(mu) = spec.dynamic_friction {
                object.dynamic_friction = Fp::from_f64(mu);
            }
            let id = world
                .add_object(object)
                .with_context(|| format!("object {i}"))?;
            if let Some(parent) = spec.parent {
                let parent_id = ids
                    .get(parent)
                    .copied()
                    .with_context(|| format!("object {i}: no object at index {parent}"))?;
                world
                    .set_parent(id, Some(parent_id))
                    .with_context(|| format!("object {i}"))?;
            }
            ids.push(id);
        }
        debug!(name = %self.name, objects = ids.len(), "scenario built");
        Ok(world)
    }
}
