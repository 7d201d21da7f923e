//! Renderer-facing geometry: angles, axes and transform descriptors.
//!
//! The logical model only knows ring order. Everything a renderer needs to
//! place or animate pieces is derived here from two explicit parameters, the
//! angle of one step-unit and the tilt of the flip axis.
//!
//! Axis conventions:
//! - Both layers spin about the shared normal `+Z`.
//! - The flip axis lies in the XY plane, tilted from `+X` by the flip tilt.

use std::collections::BTreeSet;
use std::f64::consts::PI;
use std::fmt;

use crate::pieces::Piece;
use crate::ring::Layer;

/// A 3D vector in renderer space.
pub type Vector = (f64, f64, f64);

/// Normal axis shared by the top and bottom rings.
pub const NORMAL_AXIS: Vector = (0.0, 0.0, 1.0);

/// Default angle of one step-unit, in degrees.
pub const DEFAULT_STEP_DEGREES: f64 = 30.0;

/// Default tilt of the flip axis away from `+X`, in degrees.
pub const DEFAULT_FLIP_TILT_DEGREES: f64 = 15.0;

/// Angular parameters used to turn logical moves into transforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    /// Angle of one step-unit, in radians.
    pub step_angle: f64,
    /// Unit axis the front half-band turns about during a flip.
    pub flip_axis: Vector,
}

impl Geometry {
    pub fn new(step_degrees: f64, flip_tilt_degrees: f64) -> Self {
        let tilt = flip_tilt_degrees.to_radians();
        Self {
            step_angle: step_degrees.to_radians(),
            flip_axis: (tilt.cos(), tilt.sin(), 0.0),
        }
    }

    /// Signed angle of a slot offset on the given layer.
    pub fn slot_angle(&self, layer: Layer, slot: u8) -> f64 {
        (layer.direction() * slot as i32) as f64 * self.step_angle
    }

    /// Orientation of the middle band about the flip axis.
    pub fn middle_angle(&self, middle_solved: bool) -> f64 {
        if middle_solved {
            0.0
        } else {
            PI
        }
    }

    /// Transform for turning a whole ring by `steps` units.
    pub fn rotation(&self, layer: Layer, ring: &[Piece], steps: i32) -> TransformDescriptor {
        TransformDescriptor {
            affected: ring.to_vec(),
            axis: NORMAL_AXIS,
            angle: (layer.direction() * steps) as f64 * self.step_angle,
        }
    }

    /// Transform for turning the front half-band over.
    pub fn flip(&self, affected: Vec<Piece>) -> TransformDescriptor {
        TransformDescriptor {
            affected,
            axis: self.flip_axis,
            angle: PI,
        }
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new(DEFAULT_STEP_DEGREES, DEFAULT_FLIP_TILT_DEGREES)
    }
}

/// What a renderer must animate for one move.
///
/// The start orientation is always the identity; the end orientation is a
/// rotation by `angle` radians about `axis`, relative to where the affected
/// pieces were before the move.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformDescriptor {
    pub affected: Vec<Piece>,
    pub axis: Vector,
    pub angle: f64,
}

impl TransformDescriptor {
    pub fn affected_names(&self) -> BTreeSet<&'static str> {
        self.affected.iter().map(|piece| piece.name()).collect()
    }

    pub fn moves(&self, piece: Piece) -> bool {
        self.affected.contains(&piece)
    }
}

impl fmt::Display for TransformDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y, z) = self.axis;
        write!(f, "turn ")?;
        for (index, piece) in self.affected.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            f.write_str(piece.name())?;
        }
        write!(
            f,
            " by {:.1} deg about ({:.3}, {:.3}, {:.3})",
            self.angle.to_degrees(),
            x,
            y,
            z
        )
    }
}

/// Resting place of one outer piece, as a renderer should draw it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub piece: Piece,
    pub layer: Layer,
    /// Step-unit offset of the piece's leading edge within its ring.
    pub slot: u8,
    /// Angle about [`NORMAL_AXIS`], in radians.
    pub angle: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_default_flip_axis_is_unit_and_tilted() {
        let (x, y, z) = Geometry::default().flip_axis;
        assert!((x * x + y * y + z * z - 1.0).abs() < EPSILON);
        assert!((y.atan2(x) - 15f64.to_radians()).abs() < EPSILON);
        assert_eq!(z, 0.0);
    }

    #[test]
    fn test_layers_spin_in_opposite_senses() {
        let geometry = Geometry::default();
        let top = geometry.rotation(Layer::Top, &[], 2);
        let bottom = geometry.rotation(Layer::Bottom, &[], 2);
        assert!((top.angle + 60f64.to_radians()).abs() < EPSILON);
        assert!((bottom.angle - 60f64.to_radians()).abs() < EPSILON);
        assert_eq!(top.axis, NORMAL_AXIS);
    }

    #[test]
    fn test_slot_angles() {
        let geometry = Geometry::new(30.0, 15.0);
        assert_eq!(geometry.slot_angle(Layer::Top, 0), 0.0);
        assert!((geometry.slot_angle(Layer::Bottom, 3) - PI / 2.0).abs() < EPSILON);
        assert!((geometry.slot_angle(Layer::Top, 6) + PI).abs() < EPSILON);
    }

    #[test]
    fn test_descriptor_display() {
        let wrb = Piece::from_name("WRB").unwrap();
        let descriptor = Geometry::default().flip(vec![wrb, Piece::MIDDLE_FRONT]);
        assert_eq!(
            descriptor.to_string(),
            "turn WRB,MF by 180.0 deg about (0.966, 0.259, 0.000)"
        );
        assert!(descriptor.moves(wrb));
        assert!(!descriptor.moves(Piece::MIDDLE_BACK));
    }
}
