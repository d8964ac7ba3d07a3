//! Body-part handles for animated agents.
//!
//! Renderers hand over the node handle of each limb once, when the model is
//! built. The simulation never searches a model's children; it indexes the
//! rig by [`BodyPart`] and reports swing angles against those handles.

use serde::{Deserialize, Serialize};

/// Peak limb swing in radians.
const SWING_AMPLITUDE: f32 = 0.6;

/// Named limbs of a humanoid model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyPart {
    /// Head
    Head,
    /// Torso
    Torso,
    /// Left arm
    LeftArm,
    /// Right arm
    RightArm,
    /// Left leg
    LeftLeg,
    /// Right leg
    RightLeg,
}

impl BodyPart {
    /// Number of body parts.
    pub const COUNT: usize = 6;

    /// Get all body parts.
    #[must_use]
    pub const fn all() -> [Self; Self::COUNT] {
        [
            Self::Head,
            Self::Torso,
            Self::LeftArm,
            Self::RightArm,
            Self::LeftLeg,
            Self::RightLeg,
        ]
    }

    const fn index(self) -> usize {
        self as usize
    }

    /// Swing direction during a walk cycle, 0 for parts that do not swing.
    ///
    /// Arms swing opposite to the leg on the same side.
    const fn swing_sign(self) -> f32 {
        match self {
            Self::LeftArm | Self::RightLeg => 1.0,
            Self::RightArm | Self::LeftLeg => -1.0,
            Self::Head | Self::Torso => 0.0,
        }
    }
}

/// Opaque renderer node handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartHandle(pub u32);

/// Pitch to apply to one limb this frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LimbPose {
    /// Limb being posed
    pub part: BodyPart,
    /// Renderer node for the limb
    pub handle: PartHandle,
    /// Rotation about the limb's local X axis in radians
    pub pitch: f32,
}

/// Arena of limb handles indexed by [`BodyPart`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rig {
    parts: [Option<PartHandle>; BodyPart::COUNT],
}

impl Rig {
    /// Create an empty rig.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the handle for a body part.
    #[must_use]
    pub fn with_part(mut self, part: BodyPart, handle: PartHandle) -> Self {
        self.parts[part.index()] = Some(handle);
        self
    }

    /// Look up the handle for a body part.
    #[must_use]
    pub fn get(&self, part: BodyPart) -> Option<PartHandle> {
        self.parts[part.index()]
    }

    /// Walk-cycle pose for every attached swinging limb.
    ///
    /// Limbs rest at zero pitch while the agent is standing still.
    #[must_use]
    pub fn walk_pose(&self, gait_phase: f32, moving: bool) -> Vec<LimbPose> {
        let swing = if moving {
            gait_phase.sin() * SWING_AMPLITUDE
        } else {
            0.0
        };

        BodyPart::all()
            .into_iter()
            .filter(|part| part.swing_sign() != 0.0)
            .filter_map(|part| {
                self.get(part).map(|handle| LimbPose {
                    part,
                    handle,
                    pitch: swing * part.swing_sign(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_rig() -> Rig {
        BodyPart::all()
            .into_iter()
            .enumerate()
            .fold(Rig::new(), |rig, (i, part)| {
                rig.with_part(part, PartHandle(i as u32 + 10))
            })
    }

    #[test]
    fn test_rig_lookup() {
        let rig = Rig::new().with_part(BodyPart::LeftLeg, PartHandle(4));
        assert_eq!(rig.get(BodyPart::LeftLeg), Some(PartHandle(4)));
        assert_eq!(rig.get(BodyPart::Head), None);
    }

    #[test]
    fn test_walk_pose_opposes_limbs() {
        let rig = full_rig();
        let pose = rig.walk_pose(std::f32::consts::FRAC_PI_2, true);
        assert_eq!(pose.len(), 4);

        let pitch = |part| {
            pose.iter()
                .find(|p| p.part == part)
                .map(|p| p.pitch)
                .unwrap_or_default()
        };
        assert!((pitch(BodyPart::LeftArm) - SWING_AMPLITUDE).abs() < 1e-6);
        assert!((pitch(BodyPart::LeftArm) + pitch(BodyPart::LeftLeg)).abs() < 1e-6);
        assert!((pitch(BodyPart::RightArm) + pitch(BodyPart::RightLeg)).abs() < 1e-6);
    }

    #[test]
    fn test_walk_pose_at_rest() {
        let pose = full_rig().walk_pose(1.0, false);
        assert!(pose.iter().all(|p| p.pitch == 0.0));
    }

    #[test]
    fn test_walk_pose_skips_missing_parts() {
        let rig = Rig::new().with_part(BodyPart::RightLeg, PartHandle(1));
        let pose = rig.walk_pose(0.3, true);
        assert_eq!(pose.len(), 1);
        assert_eq!(pose[0].handle, PartHandle(1));
    }
}
