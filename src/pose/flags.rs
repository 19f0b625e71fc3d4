use bitflags::bitflags;
use glam::Vec3;

bitflags! {
    /// Channels of a node's local transform that inverse kinematics may write.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PoseFlags: u32 {
        const ROTATE_X = 0x0001;
        const ROTATE_Y = 0x0002;
        const ROTATE_Z = 0x0004;
        const ROTATE = Self::ROTATE_X.bits() | Self::ROTATE_Y.bits() | Self::ROTATE_Z.bits();
        const TRANSLATE_X = 0x0010;
        const TRANSLATE_Y = 0x0020;
        const TRANSLATE_Z = 0x0040;
        const TRANSLATE = Self::TRANSLATE_X.bits() | Self::TRANSLATE_Y.bits() | Self::TRANSLATE_Z.bits();
        const SCALE_X = 0x0100;
        const SCALE_Y = 0x0200;
        const SCALE_Z = 0x0400;
        const SCALE = Self::SCALE_X.bits() | Self::SCALE_Y.bits() | Self::SCALE_Z.bits();
    }
}

impl Default for PoseFlags {
    fn default() -> Self {
        Self::all()
    }
}

impl PoseFlags {
    #[inline]
    pub fn rotation_mask(self) -> [bool; 3] {
        [
            self.contains(Self::ROTATE_X),
            self.contains(Self::ROTATE_Y),
            self.contains(Self::ROTATE_Z),
        ]
    }

    #[inline]
    pub fn translation_mask(self) -> [bool; 3] {
        [
            self.contains(Self::TRANSLATE_X),
            self.contains(Self::TRANSLATE_Y),
            self.contains(Self::TRANSLATE_Z),
        ]
    }

    #[inline]
    pub fn scale_mask(self) -> [bool; 3] {
        [
            self.contains(Self::SCALE_X),
            self.contains(Self::SCALE_Y),
            self.contains(Self::SCALE_Z),
        ]
    }
}

/// Takes `next` on the enabled axes and `prev` on the others.
pub(crate) fn select_axes(mask: [bool; 3], next: Vec3, prev: Vec3) -> Vec3 {
    Vec3::new(
        if mask[0] { next.x } else { prev.x },
        if mask[1] { next.y } else { prev.y },
        if mask[2] { next.z } else { prev.z },
    )
}
