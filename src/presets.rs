//! Ready-made skeletons.

use std::sync::Arc;

use glam::Vec3;

use crate::error::Result;
use crate::hierarchy::Hierarchy;
use crate::math::Transform;
use crate::pose::{PoseFlags, PoseGroup};

struct JointDef {
    name: &'static str,
    parent: Option<&'static str>,
    rotation: [f32; 3],
    translation: [f32; 3],
    flags: PoseFlags,
}

const fn joint(
    name: &'static str,
    parent: Option<&'static str>,
    rotation: [f32; 3],
    translation: [f32; 3],
    flags: PoseFlags,
) -> JointDef {
    JointDef {
        name,
        parent,
        rotation,
        translation,
        flags,
    }
}

const R: PoseFlags = PoseFlags::ROTATE;
const T: PoseFlags = PoseFlags::TRANSLATE;
const RT: PoseFlags = PoseFlags::ROTATE.union(PoseFlags::TRANSLATE);
const LOCKED: PoseFlags = PoseFlags::empty();

// rotations are XYZ Euler degrees
#[rustfmt::skip]
const HUMANOID: &[JointDef] = &[
    joint("root",          None,                    [0.0, 0.0, 0.0],    [0.0, 0.0, 3.6],    RT),
    joint("spine_lower",   Some("root"),            [0.0, -90.0, -5.0], [0.0, -0.1, 0.1],   R),
    joint("spine_mid",     Some("spine_lower"),     [0.0, 0.0, 10.0],   [2.0, 0.0, 0.0],    R),
    joint("spine_upper",   Some("spine_mid"),       [0.0, 0.0, -5.0],   [2.0, 0.0, 0.0],    R),
    joint("neck",          Some("spine_upper"),     [0.0, 0.0, 0.0],    [0.5, 0.0, 0.0],    R),
    joint("head",          Some("neck"),            [0.0, 0.0, 0.0],    [0.5, 0.0, 0.0],    LOCKED),
    joint("clavicle",      Some("spine_upper"),     [0.0, 90.0, 0.0],   [-0.1, 0.1, 0.0],   LOCKED),
    joint("shoulderblade_r", Some("clavicle"),      [0.0, 0.0, 0.0],    [0.5, -0.1, -0.5],  T),
    joint("shoulder_r",    Some("shoulderblade_r"), [0.0, 30.0, -10.0], [0.5, 0.0, 0.5],    R),
    joint("elbow_r",       Some("shoulder_r"),      [0.0, 0.0, 20.0],   [2.0, 0.0, 0.0],    R),
    joint("forearm_r",     Some("elbow_r"),         [0.0, 0.0, 0.0],    [1.0, 0.0, 0.0],    LOCKED),
    joint("wrist_r",       Some("forearm_r"),       [0.0, 0.0, -10.0],  [1.0, 0.0, 0.0],    R),
    joint("hand_r",        Some("wrist_r"),         [0.0, 0.0, 0.0],    [0.5, 0.0, 0.0],    LOCKED),
    joint("shoulderblade_l", Some("clavicle"),      [0.0, 0.0, 0.0],    [-0.5, -0.1, -0.5], T),
    joint("shoulder_l",    Some("shoulderblade_l"), [0.0, -30.0, 10.0], [-0.5, 0.0, 0.5],   R),
    joint("elbow_l",       Some("shoulder_l"),      [0.0, 0.0, -20.0],  [-2.0, 0.0, 0.0],   R),
    joint("forearm_l",     Some("elbow_l"),         [0.0, 0.0, 0.0],    [-1.0, 0.0, 0.0],   LOCKED),
    joint("wrist_l",       Some("forearm_l"),       [0.0, 0.0, 10.0],   [-1.0, 0.0, 0.0],   R),
    joint("hand_l",        Some("wrist_l"),         [0.0, 0.0, 0.0],    [-0.5, 0.0, 0.0],   LOCKED),
    joint("pelvis",        Some("root"),            [0.0, 0.0, 0.0],    [0.0, 0.0, 0.0],    LOCKED),
    joint("hip_r",         Some("pelvis"),          [0.0, 90.0, 10.0],  [1.0, -0.1, 0.5],   R),
    joint("knee_r",        Some("hip_r"),           [0.0, 0.0, -20.0],  [2.0, 0.0, 0.0],    R),
    joint("shin_r",        Some("knee_r"),          [0.0, 0.0, 0.0],    [1.0, 0.0, 0.0],    LOCKED),
    joint("ankle_r",       Some("shin_r"),          [0.0, 0.0, 90.0],   [1.0, 0.0, 0.0],    R),
    joint("foot_r",        Some("ankle_r"),         [0.0, 0.0, 10.0],   [0.5, 0.0, 0.0],    R),
    joint("toe_r",         Some("foot_r"),          [0.0, 0.0, 0.0],    [0.5, 0.0, 0.0],    LOCKED),
    joint("hip_l",         Some("pelvis"),          [0.0, -90.0, -10.0], [-1.0, -0.1, 0.5], R),
    joint("knee_l",        Some("hip_l"),           [0.0, 0.0, 20.0],   [-2.0, 0.0, 0.0],   R),
    joint("shin_l",        Some("knee_l"),          [0.0, 0.0, 0.0],    [-1.0, 0.0, 0.0],   LOCKED),
    joint("ankle_l",       Some("shin_l"),          [0.0, 0.0, -90.0],  [-1.0, 0.0, 0.0],   R),
    joint("foot_l",        Some("ankle_l"),         [0.0, 0.0, -10.0],  [-0.5, 0.0, 0.0],   R),
    joint("toe_l",         Some("foot_l"),          [0.0, 0.0, 0.0],    [-0.5, 0.0, 0.0],   LOCKED),
];

/// A 32-joint humanoid skeleton with one base pose.
///
/// The spine runs from `root` to `head`, both arms hang off `clavicle` and
/// both legs off `pelvis`. Joints that carry no pose flags are locked for
/// inverse kinematics.
pub fn humanoid() -> Result<(Arc<Hierarchy>, PoseGroup)> {
    let mut builder = Hierarchy::builder();
    for def in HUMANOID {
        // parents precede children in the table
        let parent = def
            .parent
            .and_then(|name| HUMANOID.iter().position(|d| d.name == name));
        builder.add_node(def.name, parent);
    }
    let hierarchy = Arc::new(builder.build()?);

    let mut group = PoseGroup::new(Arc::clone(&hierarchy), 1);
    for (node, def) in HUMANOID.iter().enumerate() {
        let [x, y, z] = def.rotation;
        *group.node_pose_mut(0, node)? =
            Transform::from_translation(Vec3::from(def.translation)).with_euler_degrees(x, y, z);
        group.set_flags(node, def.flags)?;
    }
    Ok((hierarchy, group))
}
