use glam::Vec3;
use skeletal_kinematics::ik::{BallSocketConstraint, CcdSolver, FabrikSolver, IkChain, SolverConfig};
use skeletal_kinematics::{kinematics, presets, Hierarchy, HierarchyState, Result};
use std::sync::Arc;

fn log_positions(hierarchy: &Hierarchy, state: &HierarchyState, names: &[&str]) -> Result<()> {
    for name in names {
        let index = hierarchy.require(name)?;
        if let Some(p) = state.object_position(index) {
            log::info!("{:>16} ({:7.3}, {:7.3}, {:7.3})", name, p.x, p.y, p.z);
        }
    }
    Ok(())
}

fn run() -> Result<()> {
    let (hierarchy, group) = presets::humanoid()?;
    let mut state = HierarchyState::with_group(Arc::new(group));

    state.apply_pose(0)?;
    kinematics::solve_forward(&mut state)?;
    log::info!("base pose, {} joints, status {:?}", hierarchy.num_nodes(), state.status());
    log_positions(&hierarchy, &state, &["root", "head", "hand_r", "hand_l", "toe_r", "toe_l"])?;

    // rebuilding locals from the solved pose must reproduce them
    let before = state.local_space().to_vec();
    state.target_from_object_space();
    kinematics::solve_inverse(&mut state)?;
    let drift = before
        .iter()
        .zip(state.local_space())
        .flat_map(|(a, b)| a.to_cols_array().into_iter().zip(b.to_cols_array()))
        .map(|(x, y)| (x - y).abs())
        .fold(0.0f32, f32::max);
    log::info!("inverse round trip drift {:e}", drift);
    kinematics::solve_forward(&mut state)?;

    let hand_r = hierarchy.require("hand_r")?;
    let mut arm = IkChain::from_end_node(&hierarchy, hand_r, 5)?;
    arm.joints_mut()[1].set_constraint(BallSocketConstraint::new(120.0));
    let reach = state.object_position(hand_r).unwrap_or_default() + Vec3::new(0.5, 1.0, -1.0);
    let config = SolverConfig::new(0.01).with_max_iterations(32);
    let result = FabrikSolver::solve(&mut state, &arm, reach, &config)?;
    log::info!("fabrik right arm -> {:?}: {:?}", reach, result);
    log_positions(&hierarchy, &state, &["shoulder_r", "elbow_r", "wrist_r", "hand_r"])?;

    let foot_l = hierarchy.require("foot_l")?;
    let leg = IkChain::from_end_node(&hierarchy, foot_l, 4)?;
    let step = state.object_position(foot_l).unwrap_or_default() + Vec3::new(0.0, 0.5, 0.5);
    let config = config.with_limit_angle(20f32.to_radians());
    let result = CcdSolver::solve(&mut state, &leg, step, &config)?;
    log::info!("ccd left leg -> {:?}: {:?}", step, result);
    log_positions(&hierarchy, &state, &["hip_l", "knee_l", "ankle_l", "foot_l"])?;

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("demo failed: {}", e);
        std::process::exit(1);
    }
}
