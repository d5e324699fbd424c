use {
    crate::config::Config,
    color_eyre::Report,
    rig_animate::{JointTree, Pose, Skeleton, VertexInfluence},
    rig_math::{Mat4, Quat, Transform, Vec3, Vec4},
    tracing_subscriber::{
        layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter,
    },
};

mod config;

fn main() -> Result<(), Report> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_error::ErrorLayer::default())
        .init();

    color_eyre::install()?;

    let config = Config::load_default()?;
    tracing::info!("{:?}", config);

    let skeleton = build_chain(&config)?;
    tracing::debug!(
        "Skeleton:\n{}",
        ron::ser::to_string_pretty(&skeleton, Default::default())?
    );

    let tree = JointTree::new(skeleton.rest_pose())?;
    let depths = tree.depths();
    for &id in tree.order() {
        tracing::info!(
            "{:indent$}{}",
            "",
            skeleton.joint_name(id).unwrap_or("<unnamed>"),
            indent = depths[id] * 2,
        );
    }

    let last = skeleton.len() - 1;
    let bend = skeleton.bind_pose().local_transform(last).rotation;
    tracing::info!("Bind bend (roll, pitch, yaw): {:?}", bend.to_euler());

    // Vertex halfway along the last segment, shared by the last two joints.
    let vertex = skeleton
        .bind_pose()
        .global_transform(last)
        .transform_point(Vec3::new(-config.segment_length * 0.5, 0.0, 0.0));
    let influence = VertexInfluence::new(
        [last.saturating_sub(1) as u32, last as u32, 0, 0],
        Vec4::new(1.0, 1.0, 0.0, 0.0),
    )
    .normalized();

    let mut palette = Vec::new();
    for step in 0..=config.blend_steps {
        let t = step as f32 / config.blend_steps as f32;
        let pose = Pose::blend(skeleton.rest_pose(), skeleton.bind_pose(), t);

        let tip = pose.global_transform(last);
        tracing::info!(
            "t = {:.2}: tip at {:?}, facing {:?}",
            t,
            tip.position.to_array(),
            tip.transform_vector(Vec3::X).normalized().to_array(),
        );

        skeleton.skin_palette(&pose, &mut palette);
        let skinned = skin_vertex(&palette, &influence, vertex);
        tracing::info!("  skinned vertex at {:?}", skinned.to_array());

        let bytes: &[u8] = bytemuck::cast_slice(&palette);
        tracing::debug!("  palette is {} bytes", bytes.len());
    }

    Ok(())
}

/// Straight chain along +X at rest, bent around +Z in bind pose.
fn build_chain(config: &Config) -> Result<Skeleton, Report> {
    let offset = Vec3::new(config.segment_length, 0.0, 0.0);
    let bend =
        Quat::from_axis_angle(Vec3::Z, config.bend_degrees.to_radians());

    let mut rest = Pose::with_len(config.joints);
    let mut bind = Pose::with_len(config.joints);

    for id in 1..config.joints {
        rest.set_parent(id, Some(id - 1));
        bind.set_parent(id, Some(id - 1));
        rest.set_local_transform(id, Transform::from_position(offset));
        bind.set_local_transform(
            id,
            Transform::new(offset, bend, Vec3::ONE),
        );
    }

    let names = (0..config.joints).map(|id| format!("joint{}", id)).collect();
    let skeleton = Skeleton::new(rest, bind, names)?;
    Ok(skeleton)
}

fn skin_vertex(
    palette: &[Mat4],
    influence: &VertexInfluence,
    vertex: Vec3,
) -> Vec3 {
    let weights = influence.weights.to_array();
    influence
        .joints
        .iter()
        .zip(&weights)
        .filter(|&(_, &weight)| weight > 0.0)
        .fold(Vec3::ZERO, |acc, (&joint, &weight)| {
            acc + palette[joint as usize].transform_point(vertex) * weight
        })
}
