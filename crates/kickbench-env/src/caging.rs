//! Grasp-quality score from the two gripper pads closing on the ball
//!
//! Each pad is scored on its own along the second axis, once against a coarse
//! caging window and once against a tight gripping window, with margins
//! measured from where that pad started the episode. The two sides are
//! fused with the Hamacher product, then fused again with the horizontal
//! alignment between tool center point and object.

use kickbench_core::shaping::{assert_unit_interval, hamacher_product, tolerance, Sigmoid};
use kickbench_core::Result;

use crate::context::EpisodeContext;
use crate::host::{EffectorSnapshot, SpatialPoint};

/// Outer edge of the caging window for each pad
pub const PAD_SUCCESS_MARGIN: f64 = 0.05;
/// Width of the gripping window beyond the object radius
pub const GRIP_SUCCESS_EXTRA: f64 = 0.01;
/// Radius of perfect x/z alignment between tool center point and object
pub const XZ_SUCCESS_MARGIN: f64 = 0.005;
/// Caging score above which the gripping term starts to count
pub const GRIP_CAGING_THRESHOLD: f64 = 0.95;

/// Caging and gripping scores for one gripper pad
#[derive(Debug, Clone, Copy, PartialEq)]
struct PadScore {
    caging: f64,
    gripping: f64,
}

fn pad_score(delta: f64, init_pad_y: f64, object_y: f64, obj_radius: f64) -> Result<PadScore> {
    let margin = ((object_y - init_pad_y).abs() - PAD_SUCCESS_MARGIN).abs();
    let caging = tolerance(
        delta,
        (obj_radius, PAD_SUCCESS_MARGIN),
        margin,
        Sigmoid::LongTail,
    )?;
    let gripping = tolerance(
        delta,
        (obj_radius, obj_radius + GRIP_SUCCESS_EXTRA),
        margin,
        Sigmoid::LongTail,
    )?;
    assert_unit_interval("pad caging", caging);
    assert_unit_interval("pad gripping", gripping);
    Ok(PadScore { caging, gripping })
}

fn without_y(point: SpatialPoint) -> SpatialPoint {
    SpatialPoint::new(point.x, 0.0, point.z)
}

/// Grasp quality in `[0, 1]`.
///
/// The gripper command (last action component) is clamped to `[0, 1]` but
/// does not enter the score.
///
/// # Panics
///
/// Panics if any intermediate score leaves `[0, 1]`.
pub fn caging_reward(
    ctx: &EpisodeContext,
    effector: &EffectorSnapshot,
    action: &[f64],
    object: SpatialPoint,
    obj_radius: f64,
) -> Result<f64> {
    let left_delta = effector.left_pad.y - object.y;
    let right_delta = object.y - effector.right_pad.y;

    let right = pad_score(right_delta, ctx.init_right_pad.y, object.y, obj_radius)?;
    let left = pad_score(left_delta, ctx.init_left_pad.y, object.y, obj_radius)?;

    let y_caging = hamacher_product(right.caging, left.caging);
    let y_gripping = hamacher_product(right.gripping, left.gripping);

    let tcp_obj_xz = (without_y(effector.tcp) - without_y(object)).norm();
    let init_xz = (without_y(ctx.object_init_position()) - without_y(ctx.init_tcp)).norm();
    // A hand that starts right above the ball would give a negative margin
    let xz_margin = (init_xz - XZ_SUCCESS_MARGIN).max(0.0);
    let xz_caging = tolerance(
        tcp_obj_xz,
        (0.0, XZ_SUCCESS_MARGIN),
        xz_margin,
        Sigmoid::LongTail,
    )?;
    assert_unit_interval("x/z caging", xz_caging);

    let gripper_closed = action.last().copied().unwrap_or(0.0).clamp(0.0, 1.0);
    assert_unit_interval("gripper command", gripper_closed);

    let caging = hamacher_product(y_caging, xz_caging);
    let gripping = if caging > GRIP_CAGING_THRESHOLD {
        y_gripping
    } else {
        0.0
    };
    assert_unit_interval("gripping", gripping);

    let caging_and_gripping = (caging + gripping) / 2.0;
    assert_unit_interval("caging and gripping", caging_and_gripping);
    Ok(caging_and_gripping)
}
