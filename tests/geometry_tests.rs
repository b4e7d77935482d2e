//! Joint-angle and normalization tests


use nalgebra::Vector2;
use surya_namaskar_coach::geometry::{angle, angle_atan2, recenter, torso_center, ImageScale};
use surya_namaskar_coach::landmarks::PoseLandmark;
use test_helpers::{assert_angle, standing, PoseBuilder};

fn v(x: f64, y: f64) -> Vector2<f64> {
    Vector2::new(x, y)
}

#[test]
fn test_collinear_points_are_straight() {
    for (a, b, c) in [
        (v(0.1, 0.1), v(0.2, 0.2), v(0.4, 0.4)),
        (v(0.0, 0.5), v(0.3, 0.5), v(0.9, 0.5)),
        (v(0.7, 0.2), v(0.7, 0.4), v(0.7, 0.8)),
    ] {
        assert_angle(angle(a, b, c), 180.0, 1e-2);
    }
}

#[test]
fn test_same_direction_is_zero() {
    assert_angle(angle(v(0.9, 0.5), v(0.1, 0.5), v(0.5, 0.5)), 0.0, 1e-2);
}

#[test]
fn test_angle_symmetry() {
    let cases = [
        (v(0.1, 0.9), v(0.4, 0.4), v(0.8, 0.6)),
        (v(0.3, 0.3), v(0.5, 0.7), v(0.9, 0.1)),
        (v(0.0, 0.0), v(1.0, 0.0), v(1.0, 1.0)),
    ];
    for (a, b, c) in cases {
        assert_eq!(angle(a, b, c), angle(c, b, a));
    }
}

#[test]
fn test_formulations_agree() {
    let cases = [
        (v(0.1, 0.9), v(0.4, 0.4), v(0.8, 0.6)),
        (v(0.3, 0.3), v(0.5, 0.7), v(0.9, 0.1)),
        (v(0.0, 0.0), v(1.0, 0.0), v(1.0, 1.0)),
        (v(0.2, 0.1), v(0.5, 0.5), v(0.1, 0.6)),
    ];
    for (a, b, c) in cases {
        assert_angle(angle(a, b, c), angle_atan2(a, b, c), 1e-3);
    }
}

#[test]
fn test_translation_invariance() {
    let (a, b, c) = (v(0.1, 0.9), v(0.4, 0.4), v(0.8, 0.6));
    let shift = v(0.25, -0.1);
    assert_angle(angle(a + shift, b + shift, c + shift), angle(a, b, c), 1e-9);
}

#[test]
fn test_non_uniform_scale_changes_angle() {
    let scale = ImageScale::new(640.0, 480.0);
    let (a, b, c) = ((0.5, 0.2), (0.5, 0.5), (0.8, 0.5));
    let unit = angle(v(a.0, a.1), v(b.0, b.1), v(c.0, c.1));
    let scaled = angle(scale.apply(a.0, a.1), scale.apply(b.0, b.1), scale.apply(c.0, c.1));
    // Axis-aligned rays stay perpendicular under any axis scaling
    assert_angle(unit, 90.0, 1e-6);
    assert_angle(scaled, 90.0, 1e-6);

    let d = (0.8, 0.2);
    let unit = angle(v(a.0, a.1), v(b.0, b.1), v(d.0, d.1));
    let scaled = angle(scale.apply(a.0, a.1), scale.apply(b.0, b.1), scale.apply(d.0, d.1));
    assert!((unit - scaled).abs() > 1.0);
}

#[test]
fn test_builder_produces_requested_angles() {
    let lm = PoseBuilder::new().elbows(150.0, 95.0).knees(120.0, 172.0).build();
    let p = |l| {
        let p = lm.get(l);
        v(f64::from(p.x), f64::from(p.y))
    };
    use PoseLandmark::*;
    assert_angle(angle(p(LeftShoulder), p(LeftElbow), p(LeftWrist)), 150.0, 1e-3);
    assert_angle(angle(p(RightShoulder), p(RightElbow), p(RightWrist)), 95.0, 1e-3);
    assert_angle(angle(p(LeftHip), p(LeftKnee), p(LeftAnkle)), 120.0, 1e-3);
    assert_angle(angle(p(RightHip), p(RightKnee), p(RightAnkle)), 172.0, 1e-3);
}

#[test]
fn test_recenter_moves_torso_to_origin() {
    let centered = recenter(&standing());
    let (cx, cy) = torso_center(&centered);
    assert!(cx.abs() < 1e-6);
    assert!(cy.abs() < 1e-6);

    // Depth and visibility are untouched
    let original = standing();
    for (a, b) in original.as_slice().iter().zip(centered.as_slice()) {
        assert_eq!(a.z, b.z);
        assert_eq!(a.visibility, b.visibility);
    }
}

#[test]
fn test_recenter_is_translation_invariant() {
    let shifted = PoseBuilder::new().build().to_features();
    let moved: Vec<f32> = shifted
        .chunks_exact(4)
        .flat_map(|c| [c[0] + 0.1, c[1] - 0.05, c[2], c[3]])
        .collect();
    let a = recenter(&surya_namaskar_coach::landmarks::LandmarkSet::from_features(&shifted).unwrap());
    let b = recenter(&surya_namaskar_coach::landmarks::LandmarkSet::from_features(&moved).unwrap());
    for (p, q) in a.as_slice().iter().zip(b.as_slice()) {
        assert!((p.x - q.x).abs() < 1e-5);
        assert!((p.y - q.y).abs() < 1e-5);
    }
}
