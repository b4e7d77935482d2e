//! Correction engine tests against the built-in rule table


use std::sync::Arc;
use surya_namaskar_coach::correction::{CorrectionEngine, CorrectionOptions};
use surya_namaskar_coach::geometry::ImageScale;
use surya_namaskar_coach::landmarks::PoseLandmark;
use surya_namaskar_coach::rules::{AngleRuleTable, CheckKind, ToleranceRule};
use test_helpers::{assert_angle, standing, PoseBuilder};

fn plain_engine() -> CorrectionEngine {
    CorrectionEngine::new(
        Arc::new(AngleRuleTable::default()),
        CorrectionOptions {
            annotate_angles: false,
            ..CorrectionOptions::default()
        },
    )
}

#[test]
fn test_bent_arms_in_prayer_pose() {
    let engine = CorrectionEngine::default();
    let lm = PoseBuilder::new().left_elbow(150.0).build();

    let messages = engine.evaluate("pranamasana", &lm);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Keep arms straight together"));
    assert!(messages[0].contains("(angle: 150°)"), "unexpected message: {}", messages[0]);
}

#[test]
fn test_straight_arms_in_prayer_pose() {
    let engine = CorrectionEngine::default();
    assert!(engine.evaluate("pranamasana", &standing()).is_empty());
}

#[test]
fn test_pose_name_is_normalized() {
    let engine = plain_engine();
    let lm = PoseBuilder::new().left_elbow(150.0).build();
    assert_eq!(engine.evaluate("  Pranamasana ", &lm), vec!["Keep arms straight together"]);
}

#[test]
fn test_unknown_pose_has_no_feedback() {
    let engine = CorrectionEngine::default();
    let lm = PoseBuilder::new().left_elbow(40.0).build();
    assert!(engine.evaluate("tadasana", &lm).is_empty());
    assert!(engine.evaluate("", &lm).is_empty());
}

#[test]
fn test_feedback_order_follows_table() {
    let engine = plain_engine();
    // Knee far from 90° and back leg far from straight: both checks fail
    let lm = PoseBuilder::new().left_knee(130.0).build();
    let messages = engine.evaluate("ashwa_sanchalanasana", &lm);
    assert_eq!(messages, vec!["Bend front knee to ~90°", "Keep back leg straight"]);
}

#[test]
fn test_occluded_check_does_not_suppress_others() {
    let engine = CorrectionEngine::new(
        Arc::new(AngleRuleTable::default()),
        CorrectionOptions {
            annotate_angles: false,
            min_visibility: 0.5,
            scale: ImageScale::default(),
        },
    );
    // Bhujangasana checks back_angle (hip/shoulder/wrist) then elbow_angle
    // (shoulder/elbow/wrist). Hiding the hip drops only the first.
    let lm = PoseBuilder::new()
        .left_elbow(120.0)
        .visibility(PoseLandmark::LeftHip, 0.1)
        .build();
    let detailed = engine.evaluate_detailed("bhujangasana", &lm);
    assert_eq!(detailed.len(), 1);
    assert_eq!(detailed[0].check, CheckKind::ElbowAngle);
    assert_eq!(detailed[0].message, "Keep arms straight");
}

#[test]
fn test_non_finite_landmark_skips_check() {
    let engine = plain_engine();
    let lm = PoseBuilder::new().at(PoseLandmark::LeftWrist, f32::NAN, 0.5).build();
    assert!(engine.evaluate("pranamasana", &lm).is_empty());
    assert!(engine.measure(CheckKind::ElbowAngle, &lm).is_err());
}

#[test]
fn test_detailed_carries_measurement() {
    let engine = plain_engine();
    let lm = PoseBuilder::new().left_elbow(150.0).build();
    let detailed = engine.evaluate_detailed("pranamasana", &lm);
    assert_eq!(detailed.len(), 1);
    let c = &detailed[0];
    assert_eq!(c.check, CheckKind::ElbowAngle);
    assert_angle(c.angle, 150.0, 1e-3);
    assert_eq!((c.low, c.high), (170.0, 190.0));
    assert_eq!(c.to_string(), "Keep arms straight together");
}

#[test]
fn test_range_bounds_are_inclusive() {
    let mut table = AngleRuleTable::empty();
    table.insert(
        "pranamasana",
        vec![ToleranceRule::new(CheckKind::ElbowAngle, 100.0, 120.0, "Out of range")],
    );
    let engine = CorrectionEngine::new(Arc::new(table), CorrectionOptions::default());
    assert!(engine.evaluate("pranamasana", &PoseBuilder::new().left_elbow(100.01).build()).is_empty());
    assert!(engine.evaluate("pranamasana", &PoseBuilder::new().left_elbow(119.99).build()).is_empty());
    assert_eq!(engine.evaluate("pranamasana", &PoseBuilder::new().left_elbow(125.0).build()).len(), 1);
}

#[test]
fn test_reflex_back_range_always_reports() {
    // hasta_utthanasana's back_angle is written as 190-230° and measured angles
    // never exceed 180°, so the cue is emitted for every measurable pose
    use PoseLandmark::*;
    let engine = plain_engine();
    let rules = engine.table().rules_for("hasta_utthanasana");
    let back = rules.iter().find(|r| r.check == CheckKind::BackAngle).unwrap();
    assert_eq!((back.low, back.high), (190.0, 230.0));

    for degrees in [30.0, 150.0, 179.0] {
        let lm = PoseBuilder::new().joint(LeftHip, LeftShoulder, LeftWrist, degrees).build();
        assert_angle(engine.measure(CheckKind::BackAngle, &lm).unwrap(), degrees, 1e-3);
        let messages = engine.evaluate("hasta_utthanasana", &lm);
        assert!(
            messages.iter().any(|m| m == "Arch back slightly"),
            "missing back cue at {degrees}°: {messages:?}"
        );
    }
}

#[test]
fn test_folded_reflex_range_is_reachable() {
    use PoseLandmark::*;
    let engine = CorrectionEngine::new(
        Arc::new(AngleRuleTable::default().with_folded_reflex_ranges()),
        CorrectionOptions {
            annotate_angles: false,
            ..CorrectionOptions::default()
        },
    );
    let lm = PoseBuilder::new().joint(LeftHip, LeftShoulder, LeftWrist, 150.0).build();
    assert!(!engine
        .evaluate("hasta_utthanasana", &lm)
        .iter()
        .any(|m| m == "Arch back slightly"));
}
