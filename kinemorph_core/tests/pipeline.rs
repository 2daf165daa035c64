// kinemorph_core/tests/pipeline.rs

//! Runs a synthetic model and clip through the whole pipeline: container
//! bytes, skeleton resolution, conditioning and rotation solving.

use approx::assert_abs_diff_eq;
use kinemorph_core::frames::layout::*;
use kinemorph_core::prelude::*;
use kinemorph_core::skeleton::parse_glb;
use serde_json::{json, Value};

const JSON_CHUNK: u32 = 0x4E4F_534A;

// --- Fixture: a rest pose and a rig bound to it ---

/// World positions with both arms held out sideways at shoulder height.
struct RestPose {
    body: Vec<Vec3>,
    hand: [Vec<Vec3>; 2],
}

impl RestPose {
    fn new() -> Self {
        let mut body = vec![Vec3::zeros(); POSE_LANDMARK_COUNT];
        for (sign, ids) in [
            (1.0, [POSE_LEFT_HIP, POSE_LEFT_SHOULDER, POSE_LEFT_EAR, POSE_LEFT_EYE, POSE_LEFT_ELBOW, POSE_LEFT_WRIST]),
            (-1.0, [POSE_RIGHT_HIP, POSE_RIGHT_SHOULDER, POSE_RIGHT_EAR, POSE_RIGHT_EYE, POSE_RIGHT_ELBOW, POSE_RIGHT_WRIST]),
        ] {
            body[ids[0]] = Vec3::new(0.1 * sign, 1.0, 0.0);
            body[ids[1]] = Vec3::new(0.2 * sign, 1.5, 0.0);
            body[ids[2]] = Vec3::new(0.08 * sign, 1.7, 0.0);
            body[ids[3]] = Vec3::new(0.04 * sign, 1.72, 0.08);
            body[ids[4]] = Vec3::new(0.45 * sign, 1.5, 0.0);
            body[ids[5]] = Vec3::new(0.7 * sign, 1.5, 0.0);
        }

        let hand = |sign: f64| {
            let mut points = vec![Vec3::new(0.7 * sign, 1.5, 0.0)];
            for (x, z) in [(0.72, 0.04), (0.78, 0.03), (0.79, 0.0), (0.78, -0.02), (0.77, -0.04)] {
                for seg in 0..4 {
                    points.push(Vec3::new((x + 0.025 * seg as f64) * sign, 1.5, z));
                }
            }
            points
        };

        Self {
            body,
            hand: [hand(1.0), hand(-1.0)],
        }
    }

    fn hips(&self) -> Vec3 {
        let center_hips = (self.body[POSE_LEFT_HIP] + self.body[POSE_RIGHT_HIP]) / 2.0;
        let center_shoulders = (self.body[POSE_LEFT_SHOULDER] + self.body[POSE_RIGHT_SHOULDER]) / 2.0;
        center_hips + (center_shoulders - center_hips) / 9.0
    }

    fn spine(&self) -> Vec3 {
        let center_hips = (self.body[POSE_LEFT_HIP] + self.body[POSE_RIGHT_HIP]) / 2.0;
        center_hips + (self.hips() - center_hips) * 3.0
    }

    fn neck(&self) -> Vec3 {
        let center_shoulders = (self.body[POSE_LEFT_SHOULDER] + self.body[POSE_RIGHT_SHOULDER]) / 2.0;
        center_shoulders + (self.spine() - self.hips()) / 2.0
    }

    fn head(&self) -> Vec3 {
        let center_ears = (self.body[POSE_LEFT_EAR] + self.body[POSE_RIGHT_EAR]) / 2.0;
        (self.neck() + center_ears) / 2.0
    }

    fn shoulder_inside(&self, side: usize) -> Vec3 {
        let left = self.body[POSE_LEFT_SHOULDER];
        let across = self.body[POSE_RIGHT_SHOULDER] - left;
        left + across * (side as f64 + 1.0) / 3.0
    }
}

fn node(name: &str, offset: Vec3) -> Value {
    json!({"name": name, "translation": [offset.x, offset.y, offset.z], "children": []})
}

/// glTF nodes whose bind offsets reproduce `pose`.
fn rig(pose: &RestPose) -> Value {
    let mut nodes = vec![json!({"name": "Armature", "children": []})];
    let add = |nodes: &mut Vec<Value>, parent: usize, name: String, offset: Vec3| {
        let index = nodes.len();
        nodes.push(node(&name, offset));
        if let Some(children) = nodes[parent]["children"].as_array_mut() {
            children.push(json!(index));
        }
        index
    };

    let hips = add(&mut nodes, 0, "Hips".into(), pose.hips());
    let spine = add(&mut nodes, hips, "Spine".into(), pose.spine() - pose.hips());
    let neck = add(&mut nodes, spine, "Neck".into(), pose.neck() - pose.spine());
    let head = add(&mut nodes, neck, "Head".into(), pose.head() - pose.neck());

    for (i, side) in ["Left", "Right"].into_iter().enumerate() {
        let (hip, shoulder, eye, elbow, wrist) = if i == 0 {
            (POSE_LEFT_HIP, POSE_LEFT_SHOULDER, POSE_LEFT_EYE, POSE_LEFT_ELBOW, POSE_LEFT_WRIST)
        } else {
            (POSE_RIGHT_HIP, POSE_RIGHT_SHOULDER, POSE_RIGHT_EYE, POSE_RIGHT_ELBOW, POSE_RIGHT_WRIST)
        };
        let b = &pose.body;
        add(&mut nodes, head, format!("{side}Eye"), b[eye] - pose.head());
        add(&mut nodes, hips, format!("{side}UpLeg"), b[hip] - pose.hips());

        let inside = pose.shoulder_inside(i);
        let clavicle = add(&mut nodes, spine, format!("{side}Shoulder"), inside - pose.spine());
        let up_arm = add(&mut nodes, clavicle, format!("{side}UpArm"), b[shoulder] - inside);
        let fore_arm = add(&mut nodes, up_arm, format!("{side}ForeArm"), b[elbow] - b[shoulder]);
        let hand = add(&mut nodes, fore_arm, format!("{side}Hand"), b[wrist] - b[elbow]);

        let h = &pose.hand[i];
        for (f, finger) in ["Thumb", "Index", "Middle", "Ring", "Pinky"].into_iter().enumerate() {
            let mut parent = hand;
            let mut previous = h[HAND_WRIST];
            for seg in 1..=4 {
                let at = h[1 + 4 * f + seg - 1];
                parent = add(&mut nodes, parent, format!("{side}{finger}{seg}"), at - previous);
                previous = at;
            }
        }
    }
    json!({"asset": {"version": "2.0"}, "nodes": nodes})
}

fn glb(document: &Value) -> Vec<u8> {
    let mut payload = document.to_string().into_bytes();
    while payload.len() % 4 != 0 {
        payload.push(b' ');
    }
    let mut out = Vec::new();
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&((12 + 8 + payload.len()) as u32).to_le_bytes());
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(&JSON_CHUNK.to_le_bytes());
    out.extend_from_slice(&payload);
    out
}

/// Re-projection that only flips depth, so landmarks are world positions.
fn flat_camera() -> CameraConfig {
    #[rustfmt::skip]
    let projection_inverse = Mat4::new(
        0.5,  0.0, 0.0, 0.5,
        0.0, -0.5, 0.0, 0.5,
        0.0,  0.0, 0.0, 0.0,
        0.0,  0.0, 0.0, 1.0,
    );
    CameraConfig {
        projection_inverse,
        camera_world: Mat4::identity(),
        near: 1.0,
        position: Vec3::new(0.0, 0.0, 1.0),
        subject_distance: 1.0,
        subject_offset: Vec3::zeros(),
    }
}

fn raw(points: &[Vec3]) -> LandmarkFrame {
    LandmarkFrame::new(points.iter().map(|p| Vec3::new(p.x, p.y, -p.z)).collect())
}

fn pipeline(pose: &RestPose) -> Pipeline {
    let nodes = parse_glb(&glb(&rig(pose))).unwrap();
    Pipeline::from_nodes(&nodes, PipelineConfig::default(), flat_camera()).unwrap()
}

/// Six frames of the rest pose; the hands are only detected in frames 1..5.
fn clip(pose: &RestPose) -> LandmarkClip {
    let hands = |i: usize| {
        (1..5)
            .contains(&i)
            .then(|| (raw(&pose.hand[0]), raw(&pose.hand[1])))
            .unwrap_or_else(|| {
                (
                    LandmarkFrame::missing(HAND_LANDMARK_COUNT),
                    LandmarkFrame::missing(HAND_LANDMARK_COUNT),
                )
            })
    };
    let (left_hand, right_hand) = (0..6).map(hands).unzip();
    LandmarkClip {
        fps: 30.0,
        body: vec![raw(&pose.body); 6],
        left_hand,
        right_hand,
    }
}

// --- Tests ---

#[test]
fn rig_resolves_every_output_role() {
    let pose = RestPose::new();
    let pipeline = pipeline(&pose);
    let skeleton = pipeline.skeleton();

    for role in OUTPUT_ROLES {
        assert!(skeleton.contains(role), "{role} not resolved");
    }
    assert_eq!(skeleton.node_name(BoneRole::LowArm(Side::Right)), Some("RightForeArm"));
    assert_eq!(
        skeleton.node_name(BoneRole::Phalanx(Side::Left, Finger::Pinky, 4)),
        Some("LeftPinky4")
    );
}

#[test]
fn rest_clip_is_cropped_to_the_hands_and_solved_to_identity() {
    let pose = RestPose::new();
    let results = pipeline(&pose).process_clip(&clip(&pose)).unwrap();

    assert_eq!(results.len(), 4);
    for result in &results {
        assert_eq!(result.named().len(), OUTPUT_ROLES.len());
        for q in result.to_array() {
            assert_abs_diff_eq!(q[0].abs(), 1.0, epsilon = 1e-6);
        }
    }
}

#[test]
fn idle_clip_produces_no_frames() {
    let mut pose = RestPose::new();
    pose.body[POSE_LEFT_WRIST] = Vec3::new(0.3, 0.5, 0.0);
    pose.body[POSE_RIGHT_WRIST] = Vec3::new(-0.3, 0.5, 0.0);
    let rest = RestPose::new();
    let results = pipeline(&rest).process_clip(&clip(&pose)).unwrap();
    assert!(results.is_empty());
}

#[test]
fn live_frame_without_hands_keeps_arm_rotations() {
    let pose = RestPose::new();
    let pipeline = pipeline(&pose);
    let empty = LandmarkFrame::missing(HAND_LANDMARK_COUNT);
    let result = pipeline.solve_frame(&raw(&pose.body), &empty, &empty);

    assert!(result.is_solved(BoneRole::LowArm(Side::Left)));
    assert!(!result.is_solved(BoneRole::Hand(Side::Left)));
    assert_eq!(result.to_array()[6], [0.0, 0.0, 0.0, 0.5]);
}

#[test]
fn mismatched_streams_are_rejected() {
    let pose = RestPose::new();
    let mut bad = clip(&pose);
    bad.right_hand.pop();
    assert!(matches!(
        pipeline(&pose).process_clip(&bad),
        Err(PipelineError::Clip(ClipError::StreamLengthMismatch { .. }))
    ));
}

#[test]
fn loads_the_model_from_disk() {
    let pose = RestPose::new();
    let path = std::env::temp_dir().join(format!("kinemorph-rig-{}.glb", std::process::id()));
    std::fs::write(&path, glb(&rig(&pose))).unwrap();

    let loaded = Pipeline::from_model_path(&path, PipelineConfig::default());
    std::fs::remove_file(&path).ok();

    let loaded = loaded.unwrap();
    assert_eq!(loaded.skeleton(), pipeline(&pose).skeleton());
}
