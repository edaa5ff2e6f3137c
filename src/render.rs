use crate::pose::{constants::KEYPOINT_EDGES, BodySide, BoundingBox, KeypointKind, Pose};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct OverlayKeypoint {
    pub(crate) kind: KeypointKind,
    pub(crate) side: BodySide,
    pub(crate) x: f32,
    pub(crate) y: f32,
}

#[derive(Debug, Serialize)]
pub(crate) struct OverlayEdge {
    pub(crate) from: KeypointKind,
    pub(crate) to: KeypointKind,
}

/// Everything an external drawing layer needs for one frame: the visible
/// keypoints (grouped by body side for coloring), the skeleton edges whose
/// endpoints are both visible, and the body's bounding box.
#[derive(Debug, Serialize)]
pub(crate) struct Overlay {
    pub(crate) keypoints: Vec<OverlayKeypoint>,
    pub(crate) edges: Vec<OverlayEdge>,
    pub(crate) bounding_box: BoundingBox,
}

pub(crate) fn build_overlay(pose: &Pose, visibility_threshold: f32) -> Overlay {
    let keypoints = pose
        .keypoints
        .iter()
        .filter(|keypoint| keypoint.score >= visibility_threshold)
        .map(|keypoint| OverlayKeypoint {
            kind: keypoint.kind,
            side: keypoint.kind.side(),
            x: keypoint.point.x(),
            y: keypoint.point.y(),
        })
        .collect();

    let edges = KEYPOINT_EDGES
        .iter()
        .filter(|&&(from, to)| {
            pose.keypoint(from).score >= visibility_threshold
                && pose.keypoint(to).score >= visibility_threshold
        })
        .map(|&(from, to)| OverlayEdge { from, to })
        .collect();

    Overlay {
        keypoints,
        edges,
        bounding_box: pose.bounding_box(),
    }
}
