use crate::{error::Error, geometry::Point};
use num_traits::FromPrimitive;
use serde::Serialize;

/// The 17 body joints at their fixed anatomical indices 0-16, in the order
/// the estimator reports them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, num_derive::FromPrimitive, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum KeypointKind {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl KeypointKind {
    #[inline]
    pub(crate) fn idx(self) -> usize {
        self as usize
    }

    pub(crate) fn from_idx(index: usize) -> Result<Self, Error> {
        Self::from_usize(index).ok_or(Error::ConvertUSizeToKeypointKind(index))
    }

    /// Body side the renderer groups keypoints by: the nose is the only
    /// midline joint, the rest alternate left/right.
    pub(crate) fn side(self) -> BodySide {
        match self {
            Self::Nose => BodySide::Middle,
            Self::LeftEye
            | Self::LeftEar
            | Self::LeftShoulder
            | Self::LeftElbow
            | Self::LeftWrist
            | Self::LeftHip
            | Self::LeftKnee
            | Self::LeftAnkle => BodySide::Left,
            Self::RightEye
            | Self::RightEar
            | Self::RightShoulder
            | Self::RightElbow
            | Self::RightWrist
            | Self::RightHip
            | Self::RightKnee
            | Self::RightAnkle => BodySide::Right,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum BodySide {
    Middle,
    Left,
    Right,
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct Keypoint {
    pub(crate) kind: KeypointKind,
    pub(crate) point: Point,
    pub(crate) score: f32,
}

pub(crate) const NUM_KEYPOINTS: usize = 17;
pub(crate) type Keypoints = [Keypoint; NUM_KEYPOINTS];

/// One detected body: a full set of scored keypoints plus the detector's
/// overall confidence.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Pose {
    pub(crate) keypoints: Keypoints,
    pub(crate) score: f32,
}

impl Pose {
    #[inline]
    pub(crate) fn keypoint(&self, kind: KeypointKind) -> Keypoint {
        self.keypoints[kind.idx()]
    }

    /// Axis-aligned extent of all keypoints, low-confidence ones included.
    pub(crate) fn bounding_box(&self) -> BoundingBox {
        self.keypoints.iter().fold(
            BoundingBox {
                x_min: f32::INFINITY,
                y_min: f32::INFINITY,
                x_max: f32::NEG_INFINITY,
                y_max: f32::NEG_INFINITY,
            },
            |b, keypoint| BoundingBox {
                x_min: b.x_min.min(keypoint.point.x()),
                y_min: b.y_min.min(keypoint.point.y()),
                x_max: b.x_max.max(keypoint.point.x()),
                y_max: b.y_max.max(keypoint.point.y()),
            },
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub(crate) struct BoundingBox {
    pub(crate) x_min: f32,
    pub(crate) y_min: f32,
    pub(crate) x_max: f32,
    pub(crate) y_max: f32,
}

impl BoundingBox {
    pub(crate) fn width(self) -> f32 {
        self.x_max - self.x_min
    }

    pub(crate) fn height(self) -> f32 {
        self.y_max - self.y_min
    }
}

pub(crate) mod constants {
    use super::KeypointKind::{self, *};

    /// Skeleton segments the overlay draws between visible keypoints.
    pub(crate) const KEYPOINT_EDGES: [(KeypointKind, KeypointKind); 19] = [
        (Nose, LeftEye),
        (Nose, RightEye),
        (Nose, LeftEar),
        (Nose, RightEar),
        (LeftEar, LeftEye),
        (RightEar, RightEye),
        (LeftEye, RightEye),
        (LeftShoulder, RightShoulder),
        (LeftShoulder, LeftElbow),
        (LeftShoulder, LeftHip),
        (RightShoulder, RightElbow),
        (RightShoulder, RightHip),
        (LeftElbow, LeftWrist),
        (RightElbow, RightWrist),
        (LeftHip, RightHip),
        (LeftHip, LeftKnee),
        (RightHip, RightKnee),
        (LeftKnee, LeftAnkle),
        (RightKnee, RightAnkle),
    ];
}
