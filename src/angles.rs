use crate::{
    geometry::{self, Segment},
    pose::{KeypointKind, Keypoints},
};

/// One of the 8 tracked joint angles, named after the vertex joint the angle
/// is measured at. Channel numbers 1-8 follow the reference pose tables.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum AngleChannel {
    RightElbow,
    LeftElbow,
    RightShoulder,
    LeftShoulder,
    RightHip,
    LeftHip,
    RightKnee,
    LeftKnee,
}

pub(crate) const NUM_ANGLE_CHANNELS: usize = 8;

impl AngleChannel {
    pub(crate) const ALL: [AngleChannel; NUM_ANGLE_CHANNELS] = [
        AngleChannel::RightElbow,
        AngleChannel::LeftElbow,
        AngleChannel::RightShoulder,
        AngleChannel::LeftShoulder,
        AngleChannel::RightHip,
        AngleChannel::LeftHip,
        AngleChannel::RightKnee,
        AngleChannel::LeftKnee,
    ];

    #[inline]
    pub(crate) fn idx(self) -> usize {
        self as usize
    }

    /// 1-based channel number used by the pose tables and the readout.
    #[inline]
    pub(crate) fn number(self) -> usize {
        self as usize + 1
    }
}

/// Two ordered segments whose signed angle defines one channel.
pub(crate) struct ChannelWiring {
    pub(crate) channel: AngleChannel,
    pub(crate) seg_a: (KeypointKind, KeypointKind),
    pub(crate) seg_b: (KeypointKind, KeypointKind),
}

pub(crate) mod constants {
    use super::{AngleChannel, ChannelWiring, NUM_ANGLE_CHANNELS};
    use crate::pose::KeypointKind::*;

    /// Transcribed joint-for-joint from the tuned reference tables' source.
    /// Left and right channels intentionally do not mirror each other's
    /// segment order; swapping endpoints changes the sign of the angle.
    pub(crate) const CHANNEL_WIRING: [ChannelWiring; NUM_ANGLE_CHANNELS] = [
        ChannelWiring {
            channel: AngleChannel::RightElbow,
            seg_a: (RightElbow, RightWrist),
            seg_b: (RightElbow, RightShoulder),
        },
        ChannelWiring {
            channel: AngleChannel::LeftElbow,
            seg_a: (LeftElbow, LeftShoulder),
            seg_b: (LeftElbow, LeftWrist),
        },
        ChannelWiring {
            channel: AngleChannel::RightShoulder,
            seg_a: (RightShoulder, RightHip),
            seg_b: (RightShoulder, RightElbow),
        },
        ChannelWiring {
            channel: AngleChannel::LeftShoulder,
            seg_a: (LeftShoulder, LeftElbow),
            seg_b: (LeftShoulder, LeftHip),
        },
        ChannelWiring {
            channel: AngleChannel::RightHip,
            seg_a: (RightHip, RightKnee),
            seg_b: (RightHip, RightShoulder),
        },
        ChannelWiring {
            channel: AngleChannel::LeftHip,
            seg_a: (LeftHip, LeftShoulder),
            seg_b: (LeftHip, LeftKnee),
        },
        ChannelWiring {
            channel: AngleChannel::RightKnee,
            seg_a: (RightKnee, RightHip),
            seg_b: (RightKnee, RightAnkle),
        },
        ChannelWiring {
            channel: AngleChannel::LeftKnee,
            seg_a: (LeftKnee, LeftAnkle),
            seg_b: (LeftKnee, LeftHip),
        },
    ];
}

/// Per-channel signed angles for one frame. A channel is `None` when any of
/// its endpoint keypoints scored below the visibility threshold; it is never
/// zero-filled.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub(crate) struct AngleVector([Option<f32>; NUM_ANGLE_CHANNELS]);

impl AngleVector {
    #[inline]
    pub(crate) fn get(self, channel: AngleChannel) -> Option<f32> {
        self.0[channel.idx()]
    }

    #[inline]
    pub(crate) fn set(&mut self, channel: AngleChannel, degrees: f32) {
        self.0[channel.idx()] = Some(degrees);
    }

    pub(crate) fn channels(self) -> impl Iterator<Item = (AngleChannel, Option<f32>)> {
        AngleChannel::ALL
            .iter()
            .map(move |&channel| (channel, self.0[channel.idx()]))
    }

    /// Live numeric display: one line per channel, `-` when unavailable.
    pub(crate) fn readout_lines(self) -> Vec<String> {
        AngleChannel::ALL
            .iter()
            .map(|&channel| match self.get(channel) {
                Some(degrees) => format!("{}: {}", channel.number(), degrees as i32),
                None => format!("{}: -", channel.number()),
            })
            .collect()
    }
}

/// Derive the 8 channel angles from one frame's keypoints. A channel is
/// computed only when all four segment endpoints score at or above
/// `visibility_threshold`.
pub(crate) fn extract_angles(keypoints: &Keypoints, visibility_threshold: f32) -> AngleVector {
    let mut angles = AngleVector::default();

    for wiring in &constants::CHANNEL_WIRING {
        let endpoints = [
            wiring.seg_a.0,
            wiring.seg_a.1,
            wiring.seg_b.0,
            wiring.seg_b.1,
        ];
        let visible = endpoints
            .iter()
            .all(|kind| keypoints[kind.idx()].score >= visibility_threshold);
        if !visible {
            continue;
        }

        let segment = |pair: (KeypointKind, KeypointKind)| {
            Segment::new(keypoints[pair.0.idx()].point, keypoints[pair.1.idx()].point)
        };
        angles.set(
            wiring.channel,
            geometry::signed_angle_between(segment(wiring.seg_a), segment(wiring.seg_b)),
        );
    }

    angles
}

/// Upright test subject facing the camera, canvas coordinates (y grows
/// down), arms hanging slightly outward and legs slightly inward. Every
/// channel is derivable by hand from these positions.
#[cfg(test)]
pub(crate) fn standing_keypoints() -> Keypoints {
    use crate::{geometry::Point, pose::Keypoint};
    use std::convert::TryInto;

    let positions = [
        (320.0, 100.0), // nose
        (330.0, 90.0),  // left_eye
        (310.0, 90.0),  // right_eye
        (340.0, 95.0),  // left_ear
        (300.0, 95.0),  // right_ear
        (380.0, 180.0), // left_shoulder
        (260.0, 180.0), // right_shoulder
        (400.0, 260.0), // left_elbow
        (240.0, 260.0), // right_elbow
        (410.0, 340.0), // left_wrist
        (230.0, 340.0), // right_wrist
        (360.0, 360.0), // left_hip
        (280.0, 360.0), // right_hip
        (355.0, 480.0), // left_knee
        (285.0, 480.0), // right_knee
        (350.0, 600.0), // left_ankle
        (290.0, 600.0), // right_ankle
    ];

    let keypoints: Vec<_> = positions
        .iter()
        .enumerate()
        .map(|(index, &(x, y))| Keypoint {
            kind: KeypointKind::from_idx(index).unwrap(),
            point: Point::new(x, y).unwrap(),
            score: 1.0,
        })
        .collect();
    keypoints.try_into().unwrap()
}
