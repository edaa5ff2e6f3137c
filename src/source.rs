use crate::{
    error::Error,
    geometry::Point,
    pose::{Keypoint, KeypointKind, Keypoints, Pose, NUM_KEYPOINTS},
};
use serde::Deserialize;
use std::{convert::TryInto, io::BufRead};

/// One estimator output frame: zero or more detected bodies, primary first.
pub(crate) type Frame = Vec<Pose>;

/// The seam to the external pose estimator.
pub(crate) trait PoseSource {
    /// Produce the next frame, or `None` once the stream has ended. An error
    /// is terminal for the session; callers never retry.
    fn next_frame(&mut self) -> Result<Option<Frame>, Error>;
}

impl<S: PoseSource + ?Sized> PoseSource for Box<S> {
    fn next_frame(&mut self) -> Result<Option<Frame>, Error> {
        (**self).next_frame()
    }
}

#[derive(Debug, Deserialize)]
struct RawKeypoint {
    x: f32,
    y: f32,
    score: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct RawPose {
    keypoints: Vec<RawKeypoint>,
    #[serde(default = "full_confidence")]
    score: f32,
}

fn full_confidence() -> f32 {
    1.0
}

/// Replays recorded estimator output: one JSON array of detected poses per
/// line, keypoints in fixed anatomical order. An empty array is a frame with
/// no detected bodies; blank lines are skipped.
pub(crate) struct NdjsonSource<R> {
    reader: R,
    line: String,
}

impl<R> NdjsonSource<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
        }
    }
}

impl<R: BufRead> PoseSource for NdjsonSource<R> {
    fn next_frame(&mut self) -> Result<Option<Frame>, Error> {
        loop {
            self.line.clear();
            let read = self
                .reader
                .read_line(&mut self.line)
                .map_err(Error::ReadFrameLine)?;
            if read == 0 {
                return Ok(None);
            }

            let record = self.line.trim();
            if record.is_empty() {
                continue;
            }

            let raw: Vec<RawPose> = serde_json::from_str(record).map_err(Error::ParseFrame)?;
            return raw
                .into_iter()
                .map(convert_pose)
                .collect::<Result<Frame, Error>>()
                .map(Some);
        }
    }
}

fn convert_pose(raw: RawPose) -> Result<Pose, Error> {
    if raw.keypoints.len() != NUM_KEYPOINTS {
        return Err(Error::KeypointCount(raw.keypoints.len()));
    }

    let keypoints = raw
        .keypoints
        .into_iter()
        .enumerate()
        .map(|(index, keypoint)| {
            Ok(Keypoint {
                kind: KeypointKind::from_idx(index)?,
                point: Point::new(keypoint.x, keypoint.y)?,
                // an absent score means the estimator is fully confident
                score: keypoint.score.unwrap_or(1.0),
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let keypoints: Keypoints = keypoints
        .try_into()
        .map_err(|_| Error::KeypointCount(NUM_KEYPOINTS))?;
    Ok(Pose {
        keypoints,
        score: raw.score,
    })
}

/// Hands out a fixed frame sequence, then reports end of stream.
#[cfg(test)]
pub(crate) struct ScriptedSource {
    frames: std::vec::IntoIter<Frame>,
}

#[cfg(test)]
impl ScriptedSource {
    pub(crate) fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into_iter(),
        }
    }
}

#[cfg(test)]
impl PoseSource for ScriptedSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, Error> {
        Ok(self.frames.next())
    }
}
