#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("unknown reference pose: {0:?}")]
    UnknownPose(String),

    #[error("evaluation tick invoked without an active pose attempt")]
    NoActivePose,

    #[error("failed to read frame line from estimator stream")]
    ReadFrameLine(#[source] std::io::Error),

    #[error("failed to parse estimator frame record")]
    ParseFrame(#[source] serde_json::Error),

    #[error("expected 17 keypoints per pose, got {0}")]
    KeypointCount(usize),

    #[error("failed to convert usize value to keypoint kind: {0}")]
    ConvertUSizeToKeypointKind(usize),

    #[error("failed to construct NotNan from f32: {1}")]
    ConstructNotNan(#[source] ordered_float::FloatIsNan, f32),

    #[error("failed to open estimator stream: {1:?}")]
    OpenInput(#[source] std::io::Error, std::path::PathBuf),

    #[error("failed to open overlay sink: {1:?}")]
    OpenOverlaySink(#[source] std::io::Error, std::path::PathBuf),

    #[error("failed to serialize overlay record")]
    SerializeOverlay(#[source] serde_json::Error),

    #[error("failed to write overlay record")]
    WriteOverlay(#[source] std::io::Error),
}
