use crate::{angles::AngleChannel, error::Error};

/// A named target angle table. Slot 0 of `targets` is the unused placeholder
/// the tuned tables were recorded with; channels 1-8 are read through
/// [`ReferencePose::target`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReferencePose {
    pub(crate) name: &'static str,
    pub(crate) targets: [f32; 9],
}

impl ReferencePose {
    #[inline]
    pub(crate) fn target(&self, channel: AngleChannel) -> f32 {
        self.targets[channel.number()]
    }
}

const POSES: [ReferencePose; 8] = [
    ReferencePose {
        name: "tree",
        targets: [0.0, 152.0, 154.0, -176.0, 176.0, -173.0, 121.0, -172.0, 65.0],
    },
    ReferencePose {
        name: "low-lune",
        targets: [0.0, -171.0, -177.0, -172.0, 175.0, 132.0, 75.0, -139.0, 70.0],
    },
    ReferencePose {
        name: "warrior-1",
        targets: [
            0.0, -166.0, 169.0, -174.0, -176.0, -120.0, -152.0, -129.0, 162.0,
        ],
    },
    ReferencePose {
        name: "warrior-2",
        targets: [0.0, 178.0, -173.0, 95.0, 112.0, 128.0, 91.0, -169.0, 102.0],
    },
    ReferencePose {
        name: "warrior-3",
        targets: [0.0, -173.0, 179.0, -160.0, 168.0, -78.0, 167.0, -158.0, 161.0],
    },
    ReferencePose {
        name: "chair",
        targets: [0.0, 167.0, -174.0, 164.0, -168.0, 91.0, -90.0, 97.0, -97.0],
    },
    ReferencePose {
        name: "awkward",
        targets: [0.0, -175.0, 176.0, -110.0, 109.0, -83.0, 84.0, -80.0, 82.0],
    },
    ReferencePose {
        name: "half-moon",
        targets: [0.0, 157.0, 158.0, 80.0, 95.0, 179.0, 62.0, -173.0, 164.0],
    },
];

/// Look up a reference pose by name.
pub(crate) fn lookup(name: &str) -> Result<ReferencePose, Error> {
    POSES
        .iter()
        .copied()
        .find(|pose| pose.name == name)
        .ok_or_else(|| Error::UnknownPose(name.to_owned()))
}

pub(crate) fn names() -> impl Iterator<Item = &'static str> {
    POSES.iter().map(|pose| pose.name)
}

#[cfg(test)]
mod tests {
    use super::{lookup, names};
    use crate::{angles::AngleChannel, error::Error};
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn tree_targets_read_through_channels() {
        let tree = lookup("tree").unwrap();
        assert_approx_eq!(tree.target(AngleChannel::RightElbow), 152.0);
        assert_approx_eq!(tree.target(AngleChannel::LeftElbow), 154.0);
        assert_approx_eq!(tree.target(AngleChannel::LeftKnee), 65.0);
    }

    #[test]
    fn every_pose_is_reachable_by_name() {
        for name in names() {
            assert_eq!(lookup(name).unwrap().name, name);
        }
    }

    #[test]
    fn unknown_name_is_an_error() {
        match lookup("headstand") {
            Err(Error::UnknownPose(name)) => assert_eq!(name, "headstand"),
            other => panic!("expected UnknownPose, got {:?}", other.map(|p| p.name)),
        }
    }
}
