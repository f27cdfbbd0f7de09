//! Per-session artifact bookkeeping (video, HAR, trace).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One recorded page video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoArtifact {
    pub video_path: Option<PathBuf>,
    pub video_artifact_id: Option<String>,
    /// Lazily populated from disk; empty until read.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub video_data: Vec<u8>,
}

/// Artifacts owned by one browser session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrowserArtifacts {
    /// Index position corresponds to page-creation order within the session.
    pub video_artifacts: Vec<VideoArtifact>,
    pub har_path: Option<PathBuf>,
    pub traces_dir: Option<PathBuf>,
}

impl BrowserArtifacts {
    /// Record a video path for the page at `index`. The slot is grown on
    /// demand; an already recorded path is never overwritten.
    pub fn record_video_path(&mut self, index: usize, path: PathBuf) {
        if self.video_artifacts.len() <= index {
            self.video_artifacts
                .resize_with(index + 1, VideoArtifact::default);
        }
        let slot = &mut self.video_artifacts[index];
        if slot.video_path.is_none() {
            slot.video_path = Some(path);
        }
    }

    /// Whether tracing was enabled for this session.
    #[must_use]
    pub fn tracing_enabled(&self) -> bool {
        self.traces_dir.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_grows_the_sequence() {
        let mut artifacts = BrowserArtifacts::default();
        artifacts.record_video_path(2, PathBuf::from("/tmp/v2.webm"));
        assert_eq!(artifacts.video_artifacts.len(), 3);
        assert!(artifacts.video_artifacts[0].video_path.is_none());
        assert_eq!(
            artifacts.video_artifacts[2].video_path,
            Some(PathBuf::from("/tmp/v2.webm"))
        );
    }

    #[test]
    fn test_first_write_wins() {
        let mut artifacts = BrowserArtifacts::default();
        artifacts.record_video_path(0, PathBuf::from("/tmp/first.webm"));
        artifacts.record_video_path(0, PathBuf::from("/tmp/second.webm"));
        assert_eq!(
            artifacts.video_artifacts[0].video_path,
            Some(PathBuf::from("/tmp/first.webm"))
        );
    }

    #[test]
    fn test_tracing_enabled() {
        let mut artifacts = BrowserArtifacts::default();
        assert!(!artifacts.tracing_enabled());
        artifacts.traces_dir = Some(PathBuf::from("traces"));
        assert!(artifacts.tracing_enabled());
    }
}
