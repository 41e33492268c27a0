use serde::{Deserialize, Serialize};

/// Identifies the sensor frame and acquisition time of a depth image.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameHeader {
    pub frame_id: String,
    pub stamp_sec: f64,
}

impl FrameHeader {
    pub fn new(frame_id: impl Into<String>, stamp_sec: f64) -> Self {
        Self {
            frame_id: frame_id.into(),
            stamp_sec,
        }
    }
}

/// Point on the ground plane in the robot's local frame (meters).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundPoint {
    pub x: f32, // lateral, left positive
    pub y: f32, // forward
}

/// Open polyline of drop-off boundary points, ordered left to right in the
/// image. An empty polygon means no cliff was found in the frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CliffPolygon {
    pub header: FrameHeader,
    pub points: Vec<GroundPoint>,
}

impl CliffPolygon {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}
