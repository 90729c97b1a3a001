use cragcore::grips::HoldDetection;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct AnnotateRequest {
    pub requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Serialize)]
pub struct AnnotateImageRequest {
    pub image: ImageContent,
    pub features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
pub struct ImageContent {
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub max_results: u32,
}

impl AnnotateRequest {
    pub fn object_localization(image_base64: &str, max_results: u32) -> Self {
        Self {
            requests: vec![AnnotateImageRequest {
                image: ImageContent {
                    content: image_base64.to_string(),
                },
                features: vec![Feature {
                    kind: "OBJECT_LOCALIZATION".into(),
                    max_results,
                }],
            }],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AnnotateResponse {
    #[serde(default)]
    pub responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotateImageResponse {
    #[serde(default)]
    pub localized_object_annotations: Vec<LocalizedObject>,
    pub error: Option<UpstreamStatus>,
}

#[derive(Debug, Deserialize)]
pub struct UpstreamStatus {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedObject {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub score: f32,
    pub bounding_poly: BoundingPoly,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingPoly {
    #[serde(default)]
    pub normalized_vertices: Vec<Vertex>,
}

/// Zero coordinates are omitted on the wire.
#[derive(Debug, Default, Deserialize)]
pub struct Vertex {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

impl LocalizedObject {
    /// Center of the bounding polygon, clamped to the unit square.
    pub fn center(&self) -> Option<(f32, f32)> {
        let vertices = &self.bounding_poly.normalized_vertices;
        if vertices.is_empty() {
            return None;
        }
        let count = vertices.len() as f32;
        let x = vertices.iter().map(|v| v.x).sum::<f32>() / count;
        let y = vertices.iter().map(|v| v.y).sum::<f32>() / count;
        Some((x.clamp(0.0, 1.0), y.clamp(0.0, 1.0)))
    }
}

impl AnnotateResponse {
    /// Upstream error of the first image, if it reported one.
    pub fn error(&self) -> Option<&UpstreamStatus> {
        self.responses.first().and_then(|r| r.error.as_ref())
    }

    pub fn into_holds(self, min_confidence: f32) -> Vec<HoldDetection> {
        self.responses
            .into_iter()
            .flat_map(|response| response.localized_object_annotations)
            .filter(|object| object.score >= min_confidence)
            .filter_map(|object| {
                object.center().map(|(x, y)| HoldDetection {
                    x,
                    y,
                    confidence: object.score,
                    name: object.name,
                })
            })
            .collect()
    }
}
