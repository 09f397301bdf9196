use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub index: u32,
    pub title: String,
    pub notes: Option<String>,
    pub exercise_template_id: String,
    pub superset_id: Option<u32>,
    pub sets: Vec<ExerciseSet>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseSet {
    pub index: u32,
    #[serde(rename = "type")]
    pub set_type: String, // "warmup", "normal", "failure", "dropset"
    pub weight_kg: Option<f32>,
    pub reps: Option<u32>,
    pub distance_meters: Option<u32>,
    pub duration_seconds: Option<u32>,
    pub rpe: Option<f32>,
}

impl ExerciseSet {
    pub fn is_warmup(&self) -> bool {
        self.set_type.eq_ignore_ascii_case("warmup")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseTemplate {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub template_type: String, // "weight_reps", "bodyweight_reps", "duration", ...
    pub primary_muscle_group: String,
    #[serde(default)]
    pub secondary_muscle_groups: Vec<String>,
    #[serde(default)]
    pub is_custom: bool,
}
