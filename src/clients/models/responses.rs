use serde::{Deserialize, Serialize};

use crate::clients::models::common::{Exercise, ExerciseTemplate};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutResponse {
    pub id: String,
    pub title: String,
    pub routine_id: Option<String>,
    pub description: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub updated_at: String,
    pub created_at: String,
    pub exercises: Vec<Exercise>,
}

// Workouts list response from GET /v1/workouts (newest first)
#[derive(Debug, Deserialize)]
pub struct WorkoutsListResponse {
    pub page_count: i32,
    pub workouts: Vec<WorkoutResponse>,
}

// Exercise templates list response from GET /v1/exercise_templates
#[derive(Debug, Deserialize)]
pub struct ExerciseTemplatesListResponse {
    pub page_count: i32,
    pub exercise_templates: Vec<ExerciseTemplate>,
}
