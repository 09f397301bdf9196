use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Mutex, RwLock};

use crate::analytics::model::{Exercise, MuscleGroup, SetRecord, WorkoutSession};
use crate::clients::hevy::HevyClient;
use crate::clients::models::common::ExerciseTemplate;
use crate::clients::models::responses::WorkoutResponse;

const WORKOUTS_PAGE_SIZE: i32 = 10;
const TEMPLATES_PAGE_SIZE: i32 = 100;

/// A user's full workout history, resolved against the exercise catalog.
#[derive(Debug, Clone)]
pub struct History {
    pub sessions: Vec<WorkoutSession>,
    pub catalog: HashMap<String, Exercise>,
    pub fetched_at: DateTime<Utc>,
}

pub fn muscle_group_for(primary_muscle_group: &str) -> MuscleGroup {
    match primary_muscle_group {
        "chest" | "shoulders" | "triceps" => MuscleGroup::Push,
        "lats" | "upper_back" | "biceps" | "traps" | "forearms" => MuscleGroup::Pull,
        "quadriceps" | "hamstrings" | "glutes" | "calves" | "abductors" | "adductors" => {
            MuscleGroup::Legs
        }
        "abdominals" | "lower_back" => MuscleGroup::Core,
        _ => MuscleGroup::Other,
    }
}

/// Working sets of a workout as a session dated by its start (UTC).
///
/// Warmups and sets without reps are dropped; bodyweight sets count as 0 kg.
pub fn session_from_workout(workout: &WorkoutResponse) -> Option<WorkoutSession> {
    let date = match DateTime::parse_from_rfc3339(&workout.start_time) {
        Ok(start) => start.with_timezone(&Utc).date_naive(),
        Err(e) => {
            tracing::warn!(
                workout_id = %workout.id,
                start_time = %workout.start_time,
                error = %e,
                "workout.unparseable_start_time"
            );
            return None;
        }
    };

    let sets = workout
        .exercises
        .iter()
        .flat_map(|exercise| {
            exercise
                .sets
                .iter()
                .filter(|set| !set.is_warmup())
                .filter_map(move |set| {
                    Some(SetRecord {
                        exercise_id: exercise.exercise_template_id.clone(),
                        weight: f64::from(set.weight_kg.unwrap_or(0.0)),
                        reps: set.reps?,
                        rpe: set.rpe.map(f64::from),
                    })
                })
        })
        .collect();

    Some(WorkoutSession {
        id: workout.id.clone(),
        date,
        completed: true,
        sets,
    })
}

/// Exercises seen in `workouts`, with muscle groups taken from `templates`.
pub fn build_catalog(
    workouts: &[WorkoutResponse],
    templates: &[ExerciseTemplate],
) -> HashMap<String, Exercise> {
    let mut catalog: HashMap<String, Exercise> = templates
        .iter()
        .map(|template| {
            (
                template.id.clone(),
                Exercise {
                    id: template.id.clone(),
                    name: template.title.clone(),
                    muscle_group: muscle_group_for(&template.primary_muscle_group),
                },
            )
        })
        .collect();

    for exercise in workouts.iter().flat_map(|workout| &workout.exercises) {
        catalog
            .entry(exercise.exercise_template_id.clone())
            .or_insert_with(|| Exercise {
                id: exercise.exercise_template_id.clone(),
                name: exercise.title.clone(),
                muscle_group: MuscleGroup::Other,
            });
    }

    catalog
}

pub fn build_history(
    workouts: &[WorkoutResponse],
    templates: &[ExerciseTemplate],
    fetched_at: DateTime<Utc>,
) -> History {
    let mut sessions: Vec<WorkoutSession> =
        workouts.iter().filter_map(session_from_workout).collect();
    sessions.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

    History {
        sessions,
        catalog: build_catalog(workouts, templates),
        fetched_at,
    }
}

async fn fetch_all_workouts(client: &HevyClient) -> Result<Vec<WorkoutResponse>> {
    let mut workouts = Vec::new();
    let mut page = 1;
    loop {
        let response = client.get_workouts(page, WORKOUTS_PAGE_SIZE).await?;
        workouts.extend(response.workouts);
        if page >= response.page_count {
            break;
        }
        page += 1;
    }
    Ok(workouts)
}

async fn fetch_all_templates(client: &HevyClient) -> Result<Vec<ExerciseTemplate>> {
    let mut templates = Vec::new();
    let mut page = 1;
    loop {
        let response = client
            .get_exercise_templates(page, TEMPLATES_PAGE_SIZE)
            .await?;
        templates.extend(response.exercise_templates);
        if page >= response.page_count {
            break;
        }
        page += 1;
    }
    Ok(templates)
}

pub async fn load_history(client: &HevyClient) -> Result<History> {
    let (workouts, templates) =
        tokio::try_join!(fetch_all_workouts(client), fetch_all_templates(client))?;

    let history = build_history(&workouts, &templates, Utc::now());
    tracing::info!(
        workout_count = workouts.len(),
        session_count = history.sessions.len(),
        exercise_count = history.catalog.len(),
        "history.loaded"
    );
    Ok(history)
}

/// Last loaded history, reloaded once it is older than the TTL.
///
/// Reloads are serialized: requests that find the snapshot stale queue behind
/// the one already reloading and reuse its result.
#[derive(Clone)]
pub struct HistoryCache {
    client: HevyClient,
    ttl: Duration,
    snapshot: Arc<RwLock<Option<Arc<History>>>>,
    reload: Arc<Mutex<()>>,
}

impl HistoryCache {
    pub fn new(client: HevyClient, ttl_minutes: i64) -> Self {
        Self {
            client,
            ttl: Duration::minutes(ttl_minutes),
            snapshot: Arc::new(RwLock::new(None)),
            reload: Arc::new(Mutex::new(())),
        }
    }

    pub async fn get(&self) -> Result<Arc<History>> {
        if let Some(history) = self.fresh().await {
            return Ok(history);
        }

        let _reload = self.reload.lock().await;
        if let Some(history) = self.fresh().await {
            tracing::debug!("history.reloaded_by_other_request");
            return Ok(history);
        }

        tracing::debug!("history.cache_stale");
        self.reload_locked().await
    }

    pub async fn refresh(&self) -> Result<Arc<History>> {
        let _reload = self.reload.lock().await;
        self.reload_locked().await
    }

    async fn fresh(&self) -> Option<Arc<History>> {
        let snapshot = self.snapshot.read().await;
        snapshot
            .as_ref()
            .filter(|history| Utc::now() - history.fetched_at < self.ttl)
            .map(Arc::clone)
    }

    async fn reload_locked(&self) -> Result<Arc<History>> {
        let history = Arc::new(load_history(&self.client).await?);
        self.store(Arc::clone(&history)).await;
        Ok(history)
    }

    async fn store(&self, history: Arc<History>) {
        *self.snapshot.write().await = Some(history);
    }
}
