use soap_core::model::{ExerciseAttempt, ExerciseId, Section, UserId};
use soap_core::time::fixed_now;
use std::path::PathBuf;
use std::time::Duration;
use storage::repository::{ExerciseRepository, ProgressRepository};
use storage::{Storage, load_exercises, load_progress, parse_progress, render_progress};

fn data_file(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../data")
        .join(name)
}

#[tokio::test]
async fn bundled_catalog_seeds_storage() {
    let exercises = load_exercises(data_file("exercises.json")).expect("load catalog");
    assert_eq!(exercises.len(), 4);

    let storage = Storage::with_exercises(exercises);
    let listed = storage.exercises.list_exercises().await.unwrap();
    let sections: Vec<Section> = listed.iter().map(|e| e.section()).collect();
    assert_eq!(sections, Section::ALL.to_vec());

    let objective = storage
        .exercises
        .get_exercise(&ExerciseId::new("O-001").unwrap())
        .await
        .expect("fetch");
    assert_eq!(objective.sentence().tokens().len(), 7);
    assert_eq!(objective.rules().near_miss_distance(), 0);
}

#[tokio::test]
async fn progress_snapshot_survives_storage_and_rendering() {
    let mut progress = load_progress(data_file("progress.json")).expect("load progress");
    assert_eq!(progress.section(Section::Plan).total_attempts(), 0);

    progress.record_attempt(&ExerciseAttempt {
        exercise_id: ExerciseId::new("P-001").unwrap(),
        section: Section::Plan,
        timestamp: fixed_now(),
        is_correct: true,
        time_taken: Duration::from_secs(20),
        error_kinds: Vec::new(),
    });

    let storage = Storage::in_memory();
    let user = UserId::random();
    storage.progress.save_progress(user, &progress).await.unwrap();

    let stored = storage.progress.get_progress(user).await.unwrap();
    assert_eq!(stored.total_exercises_completed(), 10);
    assert_eq!(stored.section(Section::Plan).total_attempts(), 1);

    let reread = parse_progress(&render_progress(&stored).unwrap()).unwrap();
    assert_eq!(reread.section(Section::Objective), stored.section(Section::Objective));
    assert_eq!(reread.last_practice_date(), stored.last_practice_date());
}
