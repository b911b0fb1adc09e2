//! Integration tests for filmography rounds, countdown included.
//!
//! Timed tests run on a paused clock so the countdown advances instantly.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use cinequiz::{
    Candidate, Catalog, EngineError, FilmographyEngine, FilmographyOutcome, FilmographyPhase,
    GameConfig, GuessVerdict, MatchKind, Person, RawCredit, RoundResult,
};

fn credit(id: u64, title: &str, date: (i32, u32, u32)) -> RawCredit {
    RawCredit {
        id,
        title: Some(title.to_string()),
        release_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2),
        genre_ids: vec![80],
        character: Some(format!("Role in {}", title)),
        ..RawCredit::default()
    }
}

fn actor() -> Person {
    Person::new(7, "Jane Doe".into(), 10.0, None)
}

fn catalog() -> Catalog {
    Catalog::new().with_person(
        actor(),
        vec![
            credit(10, "Heat", (1995, 12, 15)),
            credit(11, "Ronin", (1998, 9, 25)),
            credit(12, "Casino", (1995, 11, 22)),
        ],
    )
}

fn engine(time_limit_secs: u32) -> FilmographyEngine {
    FilmographyEngine::new(
        Arc::new(catalog()),
        GameConfig::default().with_time_limit_secs(time_limit_secs),
    )
}

fn results_of(engine: &mut FilmographyEngine) -> Arc<Mutex<Vec<RoundResult>>> {
    let results = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&results);
    engine.on_round_complete(move |result| sink.lock().unwrap().push(result.clone()));
    results
}

#[tokio::test(start_paused = true)]
async fn test_countdown_runs_out() {
    let mut engine = engine(3);
    let results = results_of(&mut engine);

    let total = engine.select_subject(actor()).await.unwrap();
    assert_eq!(total, 3);
    assert!(engine.is_counting_down());

    assert_eq!(
        engine.next_tick().await,
        Some(FilmographyOutcome::Ticked { remaining_secs: 2 })
    );
    assert_eq!(
        engine.next_tick().await,
        Some(FilmographyOutcome::Ticked { remaining_secs: 1 })
    );
    assert_eq!(engine.next_tick().await, Some(FilmographyOutcome::TimeUp));

    assert!(engine.state().is_time_up());
    assert!(!engine.is_counting_down());
    assert_eq!(engine.next_tick().await, None);

    let late = Candidate::new(10, "Heat".into(), None, Some(1995));
    assert_eq!(engine.guess(late), GuessVerdict::OutOfTime);
    assert_eq!(engine.state().correct(), 0);

    let results = results.lock().unwrap();
    assert_eq!(results.len(), 1);
    assert!(!*results[0].is_correct());
}

#[tokio::test(start_paused = true)]
async fn test_solving_everything_stops_countdown() {
    let mut engine = engine(60);
    let results = results_of(&mut engine);
    engine.select_subject(actor()).await.unwrap();

    for id in [12, 10] {
        let verdict = engine.guess(Candidate::new(id, String::new(), None, None));
        assert!(matches!(verdict, GuessVerdict::Correct { kind: MatchKind::Exact, .. }));
    }
    assert!(engine.is_counting_down());

    let verdict = engine.guess(Candidate::new(11, "Ronin".into(), None, Some(1998)));
    assert_eq!(
        verdict,
        GuessVerdict::Correct {
            entry_id: 11,
            kind: MatchKind::Exact
        }
    );

    assert!(engine.state().is_all_solved());
    assert!(!engine.is_counting_down());
    assert_eq!(engine.next_tick().await, None);
    assert_eq!(engine.state().phase(), &FilmographyPhase::Running);

    let results = results.lock().unwrap();
    assert_eq!(results.len(), 1);
    assert!(*results[0].is_correct());
    assert_eq!(*results[0].guess_count(), 3);
}

#[tokio::test]
async fn test_title_and_year_fallback() {
    let mut engine = engine(0);
    engine.select_subject(actor()).await.unwrap();
    assert!(!engine.is_counting_down());

    let wrong_year = Candidate::new(0, "heat".into(), None, Some(1996));
    assert_eq!(engine.guess(wrong_year), GuessVerdict::Wrong);

    let no_year = Candidate::new(0, "Heat".into(), None, None);
    assert_eq!(engine.guess(no_year), GuessVerdict::Wrong);

    let close = Candidate::new(0, "HEAT!".into(), None, Some(1995));
    assert_eq!(
        engine.guess(close),
        GuessVerdict::Correct {
            entry_id: 10,
            kind: MatchKind::Fuzzy
        }
    );

    let again = Candidate::new(10, "Heat".into(), None, Some(1995));
    assert_eq!(
        engine.guess(again),
        GuessVerdict::AlreadyGuessed { entry_id: 10 }
    );
    assert_eq!(*engine.state().guess_count(), 3);
    assert_eq!(engine.state().wrong_guesses().len(), 2);
}

#[tokio::test]
async fn test_duplicate_and_future_credits_are_dropped() {
    let person = Person::new(8, "John Roe".into(), 3.0, None);
    let catalog = Catalog::new().with_person(
        person.clone(),
        vec![
            credit(21, "Twin Peaks", (1992, 8, 28)),
            credit(20, "Twin Peaks", (1992, 5, 16)),
            credit(22, "Twin Peaks", (2017, 5, 21)),
            credit(23, "Not Out Yet", (2999, 1, 1)),
            RawCredit {
                id: 24,
                title: Some("Undated".into()),
                ..RawCredit::default()
            },
        ],
    );
    let mut engine = FilmographyEngine::new(Arc::new(catalog), GameConfig::default());

    let total = engine.select_subject(person).await.unwrap();

    assert_eq!(total, 2);
    let ids: Vec<u64> = engine.state().entries().iter().map(|e| *e.id()).collect();
    assert_eq!(ids, [20, 22]);
}

#[tokio::test]
async fn test_hints_unlock_up_to_max_level() {
    let mut engine = engine(0);
    engine.select_subject(actor()).await.unwrap();

    let levels: Vec<u8> = (0..5).map(|_| engine.reveal_hint(11)).collect();

    assert_eq!(levels, [1, 2, 3, 4, 4]);
    assert_eq!(engine.reveal_hint(999), 0);
    assert_eq!(engine.state().hint_level(10), 0);
}

#[tokio::test(start_paused = true)]
async fn test_reset_cancels_countdown() {
    let mut engine = engine(30);
    engine.select_subject(actor()).await.unwrap();
    assert!(engine.is_counting_down());

    engine.reset();

    assert!(!engine.is_counting_down());
    assert_eq!(engine.state().phase(), &FilmographyPhase::Idle);
    assert_eq!(engine.next_tick().await, None);
    assert_eq!(
        engine.guess(Candidate::new(10, "Heat".into(), None, Some(1995))),
        GuessVerdict::NotRunning
    );
}

#[tokio::test(start_paused = true)]
async fn test_new_subject_discards_old_ticks() {
    let mut engine = engine(5);
    engine.select_subject(actor()).await.unwrap();

    tokio::time::advance(Duration::from_millis(2500)).await;
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }

    engine.select_subject(actor()).await.unwrap();
    assert_eq!(engine.state().remaining_secs(), &Some(5));

    assert_eq!(
        engine.next_tick().await,
        Some(FilmographyOutcome::Ticked { remaining_secs: 4 })
    );
}

#[tokio::test]
async fn test_unknown_actor_fails_load() {
    let mut engine = engine(60);
    let stranger = Person::new(404, "Nobody".into(), 0.0, None);

    let err = engine.select_subject(stranger).await.unwrap_err();

    assert!(matches!(err, EngineError::Fetch(_)));
    assert_eq!(engine.state().phase(), &FilmographyPhase::Failed);
    assert!(engine.state().error().is_some());
    assert!(!engine.is_counting_down());
}

#[tokio::test]
async fn test_actor_without_eligible_films() {
    let person = Person::new(9, "Newcomer".into(), 1.0, None);
    let catalog =
        Catalog::new().with_person(person.clone(), vec![credit(30, "Debut", (2999, 6, 1))]);
    let mut engine = FilmographyEngine::new(Arc::new(catalog), GameConfig::default());

    let err = engine.select_subject(person).await.unwrap_err();

    assert!(matches!(err, EngineError::EmptyFilmography { actor: 9 }));
    assert_eq!(engine.state().phase(), &FilmographyPhase::Failed);
    assert!(!engine.is_counting_down());
}
