//! Terminal front end: reads guesses from stdin and prints each snapshot.

use std::sync::Arc;

use anyhow::Result;
use cinequiz::{
    Candidate, CastOutcome, CastRevealEngine, ContentProvider, FilmographyEngine,
    FilmographyOutcome, GameConfig, GuessVerdict, HintTier, Person, RoundResult, SubjectRef,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, instrument, warn};

const CAST_HELP: &str = "Type a title to guess. Commands: :reveal :skip :giveup :again :quit";
const FILMOGRAPHY_HELP: &str =
    "Type a title (optionally with its year) to guess. Commands: :list :hint <n> :quit";

/// Plays cast-reveal rounds until the player quits.
#[instrument(skip_all, fields(mode = %config.mode()))]
pub async fn run_cast(provider: Arc<dyn ContentProvider>, config: GameConfig) -> Result<()> {
    let mut engine = CastRevealEngine::new(provider, config);
    engine.on_round_complete(print_result);

    println!("{}", CAST_HELP);
    engine.start().await?;
    print_cast_clues(&engine);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let outcome = match line {
            "" => continue,
            ":quit" => break,
            ":reveal" => engine.reveal_next_cast(),
            ":giveup" => engine.give_up(),
            ":skip" => engine.skip_subject().await?,
            ":again" => engine.play_again().await?,
            query => match engine.search(query).await?.into_iter().next() {
                Some(candidate) => {
                    println!("> {}", candidate);
                    engine.take_guess(candidate)
                }
                None => {
                    println!("No movie found for \"{}\"", query);
                    continue;
                }
            },
        };
        debug!(?outcome, "Cast action applied");

        match outcome {
            CastOutcome::Wrong { .. } | CastOutcome::Revealed { .. } | CastOutcome::RoundStarted { .. } => {
                print_cast_clues(&engine)
            }
            CastOutcome::AtBudget => println!("Every clue is already showing."),
            CastOutcome::RoundOver => println!("Round over. Type :again for another movie."),
            CastOutcome::Correct | CastOutcome::Lost | CastOutcome::Forfeited(_) => {
                if let Some(subject) = engine.state().subject() {
                    println!("It was {}.", Candidate::from(subject));
                }
                println!("Type :again for another movie.");
            }
            other => debug!(?other, "Nothing to print"),
        }
    }

    let state = engine.state();
    for result in state.history().iter() {
        let verdict = if *result.is_correct() { "won" } else { "lost" };
        match result.subject() {
            SubjectRef::Movie { title, .. } => println!("  {} ({})", title, verdict),
            SubjectRef::Person { name, .. } => println!("  {} ({})", name, verdict),
        }
    }
    println!(
        "Score {} of {} rounds, {} attempts.",
        state.score(),
        state.rounds_played(),
        state.attempts()
    );
    Ok(())
}

/// Plays one filmography round for an actor.
#[instrument(skip_all, fields(actor_id = *actor.id()))]
pub async fn run_filmography(
    provider: Arc<dyn ContentProvider>,
    config: GameConfig,
    actor: Person,
) -> Result<()> {
    let mut engine = FilmographyEngine::new(provider, config);
    engine.on_round_complete(print_result);

    let total = engine.select_subject(actor.clone()).await?;
    println!("Name the {} films of {}.", total, actor.name());
    println!("{}", FILMOGRAPHY_HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_filmography_line(&mut engine, line.trim()).await? {
                    break;
                }
            }
            Some(outcome) = engine.next_tick() => match outcome {
                FilmographyOutcome::Ticked { remaining_secs } if remaining_secs % 30 == 0 => {
                    println!("{} seconds left.", remaining_secs);
                }
                FilmographyOutcome::TimeUp => println!("Time is up!"),
                _ => {}
            },
        }
    }

    let state = engine.state();
    println!("You named {} of {} films.", state.correct(), state.total());
    Ok(())
}

async fn handle_filmography_line(engine: &mut FilmographyEngine, line: &str) -> Result<bool> {
    match line {
        "" => {}
        ":quit" => return Ok(false),
        ":list" => print_filmography(engine),
        _ if line.starts_with(":hint") => {
            let index = line[":hint".len()..].trim().parse::<usize>().ok();
            let entry_id = index
                .and_then(|i| i.checked_sub(1))
                .and_then(|i| engine.state().entries().get(i))
                .map(|entry| *entry.id());
            match entry_id {
                Some(entry_id) => {
                    let level = engine.reveal_hint(entry_id);
                    debug!(entry_id, level, "Hint revealed");
                    print_filmography(engine);
                }
                None => println!("Usage: :hint <entry number from :list>"),
            }
        }
        query => {
            let (title, year) = split_year(query);
            let searched = engine.search(title).await.unwrap_or_else(|e| {
                warn!(error = %e, "Search failed, guessing by title");
                Vec::new()
            });
            let candidate = searched
                .into_iter()
                .find(|c| year.is_none() || *c.release_year() == year)
                .unwrap_or_else(|| Candidate::new(0, title.to_string(), None, year));
            match engine.guess(candidate) {
                GuessVerdict::Correct { .. } => {
                    let state = engine.state();
                    println!("Yes! {} of {}.", state.correct(), state.total());
                    if state.is_all_solved() {
                        return Ok(false);
                    }
                }
                GuessVerdict::AlreadyGuessed { .. } => println!("Already named."),
                GuessVerdict::Wrong => println!("Not in the filmography."),
                GuessVerdict::OutOfTime => println!("Time is up, no more guesses."),
                GuessVerdict::NotRunning => return Ok(false),
            }
        }
    }
    Ok(true)
}

/// Splits a trailing year off a title: "Heat (1995)" or "Heat 1995".
fn split_year(query: &str) -> (&str, Option<i32>) {
    let trimmed = query.trim_end_matches(')').trim_end();
    if let Some((title, year)) = trimmed.rsplit_once(['(', ' '])
        && year.len() == 4
        && let Ok(year) = year.parse::<i32>()
    {
        return (title.trim_end_matches([' ', '(']).trim(), Some(year));
    }
    (query, None)
}

fn print_cast_clues(engine: &CastRevealEngine) {
    let state = engine.state();
    println!(
        "Cast ({} of {} clues):",
        state.revealed(),
        state.effective_budget()
    );
    for member in state.revealed_cast() {
        match member.character() {
            Some(character) => println!("  {} as {}", member.name(), character),
            None => println!("  {}", member.name()),
        }
    }
}

fn print_filmography(engine: &FilmographyEngine) {
    let state = engine.state();
    for (index, entry) in state.entries().iter().enumerate() {
        if state.is_solved(*entry.id()) {
            println!("{:>3}. {} ({})", index + 1, entry.title(), entry.year());
            continue;
        }
        let hints: Vec<String> = HintTier::unlocked(state.hint_level(*entry.id()))
            .iter()
            .map(|tier| match tier {
                HintTier::Year => entry.year().to_string(),
                HintTier::Genre => entry.genre().clone(),
                HintTier::Character => entry.character().clone().unwrap_or_else(|| "?".into()),
                HintTier::Poster => entry.poster().clone().unwrap_or_else(|| "no poster".into()),
            })
            .collect();
        println!("{:>3}. ??? {}", index + 1, hints.join(" / "));
    }
}

fn print_result(result: &RoundResult) {
    let verdict = if *result.is_correct() { "won" } else { "lost" };
    println!(
        "Round {} after {} guesses and {} clues.",
        verdict,
        result.guess_count(),
        result.clues_revealed()
    );
}
