use chrono::{DateTime, Duration, Utc};
use clap::Parser;
use quizflow::data::{QuizSnapshot, Response, Session};
use quizflow::navigation::option_handle_id;
use quizflow::stage::{
    ButtonAction, ChoiceOption, Component, ComponentConfig, Connection, LoadingConfig, Stage,
};
use rand::{Rng, rngs::ThreadRng};

/// A CLI tool to generate quiz snapshots with synthetic funnel traffic
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_quiz.json")]
    output: String,

    /// Quiz id to use for the snapshot
    #[arg(long, default_value = "demo-quiz")]
    quiz_id: String,

    /// Number of question stages between the welcome and result screens
    #[arg(long, default_value_t = 3)]
    questions: usize,

    /// Number of sessions to simulate
    #[arg(long, default_value_t = 200)]
    sessions: usize,

    /// Probability (0-1) that a session continues to the next stage
    #[arg(long, default_value_t = 0.8)]
    continue_rate: f64,

    /// Sessions start within this many hours before now
    #[arg(long, default_value_t = 24)]
    hours: i64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    if !(0.0..=1.0).contains(&cli.continue_rate) {
        eprintln!(
            "Error: --continue-rate ({}) must be between 0 and 1",
            cli.continue_rate
        );
        std::process::exit(1);
    }

    println!(
        "Generating quiz '{}' with {} questions and {} sessions...",
        cli.quiz_id, cli.questions, cli.sessions
    );

    let stages = generate_stages(cli.questions);
    println!("-> Generated {} stages.", stages.len());

    let (sessions, responses) = generate_traffic(&mut rng, &cli, &stages);
    println!(
        "-> Generated {} sessions with {} responses.",
        sessions.len(),
        responses.len()
    );

    let snapshot = QuizSnapshot {
        quiz_id: cli.quiz_id.clone(),
        stages,
        sessions,
        responses,
    };
    snapshot.save(&cli.output)?;

    println!(
        "Successfully generated and saved quiz snapshot to '{}'",
        cli.output
    );

    Ok(())
}

/// Welcome screen, `questions` choice screens, a loader and a result screen, chained in order.
fn generate_stages(questions: usize) -> Vec<Stage> {
    let mut stages = vec![Stage::new("welcome", 0, "Welcome").with_component(Component::new(
        "welcome-start",
        "Start",
        ComponentConfig::button("Start quiz", ButtonAction::Next),
    ))];

    for q in 0..questions {
        let component_id = format!("q{}-choice", q + 1);
        let options = (0..3)
            .map(|o| ChoiceOption::new(format!("opt{}", o + 1), format!("Answer {}", o + 1)))
            .collect();
        stages.push(
            Stage::new(format!("q{}", q + 1), q as u32 + 1, format!("Question {}", q + 1))
                .with_component(Component::new(
                    component_id,
                    "Choice",
                    ComponentConfig::single_choice(format!("Question {}?", q + 1), options),
                )),
        );
    }

    let loader_order = stages.len() as u32;
    stages.push(Stage::new("analyzing", loader_order, "Analyzing").with_component(
        Component::new(
            "analyzing-loader",
            "Loader",
            ComponentConfig::Loading(LoadingConfig {
                duration_ms: Some(3000),
            }),
        ),
    ));
    stages.push(Stage::new("result", loader_order + 1, "Result").with_component(
        Component::new(
            "result-cta",
            "Get offer",
            ComponentConfig::button(
                "Get my plan",
                ButtonAction::CustomUrl {
                    url: Some("https://example.com/offer".to_string()),
                },
            ),
        ),
    ));

    // Chain each stage to the next through its first connection point.
    let ids: Vec<String> = stages.iter().map(|s| s.id.clone()).collect();
    for (stage, next_id) in stages.iter_mut().zip(ids.iter().skip(1)) {
        let mut handles: Vec<Option<String>> = Vec::new();
        for component in &stage.components {
            match &component.config {
                ComponentConfig::SingleChoice(cfg) => handles.extend(
                    cfg.options
                        .iter()
                        .map(|o| Some(option_handle_id(&component.id, &o.id))),
                ),
                _ => handles.push(Some(component.id.clone())),
            }
        }
        for handle in handles {
            stage.connections.push(Connection::new(handle, next_id.clone()));
        }
    }

    stages
}

fn generate_traffic(
    rng: &mut ThreadRng,
    cli: &Cli,
    stages: &[Stage],
) -> (Vec<Session>, Vec<Response>) {
    let now = Utc::now();
    let mut sessions = Vec::with_capacity(cli.sessions);
    let mut responses = Vec::new();

    for i in 0..cli.sessions {
        let offset_minutes = rng.random_range(0..(cli.hours.max(1) * 60));
        let started_at = now - Duration::minutes(offset_minutes);
        let mut session = Session::new(format!("session-{}", i), &cli.quiz_id, started_at);
        session.device = Some(if rng.random_bool(0.6) { "mobile" } else { "desktop" }.to_string());

        // Some sessions are abandoned before their first response is stored.
        if rng.random_bool(0.1) {
            sessions.push(session);
            continue;
        }

        let session = walk_stages(rng, session, stages, now, cli.continue_rate, &mut responses);
        sessions.push(session);
    }

    (sessions, responses)
}

/// Plays one session forward through the stages, stopping at `now` or when
/// the player drops off. Only a response on the last stage completes it.
fn walk_stages<R: Rng + ?Sized>(
    rng: &mut R,
    mut session: Session,
    stages: &[Stage],
    now: DateTime<Utc>,
    continue_rate: f64,
    responses: &mut Vec<Response>,
) -> Session {
    let mut at = session.started_at;
    let mut reached: Option<usize> = None;
    for (index, stage) in stages.iter().enumerate() {
        at += Duration::seconds(rng.random_range(5..90));
        if at > now {
            break;
        }
        responses.push(Response::new(
            format!("response-{}-{}", session.id, index),
            &session.id,
            &stage.id,
            at,
        ));
        reached = Some(index);
        if !rng.random_bool(continue_rate) {
            break;
        }
    }

    session.current_stage_index = reached.map(|index| index as u32);
    if reached.is_some_and(|index| index + 1 == stages.len()) {
        session = session.completed(at);
    }
    session
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_without_responses_has_no_progress() {
        let now = Utc::now();
        let stages = vec![Stage::new("only", 0, "Only")];
        let mut responses = Vec::new();

        let session = walk_stages(
            &mut rand::rng(),
            Session::new("late", "quiz", now),
            &stages,
            now,
            1.0,
            &mut responses,
        );

        assert!(responses.is_empty());
        assert_eq!(session.current_stage_index, None);
        assert!(!session.has_completed());
    }

    #[test]
    fn test_session_reaching_last_stage_completes() {
        let now = Utc::now();
        let stages = generate_stages(2);
        let mut responses = Vec::new();

        let session = walk_stages(
            &mut rand::rng(),
            Session::new("early", "quiz", now - Duration::hours(1)),
            &stages,
            now,
            1.0,
            &mut responses,
        );

        assert_eq!(responses.len(), stages.len());
        assert_eq!(session.current_stage_index, Some(stages.len() as u32 - 1));
        assert!(session.has_completed());
    }
}
