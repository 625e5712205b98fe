use anyhow::{Context, Result, anyhow};
use coach_application::PracticeSession;
use coach_core::gateway::GatewayAction;
use coach_core::session::ActiveSession;
use coach_core::skill::SkillLevel;
use coach_core::transcript::Author;
use coach_infrastructure::{CoachConfig, FileStore};
use std::fs;
use std::path::PathBuf;

fn build_session(config: &CoachConfig) -> Result<PracticeSession<FileStore>> {
    PracticeSession::from_config(config)
}

async fn open_with_language(
    session: &PracticeSession<FileStore>,
    problem: &str,
    language: Option<String>,
) -> Result<ActiveSession> {
    let active = session.open(problem).await?;
    if active.problem_id() != problem {
        println!("Unknown problem '{}', opened '{}' instead", problem, active.problem_id());
    }
    match language {
        Some(language) => session.change_language(language).await,
        None => Ok(active),
    }
}

fn print_summary(active: &ActiveSession) {
    let problem = active.problem();
    println!("{} [{}] ({})", problem.title, problem.difficulty, active.language());
    println!("{}", problem.description);
}

pub fn problems(config: &CoachConfig) -> Result<()> {
    let catalog = config.catalog()?;
    for problem in catalog.problems() {
        println!("{:<50} {:<8} {}", problem.id, problem.difficulty, problem.title);
    }
    Ok(())
}

pub async fn open(config: &CoachConfig, problem: &str, language: Option<String>) -> Result<()> {
    let session = build_session(config)?;
    let active = open_with_language(&session, problem, language).await?;
    print_summary(&active);
    println!("\n{}", active.code());
    session.shutdown().await;
    Ok(())
}

pub async fn edit(
    config: &CoachConfig,
    problem: &str,
    text: Option<String>,
    file: Option<PathBuf>,
    language: Option<String>,
) -> Result<()> {
    let code = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => return Err(anyhow!("Provide the code as an argument or with --file")),
    };

    let session = build_session(config)?;
    let active = open_with_language(&session, problem, language).await?;
    let bytes = code.len();
    session.edit(code).await?;
    session.shutdown().await;

    println!(
        "Saved {} bytes of {} for '{}'",
        bytes,
        active.language(),
        active.problem_id()
    );
    Ok(())
}

pub async fn show(config: &CoachConfig, problem: &str) -> Result<()> {
    let session = build_session(config)?;
    let active = open_with_language(&session, problem, None).await?;
    print_summary(&active);
    println!("\n--- code ---\n{}", active.code());
    println!("\n--- conversation ---");
    for turn in active.transcript().turns() {
        let who = match turn.author {
            Author::User => "you",
            Author::Assistant => "mentor",
        };
        println!("{:>6}: {}", who, turn.text);
    }
    session.shutdown().await;
    Ok(())
}

pub async fn ask(
    config: &CoachConfig,
    problem: &str,
    action: &str,
    message: Option<String>,
    skill: Option<String>,
) -> Result<()> {
    let action: GatewayAction = action.parse().map_err(|e: String| anyhow!(e))?;
    let skill: Option<SkillLevel> = skill
        .map(|level| level.parse::<SkillLevel>().map_err(|e: String| anyhow!(e)))
        .transpose()?;

    let session = build_session(config)?;
    open_with_language(&session, problem, None).await?;
    if let Some(level) = skill {
        session.set_skill_level(level).await;
    }
    let reply = session.ask(action, message).await?;
    session.shutdown().await;

    println!("{}", reply.turn.text);
    if let Some(verdict) = reply.verdict {
        let outcome = if verdict.passed { "PASS" } else { "FAIL" };
        println!("\nResult: {}", outcome);
    }
    Ok(())
}

pub async fn clear_chat(config: &CoachConfig, problem: &str) -> Result<()> {
    let session = build_session(config)?;
    let active = open_with_language(&session, problem, None).await?;
    session.clear_chat().await?;
    session.shutdown().await;
    println!("Cleared conversation of '{}'", active.problem_id());
    Ok(())
}

pub async fn clear_code(config: &CoachConfig, problem: &str) -> Result<()> {
    let session = build_session(config)?;
    let active = open_with_language(&session, problem, None).await?;
    session.clear_code().await?;
    session.shutdown().await;
    println!(
        "Reset {} code of '{}' to the starter template",
        active.language(),
        active.problem_id()
    );
    Ok(())
}
