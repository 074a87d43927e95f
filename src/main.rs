use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use ucalearn_client::{
    chat::{thinking_delay, ChatMessage, ChatRole, Conversation, SUGGESTIONS},
    config::{get_config, init_config, Config},
    models::Id,
    session::{NavDot, QuizSession, SessionCommand, SessionRunner, SessionStatus, SessionView},
    utils::time::format_clock,
    AppState,
};

const USAGE: &str = "usage: ucalearn-client quiz <quiz-id> | ucalearn-client chat";
const QUIZ_HELP: &str = "commands: a-d select, n next, p previous, g <n> jump, s submit, r restart, q quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    init_config()?;
    let config = get_config()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [command, quiz_id] if command == "quiz" => run_quiz(config, quiz_id).await,
        [command] if command == "chat" => run_chat(config).await,
        _ => anyhow::bail!(USAGE),
    }
}

async fn signed_in_state(config: &Config) -> anyhow::Result<AppState> {
    let mut state = AppState::new(config)?;
    if let (Some(email), Some(password)) = (&config.email, &config.password) {
        let context = state.sign_in(email, password).await?;
        if let Some(user) = context.user() {
            info!(user = %user.display_name(), landing = context.landing_path(), "signed in");
        }
    }
    Ok(state)
}

async fn run_quiz(config: &Config, quiz_id: &str) -> anyhow::Result<()> {
    let state = signed_in_state(config).await?;
    if !state.context.is_authenticated() {
        anyhow::bail!("set UCALEARN_EMAIL and UCALEARN_PASSWORD to take a quiz");
    }

    let session = QuizSession::new(Id::from(quiz_id), &state.context);
    let handle = SessionRunner::new(
        Arc::new(state.quiz_service.clone()),
        session,
        config.tick_period(),
    )
    .spawn();

    println!("{}", QUIZ_HELP);
    let mut views = handle.views();
    let mut last = views.borrow_and_update().clone();
    render(&last);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                if without_timer(&view) == without_timer(&last) {
                    if view.status == SessionStatus::Active {
                        println!("⏱ {}", view.timer);
                    }
                } else {
                    render(&view);
                }
                let failed = view.status == SessionStatus::LoadFailed;
                last = view;
                if failed {
                    break;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<SessionCommand>() {
                    Ok(SessionCommand::Close) => break,
                    Ok(command) => handle.send(command).await?,
                    Err(reason) => println!("{}\n{}", reason, QUIZ_HELP),
                }
            }
        }
    }

    let session = handle.close().await?;
    info!(
        quiz_id = %session.quiz_id(),
        submissions = session.submissions_sent(),
        "quiz session ended"
    );
    Ok(())
}

fn without_timer(view: &SessionView) -> SessionView {
    SessionView {
        timer: String::new(),
        ..view.clone()
    }
}

fn render(view: &SessionView) {
    println!();
    match view.status {
        SessionStatus::Loading => println!("Loading quiz..."),
        SessionStatus::LoadFailed | SessionStatus::Closed => {}
        SessionStatus::Completed => {
            if let Some(result) = &view.result {
                println!("{}  {}", result.headline, result.score);
                println!("{}", result.message);
                println!("{}", result.summary);
                println!("r to retake, q to leave");
            }
        }
        _ => {
            if let Some(title) = &view.title {
                println!("{}", title);
            }
            println!("{}  [{}%]  ⏱ {}", view.header, view.progress_percent, view.timer);
            if let Some(text) = &view.question_text {
                println!("{}", text);
            }
            for option in &view.options {
                let marker = if option.selected { "●" } else { "○" };
                println!("  {} {}. {}", marker, option.letter, option.text);
            }
            let dots: String = view
                .dots
                .iter()
                .map(|dot| match dot {
                    NavDot::Current => '◉',
                    NavDot::Answered => '●',
                    NavDot::Unanswered => '○',
                })
                .collect();
            println!("{}", dots);
            if view.status == SessionStatus::Submitting {
                println!("Submitting...");
            } else if view.shows_submit {
                println!("s to submit");
            }
        }
    }
    if let Some(error) = &view.error {
        println!("! {}", error);
    }
}

async fn run_chat(config: &Config) -> anyhow::Result<()> {
    let state = match signed_in_state(config).await {
        Ok(state) => state,
        Err(err) => {
            warn!(error = %err, "continuing chat without signing in");
            AppState::new(config)?
        }
    };

    let mut conversation = Conversation::for_context(&state.context);
    for message in conversation.history() {
        print_message(message);
    }
    if conversation.shows_suggestions() {
        println!("Try: {}", SUGGESTIONS.join(" | "));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text == "/quit" {
            break;
        }
        if text.is_empty() {
            continue;
        }
        tokio::time::sleep(thinking_delay()).await;
        if let Some(reply) = conversation.send(text) {
            print_message(reply);
        }
    }
    Ok(())
}

fn print_message(message: &ChatMessage) {
    let who = match message.role {
        ChatRole::Bot => "UcaBot",
        ChatRole::User => "You",
    };
    println!("[{}] {}: {}", format_clock(message.sent_at), who, message.text);
}
