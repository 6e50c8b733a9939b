use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use client::{ClientConfig, HttpBackend, TestBackend};
use quiz_core::Clock;
use quiz_core::model::TestId;
use services::{
    DotState, Notice, NoticeLevel, QuestionBody, SessionController, SessionEvent, SessionPhase,
    Urgency,
};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidTestId { raw: String },
    MissingTarget,
    ConflictingTargets,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidTestId { raw } => write!(f, "invalid --test-id value: {raw}"),
            ArgsError::MissingTarget => {
                write!(f, "either --test-id or --token must be provided")
            }
            ArgsError::ConflictingTargets => {
                write!(f, "--test-id and --token are mutually exclusive")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

/// How the test to take is addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    TestId(TestId),
    ShareToken(String),
}

struct Args {
    base_url: Option<String>,
    target: Target,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- --test-id <id>   [--base-url <url>]");
    eprintln!("  cargo run -p app -- --token <token>  [--base-url <url>]");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_API_BASE_URL, QUIZ_API_TOKEN, QUIZ_TEST_ID, QUIZ_SHARE_TOKEN");
    eprintln!();
    eprintln!("Commands while taking a test:");
    eprintln!("  next | prev | jump <n>     navigate (questions are numbered from 1)");
    eprintln!("  pick <n> | toggle <n>      answer choice questions");
    eprintln!("  type <text>                answer free-text questions");
    eprintln!("  finish | yes | no          finish the test / confirm / cancel");
    eprintln!("  quit                       leave without finishing");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut base_url = None;
        let mut test_id = std::env::var("QUIZ_TEST_ID")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map(TestId::new);
        let mut token = std::env::var("QUIZ_SHARE_TOKEN").ok();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--base-url" => {
                    base_url = Some(require_value(args, "--base-url")?);
                }
                "--test-id" => {
                    let value = require_value(args, "--test-id")?;
                    let parsed: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidTestId { raw: value.clone() })?;
                    test_id = Some(TestId::new(parsed));
                    token = None;
                }
                "--token" => {
                    token = Some(require_value(args, "--token")?);
                    test_id = None;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let target = match (test_id, token) {
            (Some(id), None) => Target::TestId(id),
            (None, Some(token)) => Target::ShareToken(token),
            (None, None) => return Err(ArgsError::MissingTarget),
            (Some(_), Some(_)) => return Err(ArgsError::ConflictingTargets),
        };

        Ok(Self { base_url, target })
    }
}

/// One line of user input, mapped onto the session vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Event(SessionEvent),
    Quit,
    Help,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let mut parts = line.splitn(2, char::is_whitespace);
    let keyword = parts.next().unwrap_or("");
    let rest = parts.next().map(str::trim).unwrap_or("");

    let number = || rest.parse::<usize>().ok();
    match keyword {
        "next" | "n" => Command::Event(SessionEvent::Next),
        "prev" | "p" => Command::Event(SessionEvent::Previous),
        "jump" | "j" => match number() {
            Some(n) if n >= 1 => Command::Event(SessionEvent::Jump(n - 1)),
            _ => Command::Unknown(line.to_string()),
        },
        "pick" => match number() {
            Some(n) if n >= 1 => Command::Event(SessionEvent::SelectOption(n - 1)),
            _ => Command::Unknown(line.to_string()),
        },
        "toggle" => match number() {
            Some(n) if n >= 1 => Command::Event(SessionEvent::ToggleOption(n - 1)),
            _ => Command::Unknown(line.to_string()),
        },
        "type" => Command::Event(SessionEvent::InputText(rest.to_string())),
        "finish" => Command::Event(SessionEvent::FinishRequested),
        "yes" | "y" => Command::Event(SessionEvent::ConfirmFinish),
        "no" => Command::Event(SessionEvent::CancelFinish),
        "quit" | "exit" | "q" => Command::Quit,
        "help" | "?" => Command::Help,
        _ => Command::Unknown(line.to_string()),
    }
}

fn print_notice(notice: &Notice) {
    let tag = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Error => "error",
    };
    println!("[{tag}] {}", notice.message);
}

fn render(controller: &SessionController) {
    let view = controller.view();

    let marker = match view.timer.urgency {
        Urgency::Calm => "",
        Urgency::Warning => " !",
        Urgency::Critical => " !!",
    };
    println!();
    println!("=== {} ===", view.title);
    println!(
        "Question {}/{}   time {}{marker}",
        view.progress.current, view.progress.total, view.timer.text
    );
    println!("{}", view.question_text);

    match &view.body {
        QuestionBody::Choices { multiple, options } => {
            for (index, option) in options.iter().enumerate() {
                let mark = if option.selected { "x" } else { " " };
                println!("  {}) [{mark}] {}", index + 1, option.label);
            }
            if *multiple {
                println!("(toggle <n> to select several)");
            }
        }
        QuestionBody::TextEntry { value } => {
            if value.is_empty() {
                println!("  (type <text> to answer)");
            } else {
                println!("  current answer: {value}");
            }
        }
    }

    let dots: String = view
        .dots
        .iter()
        .map(|dot| match dot {
            DotState::Active => '>',
            DotState::Answered => 'x',
            DotState::Unanswered => '.',
        })
        .collect();
    println!("[{dots}]");

    if view.phase == SessionPhase::ConfirmingFinish {
        println!("Finish the test? You cannot change answers afterwards. (yes/no)");
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|err| {
        eprintln!("{err}");
        print_usage();
        err
    })?;

    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = &args.base_url {
        config = ClientConfig::new(base_url, config.bearer_token.clone())?;
    }
    info!(base_url = %config.base_url, "connecting");

    let backend: Arc<dyn TestBackend> = Arc::new(HttpBackend::new(config));
    let clock = Clock::default_clock();

    let started = match &args.target {
        Target::TestId(id) => SessionController::start_by_test_id(backend, clock, *id).await,
        Target::ShareToken(token) => {
            SessionController::start_by_share_token(backend, clock, token).await
        }
    };
    let mut controller = match started {
        Ok(controller) => controller,
        Err(err) => {
            // Fatal path: notify and fall back to the dashboard.
            eprintln!("[error] {err}");
            eprintln!("Returning to the dashboard.");
            return Err(err.into());
        }
    };

    render(&controller);

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    ticker.tick().await; // the first tick fires immediately

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let mut user_event = false;
        let step = tokio::select! {
            _ = ticker.tick() => controller.tick().await,
            line = lines.next_line() => {
                let Some(line) = line? else {
                    // stdin closed: leave without finishing, like navigating away.
                    return Ok(());
                };
                match parse_command(&line) {
                    Command::Quit => return Ok(()),
                    Command::Help => {
                        print_usage();
                        continue;
                    }
                    Command::Unknown(input) => {
                        if !input.is_empty() {
                            println!("unknown command: {input} (help for a list)");
                        }
                        continue;
                    }
                    Command::Event(event) => {
                        user_event = true;
                        controller.handle(event).await
                    }
                }
            }
        };

        let step = match step {
            Ok(step) => step,
            Err(err) => {
                eprintln!("[error] {err}");
                return Err(err.into());
            }
        };

        for notice in &step.notices {
            print_notice(notice);
        }
        if let Some(end) = step.end {
            println!("Your attempt is complete. Results: attempt {}", end.attempt_id);
            return Ok(());
        }
        // Redraw after user input and after expiry-driven transitions;
        // quiet ticks only move the countdown.
        if user_event || !step.notices.is_empty() {
            render(&controller);
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
