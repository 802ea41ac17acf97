use std::fmt;
use std::io::BufRead;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use url::Url;

use gateway::{HttpGateway, InMemoryGateway, TestGateway};
use quiz_core::Clock;
use quiz_core::model::{
    Answer, AnswerId, Question, QuestionId, ScoreReport, TestId, TimerConfig,
};
use quiz_core::time::format_clock;
use services::{
    QuestionMarker, Session, SessionController, SessionRunner, Step, TimerDisplay, TimerEvent,
};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidServerUrl { raw: String },
    InvalidTestId { raw: String },
    InvalidTimer { raw: String },
    MissingServer,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidServerUrl { raw } => write!(f, "invalid --server value: {raw}"),
            ArgsError::InvalidTestId { raw } => write!(f, "invalid --test-id value: {raw}"),
            ArgsError::InvalidTimer { raw } => write!(f, "invalid --timer value: {raw}"),
            ArgsError::MissingServer => {
                write!(f, "either --server <url> or --offline is required")
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- --server <url> [--test-id <id>] [--timer <mode>]");
    eprintln!("  cargo run -p app -- --offline [--timer <mode>]");
    eprintln!();
    eprintln!("Timer modes:");
    eprintln!("  none               no countdown (default)");
    eprintln!("  total:<secs>       one countdown for the whole attempt");
    eprintln!("  question[:<secs>]  per-question countdown, default 60s");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  QUIZ_SERVER_URL, QUIZ_TEST_ID, QUIZ_TIMER, LOG_LEVEL");
}

struct Args {
    server: Option<Url>,
    test_id: TestId,
    timer: TimerConfig,
    offline: bool,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut server = match std::env::var("QUIZ_SERVER_URL") {
            Ok(raw) => Some(
                Url::parse(&raw).map_err(|_| ArgsError::InvalidServerUrl { raw })?,
            ),
            Err(_) => None,
        };
        let mut test_id = std::env::var("QUIZ_TEST_ID")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map_or_else(|| TestId::new(1), TestId::new);
        let mut timer = match std::env::var("QUIZ_TIMER") {
            Ok(raw) => parse_timer(&raw)?,
            Err(_) => TimerConfig::none(),
        };
        let mut offline = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--server" => {
                    let value = require_value(args, "--server")?;
                    server = Some(
                        Url::parse(&value)
                            .map_err(|_| ArgsError::InvalidServerUrl { raw: value })?,
                    );
                }
                "--test-id" => {
                    let value = require_value(args, "--test-id")?;
                    let parsed: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidTestId { raw: value.clone() })?;
                    test_id = TestId::new(parsed);
                }
                "--timer" => {
                    let value = require_value(args, "--timer")?;
                    timer = parse_timer(&value)?;
                }
                "--offline" => offline = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        if server.is_none() && !offline {
            return Err(ArgsError::MissingServer);
        }

        Ok(Self {
            server,
            test_id,
            timer,
            offline,
        })
    }
}

fn parse_timer(raw: &str) -> Result<TimerConfig, ArgsError> {
    let invalid = || ArgsError::InvalidTimer {
        raw: raw.to_string(),
    };

    match raw.split_once(':') {
        None => match raw {
            "none" => Ok(TimerConfig::none()),
            "question" => Ok(TimerConfig::per_question_default()),
            _ => Err(invalid()),
        },
        Some(("total", secs)) => {
            let secs: u32 = secs.parse().map_err(|_| invalid())?;
            TimerConfig::total(secs).map_err(|_| invalid())
        }
        Some(("question", secs)) => {
            let secs: u32 = secs.parse().map_err(|_| invalid())?;
            TimerConfig::per_question(secs).map_err(|_| invalid())
        }
        Some(_) => Err(invalid()),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new("warn,session=info,gateway=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Built-in sample test for `--offline` runs.
fn sample_gateway(test_id: TestId) -> InMemoryGateway {
    fn question(id: u64, text: &str, multiple: bool, options: &[(u64, &str)]) -> Question {
        let answers = options
            .iter()
            .map(|(aid, label)| {
                Answer::new(AnswerId::new(*aid), *label).expect("sample answer is valid")
            })
            .collect();
        Question::new(QuestionId::new(id), text, None, multiple, answers)
            .expect("sample question is valid")
    }

    let gateway = InMemoryGateway::new();
    gateway.insert_test(
        test_id,
        vec![
            question(
                1,
                "Which keyword declares an immutable binding?",
                false,
                &[(11, "let"), (12, "mut"), (13, "static")],
            ),
            question(
                2,
                "Which of these are string types? (pick all that apply)",
                true,
                &[(21, "String"), (22, "&str"), (23, "char")],
            ),
            question(
                3,
                "Which trait powers the ? operator conversion?",
                false,
                &[(31, "From"), (32, "Into"), (33, "Display")],
            ),
        ],
    );
    gateway.set_correct_answers(QuestionId::new(1), vec![AnswerId::new(11)]);
    gateway.set_correct_answers(QuestionId::new(2), vec![AnswerId::new(21), AnswerId::new(22)]);
    gateway.set_correct_answers(QuestionId::new(3), vec![AnswerId::new(31)]);
    gateway
}

//
// ─── RENDERING ─────────────────────────────────────────────────────────────────
//

fn print_question(session: &Session) {
    let question = session.current_question();
    let index = session.current_index();

    println!();
    println!(
        "Question {}/{}: {}",
        index + 1,
        session.question_count(),
        question.text()
    );
    if let Some(image) = question.image() {
        println!("  (image: {image})");
    }

    let selection = session.selection(question.id());
    for answer in question.answers() {
        let chosen = selection.is_some_and(|s| s.contains(answer.id()));
        let mark = if chosen { "x" } else { " " };
        let shape = if question.is_multiple() { "[" } else { "(" };
        let close = if question.is_multiple() { "]" } else { ")" };
        println!("  {shape}{mark}{close} {}  {}", answer.id(), answer.text());
    }

    let strip: Vec<String> = QuestionMarker::for_session(session)
        .into_iter()
        .map(|m| {
            let tag = if m.current {
                "*"
            } else if m.answered {
                "+"
            } else {
                " "
            };
            format!("[{}{tag}]", m.index + 1)
        })
        .collect();
    println!("  {}", strip.join(""));
}

fn print_report(report: &ScoreReport, elapsed_secs: u64) {
    println!();
    println!(
        "Result: {}/{} ({:.2}%) in {}",
        report.score(),
        report.total(),
        report.percentage(),
        format_clock(u32::try_from(elapsed_secs).unwrap_or(u32::MAX))
    );
}

fn print_correct_answers(answers: &[Answer]) {
    if answers.is_empty() {
        println!("  (no correct answers recorded)");
        return;
    }
    let texts: Vec<&str> = answers.iter().map(Answer::text).collect();
    println!("  correct: {}", texts.join(", "));
}

fn print_tick(display: &TimerDisplay) {
    use quiz_core::model::TimerAlert;

    match display.alert {
        TimerAlert::Danger => println!("  !! {} remaining", display.clock()),
        TimerAlert::Warning => println!("  ! {} remaining", display.clock()),
        TimerAlert::Normal => {
            if display.remaining_secs % 30 == 0 {
                println!("  {} remaining", display.clock());
            }
        }
    }
}

//
// ─── COMMANDS ──────────────────────────────────────────────────────────────────
//

enum Command {
    Next,
    Previous,
    GoTo(usize),
    Pick(AnswerId),
    Drop(AnswerId),
    Reveal,
    Show,
    Finish,
    Quit,
    Help,
}

fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let head = parts.next()?;
    match head {
        "next" | "n" => Some(Command::Next),
        "prev" | "p" => Some(Command::Previous),
        "goto" | "g" => parts
            .next()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .map(|n| Command::GoTo(n - 1)),
        "pick" | "x" => parts
            .next()
            .and_then(|v| v.parse().ok())
            .map(Command::Pick),
        "drop" | "d" => parts
            .next()
            .and_then(|v| v.parse().ok())
            .map(Command::Drop),
        "reveal" | "r" => Some(Command::Reveal),
        "show" | "s" => Some(Command::Show),
        "finish" | "f" => Some(Command::Finish),
        "quit" | "q" => Some(Command::Quit),
        "help" | "h" | "?" => Some(Command::Help),
        _ => None,
    }
}

fn print_help() {
    println!("commands:");
    println!("  pick <answer-id>   select an answer on the current question");
    println!("  drop <answer-id>   unselect an answer (multi-select only)");
    println!("  next / prev        move between questions");
    println!("  goto <n>           jump to question n");
    println!("  reveal             show the correct answer (display only)");
    println!("  show               reprint the current question");
    println!("  finish             submit the attempt");
    println!("  quit               leave without submitting");
}

//
// ─── EVENT LOOP ────────────────────────────────────────────────────────────────
//

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let gateway: Arc<dyn TestGateway> = if args.offline {
        Arc::new(sample_gateway(args.test_id))
    } else {
        let server = args.server.clone().ok_or(ArgsError::MissingServer)?;
        Arc::new(HttpGateway::new(server))
    };

    tracing::info!(
        target: "app",
        test_id = %args.test_id,
        offline = args.offline,
        "starting quiz session"
    );

    let clock = Clock::default_clock();
    let runner = SessionRunner::new(clock, gateway);
    let (mut controller, mut timer_events) =
        SessionController::start(runner, args.test_id, args.timer).await?;

    println!(
        "Loaded test {} with {} questions.",
        args.test_id,
        controller.session().question_count()
    );
    print_help();
    print_question(controller.session());

    // Stdin is read on a plain thread; lines flow into the async loop.
    let (line_tx, mut lines) = mpsc::unbounded_channel::<String>();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            maybe_event = timer_events.recv() => {
                let Some(event) = maybe_event else { continue };
                if let TimerEvent::Tick { remaining, alert } = event {
                    print_tick(&TimerDisplay::new(remaining, alert));
                }
                match controller.handle_timer_event(event).await {
                    Ok(Step::Moved { index }) => {
                        println!("  time is up, moving to question {}", index + 1);
                        print_question(controller.session());
                    }
                    Ok(Step::Finished(report)) => {
                        println!("  time is up, submitting...");
                        let elapsed = elapsed_for(&clock, controller.session());
                        print_report(&report, elapsed);
                        break;
                    }
                    Ok(Step::Stayed) => {}
                    Err(e) => eprintln!("{e} (type `finish` to retry)"),
                }
            }
            maybe_line = lines.recv() => {
                let Some(line) = maybe_line else { break };
                let Some(command) = parse_command(&line) else {
                    if !line.trim().is_empty() {
                        println!("unrecognized command; type `help`");
                    }
                    continue;
                };
                if apply_command(&mut controller, &clock, command).await? {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Apply one user command; returns true when the loop should end.
async fn apply_command(
    controller: &mut SessionController,
    clock: &Clock,
    command: Command,
) -> Result<bool, Box<dyn std::error::Error>> {
    match command {
        Command::Next => match controller.next().await {
            Ok(Step::Moved { .. }) => print_question(controller.session()),
            Ok(Step::Finished(report)) => {
                let elapsed = elapsed_for(clock, controller.session());
                print_report(&report, elapsed);
                return Ok(true);
            }
            Ok(Step::Stayed) => {}
            Err(e) => eprintln!("{e} (type `finish` to retry)"),
        },
        Command::Previous => {
            if let Step::Moved { .. } = controller.previous() {
                print_question(controller.session());
            }
        }
        Command::GoTo(index) => match controller.go_to(index) {
            Step::Moved { .. } => print_question(controller.session()),
            _ => println!("no question {}", index + 1),
        },
        Command::Pick(answer_id) => {
            toggle(controller, answer_id, true);
        }
        Command::Drop(answer_id) => {
            toggle(controller, answer_id, false);
        }
        Command::Reveal => {
            let question_id = controller.session().current_question().id();
            match controller.reveal_correct_answers(question_id).await {
                Ok(answers) => print_correct_answers(&answers),
                Err(e) => eprintln!("{e}"),
            }
        }
        Command::Show => print_question(controller.session()),
        Command::Finish => match controller.finish().await {
            Ok(report) => {
                let elapsed = elapsed_for(clock, controller.session());
                print_report(&report, elapsed);
                return Ok(true);
            }
            Err(e) => eprintln!("{e} (type `finish` to retry)"),
        },
        Command::Quit => return Ok(true),
        Command::Help => print_help(),
    }
    Ok(false)
}

fn toggle(controller: &mut SessionController, answer_id: AnswerId, checked: bool) {
    let question_id = controller.session().current_question().id();
    match controller.select_answer(question_id, answer_id, checked) {
        Ok(()) => print_question(controller.session()),
        Err(e) => eprintln!("{e}"),
    }
}

fn elapsed_for(clock: &Clock, session: &Session) -> u64 {
    let end = session.completed_at().unwrap_or_else(|| clock.now());
    quiz_core::time::elapsed_seconds(session.started_at(), end)
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
