use std::fmt;
use std::path::PathBuf;

use quiz_core::model::{ModuleProgress, Question, QuizSettings};
use services::{
    Advance, AppServices, BankSource, Clock, QuizService, RemoteBankConfig, SessionProgress,
    SessionResult,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingModule,
    UnknownArg(String),
    InvalidCount { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingModule => write!(f, "play requires a module name"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidCount { raw } => write!(f, "invalid --count value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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
    eprintln!("  cargo run -p app -- modules  [--db <sqlite_url>] [--bank <dir>]");
    eprintln!("  cargo run -p app -- play <module> [--count <n>] [--db <sqlite_url>] [--bank <dir>]");
    eprintln!("  cargo run -p app -- progress [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://quiz.sqlite3");
    eprintln!("  --bank data");
    eprintln!("  --count 20 (clamped to 5..=50)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_BANK_DIR, QUIZ_BANK_URL, QUIZ_QUESTION_COUNT, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Modules,
    Play { module: String },
    Progress,
}

struct Args {
    db_url: String,
    bank_dir: PathBuf,
    count: Option<u32>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://quiz.sqlite3".into(), normalize_sqlite_url);
        let mut bank_dir = std::env::var("QUIZ_BANK_DIR")
            .ok()
            .map_or_else(|| PathBuf::from("data"), PathBuf::from);
        let mut count = std::env::var("QUIZ_QUESTION_COUNT")
            .ok()
            .and_then(|value| value.trim().parse::<u32>().ok());

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--bank" => {
                    bank_dir = PathBuf::from(require_value(args, "--bank")?);
                }
                "--count" => {
                    let value = require_value(args, "--count")?;
                    let parsed: u32 = value
                        .trim()
                        .parse()
                        .map_err(|_| ArgsError::InvalidCount { raw: value.clone() })?;
                    count = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            bank_dir,
            count,
        })
    }
}

fn parse_command(argv: &mut Vec<String>) -> Result<Command, ArgsError> {
    let first = argv.first().cloned();
    let cmd = match first.as_deref() {
        None => return Ok(Command::Modules),
        Some(first) if first.starts_with("--") => return Ok(Command::Modules),
        Some("modules") => Command::Modules,
        Some("progress") => Command::Progress,
        Some("play") => {
            let module = argv
                .get(1)
                .filter(|value| !value.starts_with("--"))
                .cloned()
                .ok_or(ArgsError::MissingModule)?;
            argv.remove(1);
            Command::Play { module }
        }
        Some(other) => return Err(ArgsError::UnknownArg(other.to_owned())),
    };
    argv.remove(0);
    Ok(cmd)
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn describe_source(source: &BankSource) -> String {
    match source {
        BankSource::Dir(dir) => format!("dir:{}", dir.display()),
        BankSource::Remote(config) => format!("url:{}", config.base_url()),
    }
}

fn format_progress(progress: Option<&ModuleProgress>) -> String {
    let Some(progress) = progress else {
        return "not attempted".into();
    };
    let last = progress
        .last_score()
        .map_or_else(|| "-".into(), |s| s.to_string());
    let avg = progress
        .avg_score()
        .map_or_else(|| "-".into(), |s| s.to_string());
    format!(
        "last {last}, average {avg}, {} questions answered",
        progress.total_questions_ever()
    )
}

async fn list_modules(services: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let modules = services.list_modules().await?;
    if modules.is_empty() {
        println!("No modules in the question bank.");
    }
    for entry in modules {
        println!(
            "{:<28} {:>4} questions  {}",
            entry.info.name,
            entry.info.question_count,
            format_progress(entry.progress.as_ref())
        );
    }
    Ok(())
}

async fn show_progress(services: &AppServices) {
    let all = services.progress().all().await;
    if all.is_empty() {
        println!("No progress recorded yet.");
        return;
    }
    for (module, progress) in &all {
        let history: Vec<String> = progress.history().iter().map(ToString::to_string).collect();
        println!("{module}: {}", format_progress(Some(progress)));
        println!("  history: {}", history.join(" "));
    }
}

fn question_header(question: &Question, progress: &SessionProgress) -> String {
    format!(
        "[{}/{} {}%] {} · {} · {}  ({}/{} correct, streak {})",
        progress.position,
        progress.total,
        progress.percent,
        question.module(),
        question.subtopic(),
        question.difficulty(),
        progress.correct,
        progress.answered,
        progress.streak
    )
}

fn print_question(question: &Question, progress: &SessionProgress) {
    println!();
    println!("{}", question_header(question, progress));
    println!("{}", question.prompt());
    for (i, option) in question.options().iter().enumerate() {
        println!("  {}) {option}", i + 1);
    }
}

async fn read_line(lines: &mut Lines<BufReader<Stdin>>) -> std::io::Result<Option<String>> {
    Ok(lines.next_line().await?.map(|line| line.trim().to_owned()))
}

async fn play(
    quiz: &QuizService,
    module: &str,
    count: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = quiz.start_quiz(module, count).await?;
    if snapshot.total_questions == 0 {
        println!("No questions found for module {module}.");
        quiz.reset_quiz().await;
        return Ok(());
    }
    println!(
        "{module}: {} questions. Type an option number, or q to stop.",
        snapshot.total_questions
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let Some(progress) = quiz.session_progress().await else {
            break;
        };
        let Some(question) = quiz.current_question().await else {
            break;
        };
        print_question(&question, &progress);

        let outcome = loop {
            let Some(input) = read_line(&mut lines).await? else {
                return stop(quiz).await;
            };
            if input.eq_ignore_ascii_case("q") {
                return stop(quiz).await;
            }
            let choice = input.parse::<usize>().ok().and_then(|n| n.checked_sub(1));
            match choice {
                Some(option) => match quiz.select_answer(option).await {
                    Some(outcome) => break outcome,
                    None => println!("Pick 1-{}.", question.options().len()),
                },
                None => println!("Pick 1-{}.", question.options().len()),
            }
        };

        if outcome.is_correct {
            println!("Correct!");
        } else {
            let answer = question
                .options()
                .get(outcome.correct_option)
                .map_or("", String::as_str);
            println!("Incorrect. The answer is {}) {answer}", outcome.correct_option + 1);
        }

        if progress.is_last {
            println!("Press Enter to see results.");
        } else {
            println!("Press Enter for the next question.");
        }
        if read_line(&mut lines).await?.is_none() {
            return stop(quiz).await;
        }

        match quiz.next_question().await? {
            Advance::Next { .. } | Advance::Ignored => {}
            Advance::Finished(result) => {
                if let Some(result) = result {
                    print_result(&result);
                }
                break;
            }
        }
    }
    Ok(())
}

async fn stop(quiz: &QuizService) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(result) = quiz.end_quiz().await? {
        print_result(&result);
    } else {
        println!("Stopped before answering anything; nothing recorded.");
    }
    quiz.reset_quiz().await;
    Ok(())
}

fn print_result(result: &SessionResult) {
    println!();
    println!(
        "{}: {} ({}/{} correct, {} missed, best streak {})",
        result.module,
        result.score,
        result.stats.correct_answers(),
        result.stats.total_answers(),
        result.stats.incorrect_answers(),
        result.stats.max_streak()
    );
    println!("{}", format_progress(Some(&result.progress)));
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();
    if matches!(argv.first().map(String::as_str), Some("--help" | "-h")) {
        print_usage();
        return Ok(());
    }

    let cmd = parse_command(&mut argv).map_err(|e| {
        print_usage();
        e
    })?;
    let parsed = Args::parse(&mut argv.into_iter()).map_err(|e| {
        print_usage();
        e
    })?;

    let source = match RemoteBankConfig::from_env()? {
        Some(config) => BankSource::Remote(config),
        None => BankSource::Dir(parsed.bank_dir),
    };
    let settings = QuizSettings::default();
    info!(db = %parsed.db_url, bank = %describe_source(&source), "opening quiz storage");

    prepare_sqlite_file(&parsed.db_url)?;
    let services = AppServices::new_sqlite(&parsed.db_url, source, Clock::system(), settings).await?;

    match cmd {
        Command::Modules => list_modules(&services).await,
        Command::Progress => {
            show_progress(&services).await;
            Ok(())
        }
        Command::Play { module } => {
            let count = settings.clamp_count(parsed.count.unwrap_or(settings.default_questions()));
            play(&services.quiz(), &module, count).await
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn no_arguments_lists_modules() {
        let mut args = argv(&[]);
        assert_eq!(parse_command(&mut args).unwrap(), Command::Modules);
    }

    #[test]
    fn play_takes_module_and_leaves_flags() {
        let mut args = argv(&["play", "Vida", "--count", "7"]);
        assert_eq!(
            parse_command(&mut args).unwrap(),
            Command::Play {
                module: "Vida".into()
            }
        );
        assert_eq!(args, argv(&["--count", "7"]));

        let parsed = Args::parse(&mut args.into_iter()).unwrap();
        assert_eq!(parsed.count, Some(7));
    }

    #[test]
    fn play_without_module_is_an_error() {
        let mut args = argv(&["play", "--count", "7"]);
        assert!(matches!(
            parse_command(&mut args),
            Err(ArgsError::MissingModule)
        ));
    }

    #[test]
    fn invalid_count_is_rejected() {
        let mut args = argv(&["--count", "many"]).into_iter();
        assert!(matches!(
            Args::parse(&mut args),
            Err(ArgsError::InvalidCount { .. })
        ));
    }

    #[test]
    fn header_shows_position_percent_and_score() {
        let question = Question::new(
            "Vida",
            "Temporal",
            quiz_core::model::Difficulty::Basic,
            "q",
            vec!["a".into(), "b".into()],
            0,
        )
        .unwrap();
        let progress = SessionProgress {
            position: 2,
            total: 4,
            answered: 2,
            correct: 1,
            streak: 0,
            percent: 50,
            is_last: false,
            showing_feedback: true,
        };
        assert_eq!(
            question_header(&question, &progress),
            "[2/4 50%] Vida · Temporal · Básico  (1/2 correct, streak 0)"
        );
    }

    #[test]
    fn bank_source_is_described_for_logs() {
        let dir = BankSource::Dir(PathBuf::from("data"));
        assert_eq!(describe_source(&dir), "dir:data");

        let remote = BankSource::Remote(RemoteBankConfig::new("https://example.com/bank").unwrap());
        assert_eq!(describe_source(&remote), "url:https://example.com/bank/");
    }

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:quiz.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("quiz.sqlite3"));
        assert_eq!(
            normalize_sqlite_url("sqlite::memory:".into()),
            "sqlite::memory:"
        );
    }
}
