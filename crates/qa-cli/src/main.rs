mod logging;
mod presenter;
mod prompt;
mod replay;

use clap::{Parser, Subcommand};
use presenter::{AnswerFormat, Verbosity};
use prompt::{Console, TerminalQuestion};
use qa_form::{AskOptions, DEFAULT_INTERRUPT_MESSAGE, FormSpec, Question};
use replay::RecordedQuestion;
use serde_json::Value;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Ask conditional QA forms in a terminal",
    long_about = "Runs form files whose questions can be skipped based on earlier answers, and checks those files"
)]
struct Cli {
    /// Show question descriptions, parse expectations and debug logs.
    #[arg(long, global = true, alias = "debug")]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask every question of a form interactively.
    ///
    /// Ctrl-D cancels at once. After Ctrl-C, press Enter to cancel.
    Ask {
        /// Path to the form JSON file.
        #[arg(long, value_name = "SPEC")]
        spec: PathBuf,
        /// Encoding of the printed answers.
        #[arg(long, value_enum, default_value_t = AnswerFormat::Json)]
        format: AnswerFormat,
        /// Message printed when the form is cancelled.
        #[arg(
            long,
            env = "QA_FORM_INTERRUPT_MESSAGE",
            default_value = DEFAULT_INTERRUPT_MESSAGE
        )]
        interrupt_message: String,
    },
    /// Resolve a form non-interactively from recorded answers.
    Replay {
        /// Path to the form JSON file.
        #[arg(long, value_name = "SPEC")]
        spec: PathBuf,
        /// JSON object mapping question ids to answers.
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
        /// Encoding of the printed answers.
        #[arg(long, value_enum, default_value_t = AnswerFormat::Json)]
        format: AnswerFormat,
    },
    /// Report structural problems in a form file.
    Check {
        /// Path to the form JSON file.
        #[arg(long, value_name = "SPEC")]
        spec: PathBuf,
    },
    /// Print the JSON schema of the form file format.
    Schema,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    logging::init(cli.verbose);
    let verbosity = Verbosity::from_verbose(cli.verbose);
    match cli.command {
        Command::Ask {
            spec,
            format,
            interrupt_message,
        } => run_ask(&spec, format, interrupt_message, verbosity),
        Command::Replay {
            spec,
            answers,
            format,
        } => run_replay(&spec, &answers, format),
        Command::Check { spec } => run_check(&spec),
        Command::Schema => run_schema(),
    }
}

fn load_spec(path: &Path) -> CliResult<FormSpec> {
    let contents = fs::read_to_string(path)?;
    let spec = FormSpec::from_json(&contents)
        .map_err(|err| format!("invalid form file {}: {}", path.display(), err))?;
    debug!(form = %spec.id, questions = spec.questions.len(), "loaded form spec");
    Ok(spec)
}

/// Refuses forms whose questions could never be answered.
fn ensure_answerable(spec: &FormSpec) -> CliResult<()> {
    let issues = spec.check();
    if issues.is_empty() {
        return Ok(());
    }
    let listed = issues
        .iter()
        .map(|issue| format!("{} - {}", issue.question_id, issue.message))
        .collect::<Vec<_>>()
        .join("; ");
    Err(format!("form '{}' has {} issue(s): {}", spec.id, issues.len(), listed).into())
}

fn run_ask(
    spec_path: &Path,
    format: AnswerFormat,
    interrupt_message: String,
    verbosity: Verbosity,
) -> CliResult<()> {
    let spec = load_spec(spec_path)?;
    ensure_answerable(&spec)?;

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    let handler = move || {
        if !flag.swap(true, Ordering::SeqCst) {
            eprintln!("\n(press Enter to cancel)");
        }
    };
    if let Err(err) = ctrlc::set_handler(handler) {
        debug!(error = %err, "ctrl-c handler unavailable");
    }

    let console = Console::new(
        Box::new(io::stdin().lock()),
        Box::new(io::stdout()),
        interrupted,
        verbosity,
    );
    presenter::show_header(console.borrow_mut().output(), &spec)?;

    let mut form = spec.build_form(|question| -> Box<dyn Question> {
        Box::new(TerminalQuestion::new(question.clone(), Rc::clone(&console)))
    });
    let answers = form.ask(&AskOptions::with_interrupt_message(interrupt_message))?;
    if answers.is_empty() && !spec.questions.is_empty() {
        info!(form = %spec.id, "form cancelled");
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    presenter::show_answers(&mut out, &answers, format)?;
    out.flush()?;
    Ok(())
}

fn run_replay(spec_path: &Path, answers_path: &Path, format: AnswerFormat) -> CliResult<()> {
    let spec = load_spec(spec_path)?;
    ensure_answerable(&spec)?;
    let contents = fs::read_to_string(answers_path)?;
    let recorded = match serde_json::from_str::<Value>(&contents)? {
        Value::Object(map) => map,
        _ => return Err("answers file must contain a JSON object".into()),
    };

    let mut form = spec.build_form(|question| -> Box<dyn Question> {
        Box::new(RecordedQuestion::new(question.clone(), &recorded))
    });
    let resolution = form.resolve()?;
    debug!(form = %spec.id, passes = resolution.passes, "replay resolved");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    presenter::show_answers(&mut out, &resolution.answers, format)?;
    Ok(())
}

fn run_check(spec_path: &Path) -> CliResult<()> {
    let spec = load_spec(spec_path)?;
    let issues = spec.check();
    if issues.is_empty() {
        println!("Form '{}' is valid ({} questions)", spec.id, spec.questions.len());
        return Ok(());
    }

    println!("Issues:");
    for issue in &issues {
        println!("  {} - {}", issue.question_id, issue.message);
    }
    Err(format!("form '{}' has {} issue(s)", spec.id, issues.len()).into())
}

fn run_schema() -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(&FormSpec::json_schema())?);
    Ok(())
}
