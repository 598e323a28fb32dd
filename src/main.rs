use clap::Parser;
use gel::config::{Config, WELCOME_MESSAGE};
use gel::{root_environment, RunError};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use std::process::ExitCode;

/// An embeddable Lisp-dialect interpreter.
#[derive(Parser, Debug)]
#[command(name = "gel", version = gel::config::VERSION)]
struct CliArgs {
    /// Script file to run. If omitted, starts an interactive REPL.
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Suppress the REPL welcome banner.
    #[arg(long)]
    no_banner: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = CliArgs::parse();
    let mut config = Config::default();
    config.show_banner = !args.no_banner;

    let env = root_environment();
    tracing::debug!("root environment initialized");

    match args.script {
        Some(path) => Ok(run_script(&path, &env)),
        None => {
            run_repl(&config, &env)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_script(path: &PathBuf, env: &std::rc::Rc<gel::Environment>) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            tracing::error!(?err, path = %path.display(), "failed to read script");
            eprintln!("gel: cannot read {}: {err}", path.display());
            return ExitCode::FAILURE;
        }
    };

    match gel::run(&source, env) {
        Ok(_) => ExitCode::SUCCESS,
        Err(RunError::Parse(err)) => {
            tracing::error!(%err, "parse error");
            eprintln!("gel: parse error: {err}");
            ExitCode::FAILURE
        }
        Err(RunError::Eval(err)) => {
            tracing::error!(%err, "evaluation error");
            eprintln!("gel: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_repl(config: &Config, env: &std::rc::Rc<gel::Environment>) -> anyhow::Result<()> {
    if config.show_banner {
        println!("{WELCOME_MESSAGE}");
    }

    let mut editor = DefaultEditor::new()?;
    let _ = editor.load_history(&config.history_file);

    loop {
        match editor.readline(&config.prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(&line);
                match gel::run(&line, env) {
                    Ok(value) => println!("{}", value.repr()),
                    Err(RunError::Parse(err)) => {
                        tracing::warn!(%err, "repl parse error");
                        eprintln!("parse error: {err}");
                    }
                    Err(RunError::Eval(err)) => {
                        tracing::warn!(%err, "repl evaluation error");
                        eprintln!("{err}");
                    }
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                tracing::error!(?err, "readline error");
                break;
            }
        }
    }

    let _ = editor.save_history(&config.history_file);
    Ok(())
}
