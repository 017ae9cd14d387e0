use std::env;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use log::info;

use flow_runtime::{FlowBundle, FlowSession, Language};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let bundle = FlowBundle::open(&options.path)
        .with_context(|| format!("failed to open flow bundle {}", options.path))?;
    let languages = bundle.available_languages();
    let mut session = FlowSession::from_bundle(bundle).context("failed to load flow")?;

    println!(
        "Loaded flow with {} screens ({} languages)",
        session.navigator().len(),
        languages.len()
    );
    for screen in session.navigator().screens().iter() {
        println!(" - {}", screen.name);
    }

    if let Some(language) = options.language {
        apply_step(&mut session, Step::Language(language));
    }
    for step in options.steps {
        apply_step(&mut session, step);
    }

    println!("Final flow state:");
    println!("{}", session.snapshot());
    Ok(())
}

fn apply_step(session: &mut FlowSession, step: Step) {
    let outcome = match step {
        Step::Next => moved(session.next()),
        Step::Previous => moved(session.previous()),
        Step::End => {
            session.screen_ended();
            "ended".to_string()
        }
        Step::Language(language) => match session.select_language(language) {
            Ok(summary) => format!(
                "{} ({}/{} translated)",
                summary.language, summary.translated, summary.visited
            ),
            Err(err) => format!("{language} (kept previous translations: {err})"),
        },
        Step::Wait(elapsed) => format!("{} task(s) ran", session.advance(elapsed)),
    };
    let screen = &session.navigator().current_screen().name;
    info!("{step} -> {screen}");
    println!("{step}: {outcome} [{screen}]");
}

fn moved(changed: bool) -> String {
    let outcome = if changed { "moved" } else { "stayed" };
    outcome.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    Next,
    Previous,
    End,
    Language(Language),
    Wait(Duration),
}

impl Step {
    fn parse(token: &str) -> Result<Self> {
        let token = token.trim();
        if let Some(name) = token.strip_prefix("lang:") {
            return Language::from_name(name)
                .map(Step::Language)
                .ok_or_else(|| anyhow!("Unknown language in step {token:?}"));
        }
        if let Some(seconds) = token.strip_prefix("wait:") {
            let seconds: f64 = seconds
                .parse()
                .with_context(|| format!("Invalid wait duration in step {token:?}"))?;
            return Duration::try_from_secs_f64(seconds)
                .map(Step::Wait)
                .with_context(|| format!("Invalid wait duration in step {token:?}"));
        }
        match token {
            "next" => Ok(Step::Next),
            "prev" | "previous" => Ok(Step::Previous),
            "end" => Ok(Step::End),
            other => Err(anyhow!(
                "Unknown step: {other}. Expected next, prev, end, lang:<name> or wait:<seconds>"
            )),
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Next => f.write_str("next"),
            Step::Previous => f.write_str("prev"),
            Step::End => f.write_str("end"),
            Step::Language(language) => write!(f, "lang:{language}"),
            Step::Wait(elapsed) => write!(f, "wait:{}", elapsed.as_secs_f64()),
        }
    }
}

struct CliOptions {
    path: String,
    language: Option<Language>,
    steps: Vec<Step>,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let Some(path) = args.next() else {
            return Err(anyhow!(
                "Usage: flow-runtime <bundle-dir> [--language <name>] [--steps next,prev,end,...]"
            ));
        };
        let mut language = None;
        let mut steps = Vec::new();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--language" => {
                    let name = args
                        .next()
                        .ok_or_else(|| anyhow!("--language expects a value"))?;
                    language = Some(
                        Language::from_name(&name)
                            .ok_or_else(|| anyhow!("Unknown language: {name}"))?,
                    );
                }
                "--steps" => {
                    let list = args
                        .next()
                        .ok_or_else(|| anyhow!("--steps expects a value"))?;
                    for token in list.split(',').filter(|t| !t.trim().is_empty()) {
                        steps.push(Step::parse(token)?);
                    }
                }
                other => {
                    return Err(anyhow!(
                        "Unknown argument: {other}. Expected --language or --steps"
                    ));
                }
            }
        }
        Ok(Self {
            path,
            language,
            steps,
        })
    }
}
