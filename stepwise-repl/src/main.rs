mod error;

use error::Error;
use rustyline::{error::ReadlineError, DefaultEditor};
use std::{io::{self, BufRead, IsTerminal}, sync::Arc};
use stepwise_engine::{
    candidate::Readiness,
    ctxt::StepContext,
    decision::Policy,
    history::StepHistory,
    orchestrator::{candidates_for, step, undo, StepRequest, StepStatus},
    registry::Registry,
    selection::Selection,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const HELP: &str = "\
commands:
  <expression>        set the current expression
  step [@path | #n]   take one step, optionally at a path or the nth operator
  candidates [...]    list the candidates for a selection, without stepping
  undo                undo the last step
  history             show the steps taken so far
  sets                list the invariant sets
  use [set ...]       restrict matching to the given sets (none for all)
  trace               show recent step summaries
  help                show this message";

/// The state of one interactive session.
struct Session {
    ctxt: StepContext,
    history: StepHistory,
    expression: Option<String>,
    set_ids: Vec<String>,
}

impl Session {
    fn new(registry: Arc<Registry>) -> Self {
        Self {
            ctxt: StepContext::new(registry),
            history: StepHistory::new(),
            expression: None,
            set_ids: Vec::new(),
        }
    }

    fn request(&self, expression: &str, selection: &str, policy: Policy) -> StepRequest {
        StepRequest::new(expression)
            .with_selection(parse_selection(selection))
            .with_sets(self.set_ids.iter().cloned())
            .with_policy(policy)
    }

    /// Runs one line of input.
    fn run(&mut self, line: &str) -> Result<(), Error> {
        let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        match command {
            "help" => println!("{}", HELP),
            "sets" => {
                for set in self.ctxt.registry.sets() {
                    println!("{} ({} rules, v{}): {}", set.id, set.rules.len(), set.version, set.name);
                }
            },
            "use" => {
                self.set_ids = rest.split_whitespace().map(String::from).collect();
                // surface unknown ids right away
                self.ctxt.registry.rules_for(&self.set_ids)?;
            },
            "step" => self.step(rest)?,
            "candidates" => self.candidates(rest)?,
            "undo" => {
                let (history, before) = undo(&self.history);
                self.history = history;
                match before {
                    Some(before) => {
                        println!("{}", before);
                        self.expression = Some(before);
                    },
                    None => println!("nothing to undo"),
                }
            },
            "history" => {
                for (i, entry) in self.history.entries().iter().enumerate() {
                    let after = match (&entry.expression_after, entry.error_code) {
                        (Some(after), _) => after.clone(),
                        (None, Some(code)) => format!("<{}>", code),
                        (None, None) => "<pending>".to_string(),
                    };
                    println!("{:>3}. {} => {}", i + 1, entry.expression_before, after);
                }
            },
            "trace" => {
                for entry in self.ctxt.trace.iter() {
                    println!(
                        "{:?} {} {}",
                        entry.status,
                        entry.expression,
                        entry.candidate_id.as_deref().unwrap_or("-"),
                    );
                }
            },
            _ => {
                stepwise_parser::parse(line)?;
                self.expression = Some(line.to_string());
                self.history = StepHistory::new();
            },
        }

        Ok(())
    }

    fn current(&self) -> Result<&str, Error> {
        self.expression
            .as_deref()
            .ok_or(Error::Usage("no expression; type one first"))
    }

    fn step(&mut self, selection: &str) -> Result<(), Error> {
        let expression = self.current()?.to_string();
        let request = self.request(&expression, selection, Policy::student());
        let outcome = step(&mut self.ctxt, &request, std::mem::take(&mut self.history));
        self.history = outcome.history;

        let response = outcome.response;
        let label = response.chosen_candidate
            .as_ref()
            .map_or("", |candidate| candidate.description.as_str());
        match (response.status, response.new_expression_text) {
            (StepStatus::StepApplied, Some(next)) => {
                println!("{}    ({})", next, label);
                self.expression = Some(next);
            },
            (status, _) => {
                let code = response.error_code.map_or("", |code| code.as_str());
                let message = response.message.unwrap_or_default();
                println!("{:?}: {} {}", status, code, message);
            },
        }
        Ok(())
    }

    fn candidates(&self, selection: &str) -> Result<(), Error> {
        let expression = self.current()?;
        let request = self.request(expression, selection, Policy::teacher_debug());
        let (_, candidates) = candidates_for(&self.ctxt, &request)?;
        if candidates.is_empty() {
            println!("no candidates");
        }
        for candidate in candidates {
            let readiness = match &candidate.readiness {
                Readiness::Ready => "ready".to_string(),
                Readiness::Blocked { reason } => format!("blocked: {}", reason),
            };
            println!("{}  [{}]", candidate.id, readiness);
        }
        Ok(())
    }
}

/// Parses `@path` or `#n` into a selection. Anything else selects nothing.
fn parse_selection(text: &str) -> Selection {
    if let Some(path) = text.strip_prefix('@') {
        Selection::path(path)
    } else if let Some(n) = text.strip_prefix('#').and_then(|n| n.parse().ok()) {
        Selection::operator(n)
    } else {
        Selection::default()
    }
}

/// Loads the registry from the given model file, or the built-in one.
fn load_registry(path: Option<String>) -> Result<Arc<Registry>, Error> {
    let Some(path) = path else {
        return Ok(Registry::builtin());
    };

    let text = std::fs::read_to_string(&path)
        .map_err(|err| Error::ModelError(format!("cannot read {}: {}", path, err)))?;
    let registry = Registry::from_json(&text)?;
    info!(%path, sets = registry.sets().len(), "loaded model");
    Ok(Arc::new(registry))
}

fn process(session: &mut Session, input: &str) {
    let input = input.trim();
    if input.is_empty() {
        return;
    }

    if let Err(err) = session.run(input) {
        err.report_to_stderr(input);
    }
}

fn main() {
    let filter = EnvFilter::try_from_env("STEPWISE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut args = std::env::args();
    args.next();

    let registry = match load_registry(args.next()) {
        Ok(registry) => registry,
        Err(err) => {
            err.report_to_stderr("");
            std::process::exit(1);
        },
    };
    let mut session = Session::new(registry);

    if !io::stdin().is_terminal() {
        // run commands from stdin, one per line
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => process(&mut session, &line),
                Err(err) => {
                    eprintln!("{}", err);
                    break;
                },
            }
        }
        return;
    }

    // run the repl / interactive mode
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        },
    };

    fn process_line(rl: &mut DefaultEditor, session: &mut Session) -> Result<(), ReadlineError> {
        let input = rl.readline("> ")?;
        if input.trim().is_empty() {
            return Ok(());
        }

        rl.add_history_entry(&input)?;

        process(session, &input);
        Ok(())
    }

    loop {
        if let Err(err) = process_line(&mut rl, &mut session) {
            match err {
                ReadlineError::Eof | ReadlineError::Interrupted => (),
                _ => eprintln!("{}", err),
            }
            break;
        }
    }
}
