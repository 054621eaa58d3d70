use std::borrow::Cow;
use std::path::PathBuf;

use botlisp::evaluator::special_form_identifiers;
use botlisp::{Env, Environment, TokenKind, tokenize};
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Cmd, Completer, Context, EditMode, Editor, EventHandler, KeyCode, KeyEvent, Modifiers};
use rustyline::{Helper, Highlighter, Hinter, Validator};

/// REPL settings, read from `BOTLISP_*` environment variables.
struct ReplConfig {
    history_file: PathBuf,
    edit_mode: EditMode,
    prompt: String,
}

impl ReplConfig {
    fn from_env() -> Self {
        let edit_mode = match std::env::var("BOTLISP_EDIT_MODE").ok().as_deref() {
            Some("vi") => EditMode::Vi,
            Some("emacs") | None => EditMode::Emacs,
            Some(other) => {
                log::warn!("unknown BOTLISP_EDIT_MODE {:?}, using emacs", other);
                EditMode::Emacs
            }
        };
        ReplConfig {
            history_file: std::env::var_os("BOTLISP_HISTORY")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("botlisp_history.txt")),
            edit_mode,
            prompt: std::env::var("BOTLISP_PROMPT").unwrap_or_else(|_| "botlisp> ".to_string()),
        }
    }
}

struct LispCompleter {
    env: Env,
}

impl rustyline::completion::Completer for LispCompleter {
    type Candidate = String;
    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        let candidates = match tokenize(&line[..pos]) {
            Ok(tokens) => match tokens.last().map(|t| &t.kind) {
                // Only complete a symbol the cursor is still touching.
                Some(TokenKind::Symbol(prefix)) if line[..pos].ends_with(prefix.as_str()) => self
                    .env
                    .borrow()
                    .identifiers()
                    .union(&special_form_identifiers())
                    .filter_map(|id| id.strip_prefix(prefix.as_str()).map(str::to_string))
                    .filter(|rest| !rest.is_empty())
                    .collect(),
                _ => vec![],
            },
            Err(_) => vec![],
        };
        Ok((pos, candidates))
    }
}

#[derive(Completer, Helper, Highlighter, Hinter, Validator)]
struct InputHelper {
    #[rustyline(Validator)]
    validator: ParenValidator,
    #[rustyline(Highlighter)]
    highlighter: ParenHighlighter,
    #[rustyline(Completer)]
    completer: LispCompleter,
}

struct ParenValidator;

impl Validator for ParenValidator {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escape = false;

        for (i, c) in ctx.input().char_indices() {
            if in_string {
                if escape {
                    escape = false;
                } else if c == '\\' {
                    escape = true;
                } else if c == '"' {
                    in_string = false;
                }
                continue;
            }

            match c {
                '"' => in_string = true,
                '(' => depth += 1,
                ')' => match depth.checked_sub(1) {
                    Some(d) => depth = d,
                    None => {
                        return Ok(ValidationResult::Invalid(Some(format!(
                            "  - Unmatched ')' at position {}",
                            i
                        ))));
                    }
                },
                _ => {}
            }
        }

        if in_string || depth > 0 {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

struct ParenHighlighter;

impl Highlighter for ParenHighlighter {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        let mut stack: Vec<usize> = Vec::new();
        let mut highlighted = String::new();
        let mut in_string = false;
        let mut escape = false;
        let cursor = pos.checked_sub(1);

        for (i, c) in line.char_indices() {
            if in_string {
                if escape {
                    escape = false;
                } else if c == '\\' {
                    escape = true;
                } else if c == '"' {
                    in_string = false;
                }
                highlighted.push_str(&format!("\x1b[32m{}\x1b[0m", c)); // Green for strings
                continue;
            }

            match c {
                '"' => {
                    in_string = true;
                    highlighted.push_str(&format!("\x1b[32m{}\x1b[0m", c));
                }
                '(' => {
                    stack.push(highlighted.len());
                    highlighted.push(c);
                }
                ')' => match stack.pop() {
                    Some(matching_pos) if cursor == Some(i) => {
                        highlighted.push_str("\x1b[1;34m)\x1b[0m"); // Blue for the matching pair
                        highlighted.replace_range(matching_pos..=matching_pos, "\x1b[1;34m(\x1b[0m");
                    }
                    Some(_) => highlighted.push(c),
                    None => highlighted.push_str("\x1b[31m)\x1b[0m"), // Red for unmatched
                },
                _ => highlighted.push(c),
            }
        }

        Cow::Owned(highlighted)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }
}

fn main() -> rustyline::Result<()> {
    env_logger::init();
    let repl_config = ReplConfig::from_env();

    println!("botlisp REPL v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'exit' or press Ctrl-D to quit.");

    let global_env = Environment::new_global_populated();
    let helper = InputHelper {
        highlighter: ParenHighlighter,
        validator: ParenValidator,
        completer: LispCompleter {
            env: global_env.clone(),
        },
    };
    let config = rustyline::config::Config::builder()
        .edit_mode(repl_config.edit_mode)
        .build();
    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(helper));
    rl.bind_sequence(
        KeyEvent(KeyCode::Char('s'), Modifiers::CTRL),
        EventHandler::Simple(Cmd::Newline),
    );
    if rl.load_history(&repl_config.history_file).is_err() {
        println!("No previous history.");
    }

    loop {
        match rl.readline(&repl_config.prompt) {
            Ok(line) => {
                rl.add_history_entry(line.as_str())?;
                let trimmed_input = line.trim();
                if trimmed_input.is_empty() {
                    continue;
                }
                if trimmed_input.eq_ignore_ascii_case("exit") {
                    break;
                }

                match botlisp::evaluate(&global_env, trimmed_input) {
                    Ok(value) => println!("{}", value),
                    Err(err) => {
                        if err.pretty_print(trimmed_input).is_err() {
                            eprintln!("{}", err);
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Interrupted. Type 'exit' or Ctrl-D to quit.");
            }
            Err(ReadlineError::Eof) => {
                println!("\nExiting.");
                break;
            }
            Err(err) => {
                eprintln!("Readline Error: {:?}", err);
                break;
            }
        }
    }
    rl.save_history(&repl_config.history_file)
}
