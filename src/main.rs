mod builtins;
mod config;
mod environment;
mod error;
mod eval;
mod heap;
mod reader;
mod value;

use std::path::PathBuf;

use clap::Parser;
use config::{VERSION, WELCOME_MESSAGE, WELCOME_SUBTITLE};
use error::EvalError;
use heap::Heap;
use reader::{ReadResult, Reader};
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor, DefaultEditor};

/// A small Scheme-like interpreter with tail calls and a tracing
/// mark-and-sweep collector.
#[derive(Parser, Debug)]
#[command(name = "uscheme")]
#[command(version = VERSION)]
#[command(about = "A small Scheme-like interpreter")]
struct CliArgs {
    /// Script files to execute, in order. Starts an interactive REPL if
    /// none are given.
    #[arg(value_name = "FILE")]
    scripts: Vec<PathBuf>,

    /// Abort on type errors, unbound symbols, and invalid application
    /// instead of substituting `nil` and continuing.
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let mut heap = Heap::new(args.strict);
    let env = environment::global(&mut heap);
    // Kept alive for the whole process: every live binding hangs off
    // this frame chain, so it must never be collected.
    let _env_root = heap.root(env);
    builtins::register_all(&mut heap, env);

    if !args.scripts.is_empty() {
        for path in &args.scripts {
            run_script(&mut heap, path)?;
        }
        return Ok(());
    }

    repl(&mut heap)
}

/// Evaluates every top-level form against whatever `heap.global_env`
/// currently is at the start of each form, so a script that calls
/// `set-global-environment` changes where the rest of the file runs —
/// matching the original interpreter's mutable global `ENV`.
fn run_script(heap: &mut Heap, path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read script file {}: {}", path.display(), e))?;
    let chars: Vec<char> = contents.chars().collect();
    let mut reader = Reader::new(&chars);

    loop {
        match reader.read(heap, &mut |_| {}) {
            Ok(ReadResult::Eof) => return Ok(()),
            Ok(ReadResult::Incomplete) => {
                return Err(format!("{}: unexpected end of input", path.display()).into())
            }
            Ok(ReadResult::Complete(expr)) => {
                let guard = heap.root(expr);
                let env = heap.global_env;
                eval::eval(heap, guard.value(), env)
                    .map_err(|e| format!("{}: {}", path.display(), e))?;
            }
            Err(e) => return Err(format!("{}: {}", path.display(), e).into()),
        }
    }
}

const HISTORY_FILE: &str = ".uscheme_history";
const TOP_PROMPT: &str = "user> ";

fn repl(heap: &mut Heap) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::builder().auto_add_history(true).build();
    let mut rl: Editor<(), _> =
        DefaultEditor::with_config(config).map_err(|e| format!("failed to start REPL: {e}"))?;
    let _ = rl.load_history(HISTORY_FILE);

    println!("{WELCOME_MESSAGE}");
    println!("{WELCOME_SUBTITLE}");

    let mut buffer = String::new();
    let mut prompt = TOP_PROMPT.to_string();

    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                buffer.push_str(&line);
                buffer.push('\n');

                match read_one(heap, &buffer) {
                    Ok(ReadResult::Complete(expr)) => {
                        let guard = heap.root(expr);
                        let env = heap.global_env;
                        match eval::eval(heap, guard.value(), env) {
                            Ok(value) => println!("====> {}", heap.display(value)),
                            Err(e) => print_error(&e),
                        }
                        buffer.clear();
                        prompt = TOP_PROMPT.to_string();
                    }
                    Ok(ReadResult::Eof) => {
                        buffer.clear();
                        prompt = TOP_PROMPT.to_string();
                    }
                    Ok(ReadResult::Incomplete) => {
                        let depth = current_depth(heap, &buffer);
                        prompt = "..".repeat(depth.max(1));
                    }
                    Err(e) => {
                        print_error(&e);
                        buffer.clear();
                        prompt = TOP_PROMPT.to_string();
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                buffer.clear();
                prompt = TOP_PROMPT.to_string();
                println!("^C");
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(e) => return Err(Box::new(e)),
        }
    }

    let _ = rl.save_history(HISTORY_FILE);
    Ok(())
}

fn read_one(heap: &mut Heap, buffer: &str) -> Result<ReadResult, EvalError> {
    let chars: Vec<char> = buffer.chars().collect();
    let mut reader = Reader::new(&chars);
    reader.read(heap, &mut |_| {})
}

fn current_depth(heap: &mut Heap, buffer: &str) -> usize {
    let chars: Vec<char> = buffer.chars().collect();
    let mut reader = Reader::new(&chars);
    let _ = reader.read(heap, &mut |_| {});
    reader.depth
}

fn print_error(e: &EvalError) {
    eprintln!("Error: {e}");
}
