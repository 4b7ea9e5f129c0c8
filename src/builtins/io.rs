// ABOUTME: I/O primitives: print, read, load

use super::def;
use crate::error::EvalError;
use crate::eval;
use crate::heap::Heap;
use crate::reader::{ReadResult, Reader};
use crate::value::Value;

/// Ground truth: `prim_print` — print one expression (quoted strings,
/// the same form the REPL prints) followed by a newline, return `NIL`.
fn print(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("print", crate::error::ARITY_ONE, args.len()));
    }
    println!("{}", heap.display(args[0]));
    Ok(Value::Nil)
}

/// Ground truth: `prim_read` — read one expression from standard input,
/// pulling additional lines as needed for multi-line forms. `NIL` at EOF.
fn read(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    if !args.is_empty() {
        return Err(EvalError::arity_error("read", "0", args.len()));
    }
    let mut buffer = String::new();
    loop {
        let chars: Vec<char> = buffer.chars().collect();
        let mut reader = Reader::new(&chars);
        match reader.read(heap, &mut |_| {})? {
            ReadResult::Complete(v) => return Ok(v),
            ReadResult::Eof | ReadResult::Incomplete => {
                let mut line = String::new();
                let read = std::io::stdin()
                    .read_line(&mut line)
                    .map_err(|e| EvalError::runtime_error("read", e.to_string()))?;
                if read == 0 {
                    return Ok(Value::Nil);
                }
                buffer.push_str(&line);
            }
        }
    }
}

/// Ground truth: `load_file` — evaluate every top-level form in a named
/// file against the root environment, returning the value of the last
/// one (`NIL` for an empty file).
fn load(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("load", crate::error::ARITY_ONE, args.len()));
    }
    let filename = heap
        .string_value(args[0])
        .or_else(|| heap.symbol_name(args[0]))
        .map(str::to_string)
        .ok_or_else(|| EvalError::type_error(heap, "load", "string or symbol", &args[0], 0))?;

    let contents = std::fs::read_to_string(&filename)
        .map_err(|e| EvalError::runtime_error("load", format!("cannot open {filename}: {e}")))?;
    let chars: Vec<char> = contents.chars().collect();
    let mut reader = Reader::new(&chars);
    let env = heap.global_env;

    let mut last = Value::Nil;
    loop {
        match reader.read(heap, &mut |_| {})? {
            ReadResult::Eof => return Ok(last),
            ReadResult::Incomplete => {
                return Err(EvalError::runtime_error("load", "unexpected end of input"))
            }
            ReadResult::Complete(expr) => {
                let guard = heap.root(expr);
                last = eval::eval(heap, guard.value(), env)?;
            }
        }
    }
}

pub fn register(heap: &mut Heap, env: Value) {
    def(heap, env, "print", print);
    def(heap, env, "read", read);
    def(heap, env, "load", load);
}
