// ABOUTME: A stateful, character-at-a-time reader producing heap-backed values

use crate::error::EvalError;
use crate::heap::Heap;
use crate::value::Value;

/// Non-alphanumeric characters a bare symbol may contain, verbatim from
/// the original reader's `SYMBOLS` charset.
const SYMBOL_CHARS: &str = "~!@#$%^&*_-+\\:,.<>|{}[]?=/";
const MAX_STRING_LEN: usize = 256;
const MAX_SYMBOL_LEN: usize = 128;

/// The result of one `Reader::read` call.
pub enum ReadResult {
    /// A complete top-level expression.
    Complete(Value),
    /// The input was exhausted with no partial expression pending.
    Eof,
    /// The input ended in the middle of a list, string, or symbol. The
    /// REPL should request another line and retry; a script loader
    /// should treat it as a truncated-file error.
    Incomplete,
}

enum Signal {
    Incomplete,
    Err(EvalError),
}

impl From<EvalError> for Signal {
    fn from(e: EvalError) -> Self {
        Signal::Err(e)
    }
}

type StepResult<T> = Result<T, Signal>;

/// Reads one character at a time off a borrowed character slice,
/// tracking open-paren `depth` the way the original reader's global
/// `depth` counter does, so a REPL can render the `..`-per-depth
/// continuation prompt. This is deliberately not built on `nom`: the
/// grammar needs mid-parse side effects (the continuation prompt) and
/// incremental re-feeding across REPL lines, neither of which fits
/// parser combinators over a fixed, fully-buffered input.
pub struct Reader<'a> {
    chars: &'a [char],
    pos: usize,
    pub depth: usize,
}

impl<'a> Reader<'a> {
    pub fn new(chars: &'a [char]) -> Self {
        Reader {
            chars,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    /// Read one top-level expression. `on_newline` is called with the
    /// current depth every time a line break is consumed, so the caller
    /// can print (or otherwise render) the continuation prompt exactly
    /// when the original interpreter would have.
    pub fn read(
        &mut self,
        heap: &mut Heap,
        on_newline: &mut dyn FnMut(usize),
    ) -> Result<ReadResult, EvalError> {
        match self.read_expr(heap, on_newline) {
            Ok(Some(v)) => Ok(ReadResult::Complete(v)),
            Ok(None) => Ok(ReadResult::Eof),
            Err(Signal::Incomplete) => Ok(ReadResult::Incomplete),
            Err(Signal::Err(e)) => Err(e),
        }
    }

    /// Reads one expression, returning `Ok(None)` only for a clean,
    /// top-of-input EOF (nothing consumed yet that implies more is
    /// coming).
    fn read_expr(
        &mut self,
        heap: &mut Heap,
        on_newline: &mut dyn FnMut(usize),
    ) -> StepResult<Option<Value>> {
        loop {
            let c = match self.bump() {
                Some(c) => c,
                None => return Ok(None),
            };
            match c {
                '\n' | '\r' => {
                    on_newline(self.depth);
                    continue;
                }
                ' ' | '\t' => continue,
                ';' => {
                    self.skip_line();
                    continue;
                }
                '"' => return self.read_string(heap).map(Some),
                '\'' => {
                    let quote = heap.make_symbol("quote");
                    let inner = self.read_required(heap, on_newline)?;
                    let rest = heap.cons(inner, Value::EmptyList);
                    return Ok(Some(heap.cons(quote, rest)));
                }
                '(' => {
                    self.depth += 1;
                    return self.read_list(heap, on_newline).map(Some);
                }
                ')' => {
                    self.depth = self.depth.saturating_sub(1);
                    return Err(Signal::Err(EvalError::ReadError(
                        "unexpected ')'".to_string(),
                    )));
                }
                c if c.is_ascii_digit() => return Ok(Some(self.read_int(c as i64 - '0' as i64))),
                '-' if self.peek().is_some_and(|d| d.is_ascii_digit()) => {
                    let first = self.bump().expect("checked by peek") as i64 - '0' as i64;
                    return Ok(Some(self.read_int(-first)));
                }
                c if c.is_alphabetic() || SYMBOL_CHARS.contains(c) => {
                    return self.read_symbol(heap, c).map(Some)
                }
                other => {
                    return Err(Signal::Err(EvalError::ReadError(format!(
                        "unexpected character '{other}'"
                    ))))
                }
            }
        }
    }

    /// Like `read_expr`, but an EOF here means the surrounding form
    /// (a list, or a quote's operand) is unterminated.
    fn read_required(
        &mut self,
        heap: &mut Heap,
        on_newline: &mut dyn FnMut(usize),
    ) -> StepResult<Value> {
        match self.read_expr(heap, on_newline)? {
            Some(v) => Ok(v),
            None => Err(Signal::Incomplete),
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.bump() {
            if c == '\n' {
                break;
            }
        }
    }

    fn read_list(&mut self, heap: &mut Heap, on_newline: &mut dyn FnMut(usize)) -> StepResult<Value> {
        let mut items = Vec::new();
        loop {
            match self.read_expr(heap, on_newline) {
                Ok(Some(v)) => items.push(v),
                Ok(None) => return Err(Signal::Incomplete),
                Err(Signal::Err(e))
                    if matches!(&e, EvalError::ReadError(m) if m == "unexpected ')'") =>
                {
                    let mut list = Value::EmptyList;
                    for item in items.into_iter().rev() {
                        list = heap.cons(item, list);
                    }
                    return Ok(list);
                }
                Err(other) => return Err(other),
            }
        }
    }

    fn read_string(&mut self, heap: &mut Heap) -> StepResult<Value> {
        let mut buf = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(heap.make_string(buf)),
                Some(c) => {
                    if buf.len() >= MAX_STRING_LEN {
                        return Err(Signal::Err(EvalError::ReadError(
                            "string too long - maximum length 256 characters".to_string(),
                        )));
                    }
                    buf.push(c);
                }
                None => return Err(Signal::Incomplete),
            }
        }
    }

    fn read_symbol(&mut self, heap: &mut Heap, start: char) -> StepResult<Value> {
        let mut buf = String::new();
        buf.push(start);
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || SYMBOL_CHARS.contains(c) {
                if buf.len() >= MAX_SYMBOL_LEN {
                    return Err(Signal::Err(EvalError::ReadError(
                        "symbol too long - maximum length 128 characters".to_string(),
                    )));
                }
                buf.push(c);
                self.bump();
            } else {
                break;
            }
        }
        Ok(heap.make_symbol(&buf))
    }

    fn read_int(&mut self, start: i64) -> Value {
        let mut n = start;
        let negative = start < 0;
        while let Some(c) = self.peek() {
            if let Some(d) = c.to_digit(10) {
                n = if negative {
                    n * 10 - d as i64
                } else {
                    n * 10 + d as i64
                };
                self.bump();
            } else {
                break;
            }
        }
        Value::Int(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_one(src: &str) -> (Heap, Value) {
        let mut heap = Heap::new(false);
        let chars: Vec<char> = src.chars().collect();
        let mut reader = Reader::new(&chars);
        match reader.read(&mut heap, &mut |_| {}).unwrap() {
            ReadResult::Complete(v) => (heap, v),
            _ => panic!("expected a complete expression"),
        }
    }

    #[test]
    fn reads_integers() {
        let (_, v) = read_one("42");
        assert_eq!(v.as_int(), Some(42));
        let (_, v) = read_one("-7");
        assert_eq!(v.as_int(), Some(-7));
    }

    #[test]
    fn reads_symbols_and_lists() {
        let (heap, v) = read_one("(+ 1 2)");
        let items = heap.list_to_vec(v).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(heap.symbol_name(items[0]), Some("+"));
        assert_eq!(items[1].as_int(), Some(1));
        assert_eq!(items[2].as_int(), Some(2));
    }

    #[test]
    fn quote_desugars_at_read_time() {
        let (heap, v) = read_one("'x");
        let items = heap.list_to_vec(v).unwrap();
        assert_eq!(heap.symbol_name(items[0]), Some("quote"));
        assert_eq!(heap.symbol_name(items[1]), Some("x"));
    }

    #[test]
    fn reads_strings() {
        let (heap, v) = read_one("\"hello\"");
        assert_eq!(heap.string_value(v), Some("hello"));
    }

    #[test]
    fn empty_input_is_eof() {
        let mut heap = Heap::new(false);
        let chars: Vec<char> = "   ".chars().collect();
        let mut reader = Reader::new(&chars);
        assert!(matches!(
            reader.read(&mut heap, &mut |_| {}).unwrap(),
            ReadResult::Eof
        ));
    }

    #[test]
    fn unterminated_list_is_incomplete() {
        let mut heap = Heap::new(false);
        let chars: Vec<char> = "(+ 1 2".chars().collect();
        let mut reader = Reader::new(&chars);
        assert!(matches!(
            reader.read(&mut heap, &mut |_| {}).unwrap(),
            ReadResult::Incomplete
        ));
    }

    #[test]
    fn depth_tracks_open_parens_for_continuation_prompts() {
        let mut heap = Heap::new(false);
        let chars: Vec<char> = "(+ 1\n 2)".chars().collect();
        let mut reader = Reader::new(&chars);
        let mut seen_depth = None;
        reader
            .read(&mut heap, &mut |d| seen_depth = Some(d))
            .unwrap();
        assert_eq!(seen_depth, Some(1));
    }
}
