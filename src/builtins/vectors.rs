// ABOUTME: Fixed-size vector primitives: construction, indexing, mutation

use super::def;
use crate::error::EvalError;
use crate::heap::Heap;
use crate::value::Value;

/// Allocates a vector of a given size, analogous to the original
/// interpreter's `(vector N)`, not a Scheme literal-elements constructor.
fn vector(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    if args.is_empty() || args.len() > 2 {
        return Err(EvalError::arity_error(
            "vector",
            crate::error::ARITY_ONE_OR_TWO,
            args.len(),
        ));
    }
    let size = args[0]
        .as_int()
        .ok_or_else(|| EvalError::type_error(heap, "vector", "int", &args[0], 0))?;
    let fill = args.get(1).copied().unwrap_or(Value::Nil);
    Ok(heap.make_vector(vec![fill; size.max(0) as usize]))
}

fn make_vector(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    vector(heap, args)
}

fn vector_get(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("vector-get", crate::error::ARITY_TWO, args.len()));
    }
    let items = heap
        .vector_items(args[0])
        .ok_or_else(|| EvalError::type_error(heap, "vector-get", "vector", &args[0], 0))?;
    let index = args[1]
        .as_int()
        .ok_or_else(|| EvalError::type_error(heap, "vector-get", "int", &args[1], 1))?;
    let result = usize::try_from(index)
        .ok()
        .and_then(|i| items.get(i).copied())
        .ok_or_else(|| EvalError::runtime_error("vector-get", "index out of range"));
    heap.permissive(result)
}

fn vector_set(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 3 {
        return Err(EvalError::arity_error("vector-set", "3", args.len()));
    }
    let index = args[1]
        .as_int()
        .ok_or_else(|| EvalError::type_error(heap, "vector-set", "int", &args[1], 1))?;
    let index = usize::try_from(index)
        .map_err(|_| EvalError::runtime_error("vector-set", "index out of range"))?;
    heap.vector_set(args[0], index, args[2])?;
    Ok(Value::Nil)
}

fn vector_length(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("vector-length", crate::error::ARITY_ONE, args.len()));
    }
    let items = heap
        .vector_items(args[0])
        .ok_or_else(|| EvalError::type_error(heap, "vector-length", "vector", &args[0], 0))?;
    Ok(Value::Int(items.len() as i64))
}

fn is_vector(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("vector?", crate::error::ARITY_ONE, args.len()));
    }
    Ok(Value::Bool(heap.is_vector(args[0])))
}

pub fn register(heap: &mut Heap, env: Value) {
    def(heap, env, "vector", vector);
    def(heap, env, "make-vector", make_vector);
    def(heap, env, "vector-get", vector_get);
    def(heap, env, "vector-set", vector_set);
    def(heap, env, "vector-length", vector_length);
    def(heap, env, "vector?", is_vector);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment;
    use crate::reader::{ReadResult, Reader};

    fn run(src: &str) -> (Heap, Value) {
        let mut heap = Heap::new(false);
        let env = environment::global(&mut heap);
        crate::builtins::register_all(&mut heap, env);
        let chars: Vec<char> = src.chars().collect();
        let mut reader = Reader::new(&chars);
        let exp = match reader.read(&mut heap, &mut |_| {}).unwrap() {
            ReadResult::Complete(v) => v,
            _ => panic!(),
        };
        let v = crate::eval::eval(&mut heap, exp, env).unwrap();
        (heap, v)
    }

    #[test]
    fn make_vector_and_index_round_trip() {
        let (_, v) = run("(vector-get (make-vector 3 7) 1)");
        assert_eq!(v.as_int(), Some(7));
    }

    #[test]
    fn vector_set_mutates_in_place() {
        let (_, v) = run("(let ((v (vector 3))) (vector-set v 0 9) (vector-get v 0))");
        assert_eq!(v.as_int(), Some(9));
    }

    #[test]
    fn out_of_range_ref_is_nil_in_permissive_mode() {
        let (_, v) = run("(vector-get (vector 2) 9)");
        assert!(matches!(v, Value::Nil));
    }

    #[test]
    fn vector_length_reports_element_count() {
        let (_, v) = run("(vector-length (vector 4))");
        assert_eq!(v.as_int(), Some(4));
    }
}
