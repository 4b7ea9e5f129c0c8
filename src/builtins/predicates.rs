// ABOUTME: Type predicates and the eq?/equal? equivalence primitives

use super::def;
use crate::error::EvalError;
use crate::heap::Heap;
use crate::value::Value;

fn one_arg<'a>(name: &'static str, args: &'a [Value]) -> Result<&'a Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error(name, crate::error::ARITY_ONE, args.len()));
    }
    Ok(&args[0])
}

fn is_null(_heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    let v = one_arg("null?", args)?;
    Ok(Value::Bool(matches!(v, Value::Nil | Value::EmptyList)))
}

fn is_pair(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    let v = *one_arg("pair?", args)?;
    Ok(Value::Bool(heap.is_pair(v)))
}

fn is_list(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    let mut v = *one_arg("list?", args)?;
    loop {
        match v {
            Value::EmptyList => return Ok(Value::Bool(true)),
            _ => match heap.pair(v) {
                Some((_, d)) => v = d,
                None => return Ok(Value::Bool(false)),
            },
        }
    }
}

fn is_atom(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    let v = *one_arg("atom?", args)?;
    let atom = !matches!(v, Value::Nil | Value::EmptyList) && !heap.is_pair(v);
    Ok(Value::Bool(atom))
}

fn is_number(_heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    let v = one_arg("number?", args)?;
    Ok(Value::Bool(matches!(v, Value::Int(_))))
}

fn is_symbol(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    let v = *one_arg("symbol?", args)?;
    Ok(Value::Bool(heap.is_symbol(v)))
}

fn is_string(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    let v = *one_arg("string?", args)?;
    Ok(Value::Bool(heap.is_string(v)))
}

fn is_procedure(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    let v = *one_arg("procedure?", args)?;
    Ok(Value::Bool(heap.is_closure(v) || matches!(v, Value::Primitive(_))))
}

fn is_eq(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("eq?", crate::error::ARITY_TWO, args.len()));
    }
    Ok(Value::Bool(heap.eq(args[0], args[1])))
}

fn is_equal(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("equal?", crate::error::ARITY_TWO, args.len()));
    }
    Ok(Value::Bool(heap.equal(args[0], args[1])))
}

fn type_of(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    let v = *one_arg("type", args)?;
    Ok(heap.make_symbol(heap.type_name_of(v)))
}

pub fn register(heap: &mut Heap, env: Value) {
    def(heap, env, "null?", is_null);
    def(heap, env, "pair?", is_pair);
    def(heap, env, "list?", is_list);
    def(heap, env, "atom?", is_atom);
    def(heap, env, "number?", is_number);
    def(heap, env, "symbol?", is_symbol);
    def(heap, env, "string?", is_string);
    def(heap, env, "procedure?", is_procedure);
    def(heap, env, "eq?", is_eq);
    def(heap, env, "equal?", is_equal);
    def(heap, env, "type", type_of);
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
    fn null_is_true_for_both_nil_and_empty_list() {
        assert!(run("(null? '())").1.is_truthy());
        assert!(run("(null? (cdr (list 1)))").1.is_truthy());
        assert!(!run("(null? 1)").1.is_truthy());
    }

    #[test]
    fn list_predicate_rejects_dotted_pairs() {
        assert!(run("(list? (list 1 2))").1.is_truthy());
        assert!(!run("(list? (cons 1 2))").1.is_truthy());
    }

    #[test]
    fn eq_is_identity_equal_is_structural() {
        assert!(!run("(eq? (list 1) (list 1))").1.is_truthy());
        assert!(run("(equal? (list 1) (list 1))").1.is_truthy());
    }

    #[test]
    fn atom_predicate() {
        assert!(run("(atom? 5)").1.is_truthy());
        assert!(!run("(atom? (cons 1 2))").1.is_truthy());
        assert!(!run("(atom? '())").1.is_truthy());
    }
}
