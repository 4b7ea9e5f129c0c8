// ABOUTME: Variadic integer arithmetic and comparison primitives

use super::def;
use crate::error::EvalError;
use crate::heap::Heap;
use crate::value::Value;

fn int_arg(heap: &Heap, name: &str, args: &[Value], i: usize) -> Result<i64, EvalError> {
    args[i]
        .as_int()
        .ok_or_else(|| EvalError::type_error(heap, name, "int", &args[i], i))
}

fn add(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    let mut sum = 0i64;
    for i in 0..args.len() {
        match int_arg(heap, "+", args, i) {
            Ok(n) => sum += n,
            Err(e) => return heap.permissive(Err(e)),
        }
    }
    Ok(Value::Int(sum))
}

fn sub(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::arity_error("-", crate::error::ARITY_AT_LEAST_ONE, 0));
    }
    if args.len() == 1 {
        return match int_arg(heap, "-", args, 0) {
            Ok(n) => Ok(Value::Int(-n)),
            Err(e) => heap.permissive(Err(e)),
        };
    }
    let mut acc = match int_arg(heap, "-", args, 0) {
        Ok(n) => n,
        Err(e) => return heap.permissive(Err(e)),
    };
    for i in 1..args.len() {
        match int_arg(heap, "-", args, i) {
            Ok(n) => acc -= n,
            Err(e) => return heap.permissive(Err(e)),
        }
    }
    Ok(Value::Int(acc))
}

fn mul(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    let mut product = 1i64;
    for i in 0..args.len() {
        match int_arg(heap, "*", args, i) {
            Ok(n) => product *= n,
            Err(e) => return heap.permissive(Err(e)),
        }
    }
    Ok(Value::Int(product))
}

fn div(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::arity_error("/", crate::error::ARITY_AT_LEAST_ONE, 0));
    }
    let first = match int_arg(heap, "/", args, 0) {
        Ok(n) => n,
        Err(e) => return heap.permissive(Err(e)),
    };
    if args.len() == 1 {
        if first == 0 {
            return heap.permissive(Err(EvalError::runtime_error("/", "division by zero")));
        }
        return Ok(Value::Int(1 / first));
    }
    let mut acc = first;
    for i in 1..args.len() {
        let divisor = match int_arg(heap, "/", args, i) {
            Ok(n) => n,
            Err(e) => return heap.permissive(Err(e)),
        };
        if divisor == 0 {
            return heap.permissive(Err(EvalError::runtime_error("/", "division by zero")));
        }
        acc /= divisor;
    }
    Ok(Value::Int(acc))
}

fn chain_compare(
    heap: &mut Heap,
    name: &'static str,
    args: &[Value],
    op: fn(i64, i64) -> bool,
) -> Result<Value, EvalError> {
    if args.len() < 2 {
        return Err(EvalError::arity_error(name, crate::error::ARITY_TWO, args.len()));
    }
    for i in 0..args.len() - 1 {
        let a = match int_arg(heap, name, args, i) {
            Ok(n) => n,
            Err(e) => return heap.permissive(Err(e)),
        };
        let b = match int_arg(heap, name, args, i + 1) {
            Ok(n) => n,
            Err(e) => return heap.permissive(Err(e)),
        };
        if !op(a, b) {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

fn num_eq(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    chain_compare(heap, "=", args, |a, b| a == b)
}

fn lt(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    chain_compare(heap, "<", args, |a, b| a < b)
}

fn gt(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    chain_compare(heap, ">", args, |a, b| a > b)
}

fn le(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    chain_compare(heap, "<=", args, |a, b| a <= b)
}

fn ge(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    chain_compare(heap, ">=", args, |a, b| a >= b)
}

pub fn register(heap: &mut Heap, env: Value) {
    def(heap, env, "+", add);
    def(heap, env, "-", sub);
    def(heap, env, "*", mul);
    def(heap, env, "/", div);
    def(heap, env, "=", num_eq);
    def(heap, env, "<", lt);
    def(heap, env, ">", gt);
    def(heap, env, "<=", le);
    def(heap, env, ">=", ge);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment;

    fn run(src: &str) -> (Heap, Value) {
        let mut heap = Heap::new(false);
        let env = environment::global(&mut heap);
        super::register(&mut heap, env);
        let chars: Vec<char> = src.chars().collect();
        let mut reader = crate::reader::Reader::new(&chars);
        let exp = match reader.read(&mut heap, &mut |_| {}).unwrap() {
            crate::reader::ReadResult::Complete(v) => v,
            _ => panic!(),
        };
        let v = crate::eval::eval(&mut heap, exp, env).unwrap();
        (heap, v)
    }

    #[test]
    fn variadic_arithmetic() {
        assert_eq!(run("(+ 1 2 3)").1.as_int(), Some(6));
        assert_eq!(run("(- 10 1 2)").1.as_int(), Some(7));
        assert_eq!(run("(- 5)").1.as_int(), Some(-5));
        assert_eq!(run("(* 2 3 4)").1.as_int(), Some(24));
        assert_eq!(run("(/ 20 2 2)").1.as_int(), Some(5));
    }

    #[test]
    fn chained_comparisons() {
        assert!(run("(< 1 2 3)").1.is_truthy());
        assert!(!run("(< 1 3 2)").1.is_truthy());
        assert!(run("(= 2 2 2)").1.is_truthy());
    }

    #[test]
    fn division_by_zero_is_nil_in_permissive_mode() {
        let (_, v) = run("(/ 1 0)");
        assert!(matches!(v, Value::Nil));
    }

    #[test]
    fn type_mismatch_is_nil_in_permissive_mode() {
        assert!(matches!(run("(+ 1 \"a\")").1, Value::Nil));
        assert!(matches!(run("(- 1 \"a\")").1, Value::Nil));
        assert!(matches!(run("(* 1 \"a\")").1, Value::Nil));
        assert!(matches!(run("(< 1 \"a\")").1, Value::Nil));
    }
}
