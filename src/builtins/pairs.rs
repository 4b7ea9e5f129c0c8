// ABOUTME: Pair and list primitives: cons, car, cdr, mutation, construction

use super::def;
use crate::error::EvalError;
use crate::heap::Heap;
use crate::value::Value;

fn cons(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("cons", crate::error::ARITY_TWO, args.len()));
    }
    Ok(heap.cons(args[0], args[1]))
}

fn car(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("car", crate::error::ARITY_ONE, args.len()));
    }
    let result = heap.car(args[0]);
    heap.permissive(result)
}

fn cdr(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("cdr", crate::error::ARITY_ONE, args.len()));
    }
    let result = heap.cdr(args[0]);
    heap.permissive(result)
}

fn set_car(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("set-car!", crate::error::ARITY_TWO, args.len()));
    }
    heap.set_car(args[0], args[1])?;
    Ok(Value::Nil)
}

fn set_cdr(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("set-cdr!", crate::error::ARITY_TWO, args.len()));
    }
    heap.set_cdr(args[0], args[1])?;
    Ok(Value::Nil)
}

fn list(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    Ok(heap.vec_to_list(args))
}

fn length(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("length", crate::error::ARITY_ONE, args.len()));
    }
    let items = heap.list_to_vec(args[0])?;
    Ok(Value::Int(items.len() as i64))
}

fn append(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    let mut items = Vec::new();
    for arg in args {
        items.extend(heap.list_to_vec(*arg)?);
    }
    Ok(heap.vec_to_list(&items))
}

fn reverse(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("reverse", crate::error::ARITY_ONE, args.len()));
    }
    let mut items = heap.list_to_vec(args[0])?;
    items.reverse();
    Ok(heap.vec_to_list(&items))
}

pub fn register(heap: &mut Heap, env: Value) {
    def(heap, env, "cons", cons);
    def(heap, env, "car", car);
    def(heap, env, "cdr", cdr);
    def(heap, env, "set-car!", set_car);
    def(heap, env, "set-cdr!", set_cdr);
    def(heap, env, "list", list);
    def(heap, env, "length", length);
    def(heap, env, "append", append);
    def(heap, env, "reverse", reverse);
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
    fn car_and_cdr_of_a_cons() {
        let (heap, v) = run("(cons 1 2)");
        assert_eq!(heap.car(v).unwrap().as_int(), Some(1));
        assert_eq!(heap.cdr(v).unwrap().as_int(), Some(2));
    }

    #[test]
    fn car_of_non_pair_is_nil_in_permissive_mode() {
        let (_, v) = run("(car 5)");
        assert!(matches!(v, Value::Nil));
    }

    #[test]
    fn length_of_a_list() {
        let (_, v) = run("(length (list 1 2 3))");
        assert_eq!(v.as_int(), Some(3));
    }

    #[test]
    fn append_concatenates_lists() {
        let (heap, v) = run("(append (list 1 2) (list 3 4))");
        let items = heap.list_to_vec(v).unwrap();
        let nums: Vec<i64> = items.iter().map(|x| x.as_int().unwrap()).collect();
        assert_eq!(nums, vec![1, 2, 3, 4]);
    }

    #[test]
    fn reverse_a_list() {
        let (heap, v) = run("(reverse (list 1 2 3))");
        let items = heap.list_to_vec(v).unwrap();
        let nums: Vec<i64> = items.iter().map(|x| x.as_int().unwrap()).collect();
        assert_eq!(nums, vec![3, 2, 1]);
    }

    #[test]
    fn set_car_mutates_in_place() {
        let (heap, v) = run("(let ((p (cons 1 2))) (set-car! p 9) p)");
        assert_eq!(heap.car(v).unwrap().as_int(), Some(9));
    }
}
