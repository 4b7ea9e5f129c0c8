// ABOUTME: Heap/GC introspection primitives: allocation counters and manual collection

use super::def;
use crate::error::EvalError;
use crate::heap::Heap;
use crate::value::Value;

fn current_allocated(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    if !args.is_empty() {
        return Err(EvalError::arity_error(
            "current-allocated",
            "0",
            args.len(),
        ));
    }
    Ok(Value::Int(heap.current_allocated))
}

fn total_allocated(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    if !args.is_empty() {
        return Err(EvalError::arity_error("total-allocated", "0", args.len()));
    }
    Ok(Value::Int(heap.total_allocated))
}

/// Force an immediate mark-and-sweep pass, returning the count of
/// objects freed. Ground truth: `prim_gc_pass` in the original source.
fn gc_pass(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    if !args.is_empty() {
        return Err(EvalError::arity_error("gc-pass", "0", args.len()));
    }
    Ok(Value::Int(heap.collect(&[]) as i64))
}

/// Ground truth: `prim_get_env` — returns the live root environment,
/// tracked on `Heap` the way the original tracks it in a mutable global.
fn get_global_environment(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    if !args.is_empty() {
        return Err(EvalError::arity_error(
            "get-global-environment",
            "0",
            args.len(),
        ));
    }
    Ok(heap.global_env)
}

/// Ground truth: `prim_set_env` — replaces the live root environment.
fn set_global_environment(heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error(
            "set-global-environment",
            crate::error::ARITY_ONE,
            args.len(),
        ));
    }
    heap.global_env = args[0];
    Ok(Value::Nil)
}

pub fn register(heap: &mut Heap, env: Value) {
    def(heap, env, "current-allocated", current_allocated);
    def(heap, env, "total-allocated", total_allocated);
    def(heap, env, "gc-pass", gc_pass);
    def(heap, env, "get-global-environment", get_global_environment);
    def(heap, env, "set-global-environment", set_global_environment);
}
