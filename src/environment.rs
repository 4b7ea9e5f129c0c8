// ABOUTME: Environments represented as ordinary heap values — a chain of frames

use crate::error::EvalError;
use crate::heap::Heap;
use crate::value::Value;

/// An environment is a list of frames, each frame a pair of parallel
/// lists: `(vars . vals)`. Lookup/set walk innermost-frame-first;
/// `define` only ever touches the innermost frame. Grounded on
/// `extend_env`/`lookup_variable`/`define_variable`/`set_variable` in the
/// original source, reshaped to the "two parallel lists per frame" data
/// model this system's value model calls for.
pub fn extend(heap: &mut Heap, vars: Value, vals: Value, base: Value) -> Value {
    let frame = heap.cons(vars, vals);
    heap.cons(frame, base)
}

pub fn global(heap: &mut Heap) -> Value {
    let env = extend(heap, Value::EmptyList, Value::EmptyList, Value::EmptyList);
    heap.global_env = env;
    bootstrap(heap, env);
    env
}

/// Binds the startup keyword/sentinel set the original interpreter seeds
/// its global environment with before any primitives are registered:
/// `#t`/`#f`/`true`/`false` as ordinary variables aliasing `Value::Bool`
/// (ground truth: `add_sym("#t"/"#f", ...)` and
/// `define_variable("true"/"false", ...)`), and `gc-threshold` as a
/// plain mutable integer variable.
fn bootstrap(heap: &mut Heap, env: Value) {
    for name in ["#t", "true"] {
        let sym = heap.make_symbol(name);
        define(heap, env, sym, Value::Bool(true)).expect("bootstrap define cannot fail");
    }
    for name in ["#f", "false"] {
        let sym = heap.make_symbol(name);
        define(heap, env, sym, Value::Bool(false)).expect("bootstrap define cannot fail");
    }
    let gc_threshold = heap.make_symbol("gc-threshold");
    let threshold = Value::Int(heap.gc_threshold);
    define(heap, env, gc_threshold, threshold).expect("bootstrap define cannot fail");
}

/// Keeps `Heap::gc_threshold` (consulted on every allocation) in sync
/// with the `gc-threshold` Lisp binding, so `(set! gc-threshold N)` and
/// `(define gc-threshold N)` actually take effect.
fn sync_gc_threshold(heap: &mut Heap, var: Value, val: Value) {
    if heap.symbol_name(var) == Some("gc-threshold") {
        if let Some(n) = val.as_int() {
            heap.gc_threshold = n;
        }
    }
}

/// Bind `var` to `val` in the innermost frame of `env`. If `var` is
/// already bound in that frame, its value is replaced rather than
/// shadowed again.
pub fn define(heap: &mut Heap, env: Value, var: Value, val: Value) -> Result<(), EvalError> {
    let frame = heap.car(env)?;
    let (vars, vals) = (heap.car(frame)?, heap.cdr(frame)?);

    let mut v = vars;
    let mut w = vals;
    loop {
        match (heap.pair(v), heap.pair(w)) {
            (Some((a, d)), Some((_, wd))) => {
                if heap.eq(a, var) {
                    heap.set_car(w, val)?;
                    sync_gc_threshold(heap, var, val);
                    return Ok(());
                }
                v = d;
                w = wd;
            }
            _ => break,
        }
    }

    let new_vars = heap.cons(var, vars);
    let new_vals = heap.cons(val, vals);
    heap.set_car(frame, new_vars)?;
    heap.set_cdr(frame, new_vals)?;
    sync_gc_threshold(heap, var, val);
    Ok(())
}

/// Search every frame, innermost first, for `var`.
pub fn lookup(heap: &Heap, env: Value, var: Value) -> Result<Value, EvalError> {
    let mut e = env;
    while let Some((frame, rest)) = heap.pair(e) {
        if let Some((vars, vals)) = heap.pair(frame) {
            let mut v = vars;
            let mut w = vals;
            loop {
                match (heap.pair(v), heap.pair(w)) {
                    (Some((a, d)), Some((wa, wd))) => {
                        if heap.eq(a, var) {
                            return Ok(wa);
                        }
                        v = d;
                        w = wd;
                    }
                    _ => break,
                }
            }
        }
        e = rest;
    }
    let name = heap.symbol_name(var).unwrap_or("?").to_string();
    Err(EvalError::UndefinedSymbol(name))
}

/// Like `lookup`, but mutates the first binding found instead of
/// returning it. Silently does nothing if `var` is unbound anywhere,
/// matching the original's `set_variable` (which likewise has no
/// "unbound" error path).
pub fn set(heap: &mut Heap, env: Value, var: Value, val: Value) -> Result<(), EvalError> {
    let mut e = env;
    while let Some((frame, rest)) = heap.pair(e) {
        if let Some((vars, vals)) = heap.pair(frame) {
            let mut v = vars;
            let mut w = vals;
            loop {
                match (heap.pair(v), heap.pair(w)) {
                    (Some((a, d)), Some((_, wd))) => {
                        if heap.eq(a, var) {
                            heap.set_car(w, val)?;
                            sync_gc_threshold(heap, var, val);
                            return Ok(());
                        }
                        v = d;
                        w = wd;
                    }
                    _ => break,
                }
            }
        }
        e = rest;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_then_lookup_round_trips() {
        let mut heap = Heap::new(false);
        let env = global(&mut heap);
        let x = heap.make_symbol("x");
        define(&mut heap, env, x, Value::Int(42)).unwrap();
        assert_eq!(lookup(&heap, env, x).unwrap().as_int(), Some(42));
    }

    #[test]
    fn inner_frame_shadows_outer() {
        let mut heap = Heap::new(false);
        let outer = global(&mut heap);
        let x = heap.make_symbol("x");
        define(&mut heap, outer, x, Value::Int(1)).unwrap();

        let vars = heap.cons(x, Value::EmptyList);
        let vals = heap.cons(Value::Int(2), Value::EmptyList);
        let inner = extend(&mut heap, vars, vals, outer);

        assert_eq!(lookup(&heap, inner, x).unwrap().as_int(), Some(2));
        assert_eq!(lookup(&heap, outer, x).unwrap().as_int(), Some(1));
    }

    #[test]
    fn set_mutates_the_first_binding_found() {
        let mut heap = Heap::new(false);
        let outer = global(&mut heap);
        let x = heap.make_symbol("x");
        define(&mut heap, outer, x, Value::Int(1)).unwrap();
        let inner = extend(&mut heap, Value::EmptyList, Value::EmptyList, outer);

        set(&mut heap, inner, x, Value::Int(99)).unwrap();
        assert_eq!(lookup(&heap, outer, x).unwrap().as_int(), Some(99));
    }

    #[test]
    fn unbound_lookup_is_an_error() {
        let mut heap = Heap::new(false);
        let env = global(&mut heap);
        let y = heap.make_symbol("y");
        assert!(matches!(
            lookup(&heap, env, y),
            Err(EvalError::UndefinedSymbol(_))
        ));
    }

    #[test]
    fn set_on_unbound_symbol_is_a_silent_no_op() {
        let mut heap = Heap::new(false);
        let env = global(&mut heap);
        let z = heap.make_symbol("z");
        assert!(set(&mut heap, env, z, Value::Int(1)).is_ok());
    }
}
