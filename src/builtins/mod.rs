// ABOUTME: Registers every builtin primitive into a fresh global environment

mod arithmetic;
mod exec;
mod introspection;
mod io;
mod pairs;
mod predicates;
mod vectors;

use crate::environment;
use crate::heap::Heap;
use crate::value::{Primitive, PrimitiveFn, Value};

/// Bind `name` to a primitive procedure in `env`'s innermost frame.
/// Shared by every category submodule's own `register`.
fn def(heap: &mut Heap, env: Value, name: &'static str, func: PrimitiveFn) {
    let symbol = heap.make_symbol(name);
    let value = Value::Primitive(Primitive { name, func });
    environment::define(heap, env, symbol, value).expect("defining a builtin cannot fail");
}

pub fn register_all(heap: &mut Heap, env: Value) {
    pairs::register(heap, env);
    predicates::register(heap, env);
    arithmetic::register(heap, env);
    vectors::register(heap, env);
    io::register(heap, env);
    introspection::register(heap, env);
    exec::register(heap, env);
}
