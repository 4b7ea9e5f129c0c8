// ABOUTME: Process-control primitives

use super::def;
use crate::error::EvalError;
use crate::heap::Heap;
use crate::value::Value;

fn exit(_heap: &mut Heap, args: &[Value]) -> Result<Value, EvalError> {
    let code = args.first().and_then(Value::as_int).unwrap_or(0);
    std::process::exit(code as i32);
}

pub fn register(heap: &mut Heap, env: Value) {
    def(heap, env, "exit", exit);
}
