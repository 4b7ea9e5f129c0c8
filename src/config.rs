// ABOUTME: Version and REPL welcome banner constants

pub const VERSION: &str = "1.0.0";
pub const WELCOME_MESSAGE: &str = "uscheme interpreter v1.0";
pub const WELCOME_SUBTITLE: &str = "A small Scheme-like interpreter with tail calls and a tracing mark-and-sweep collector";
