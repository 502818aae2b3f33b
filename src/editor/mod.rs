mod buffer;
mod core;
mod raw_mode;

pub use self::core::LineEditor;
