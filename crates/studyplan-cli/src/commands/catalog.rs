use studyplan_core::plan::catalog::{CLASS_LEVELS, STREAMS};

use super::CmdResult;

pub fn run() -> CmdResult {
    println!("Class levels:");
    for level in CLASS_LEVELS {
        let note = if level.needs_stream() {
            "  (requires --stream)"
        } else {
            ""
        };
        println!("  {:<14} {}{note}", level.value, level.label);
    }
    println!("Streams:");
    for stream in STREAMS {
        println!("  {:<14} {}", stream.value, stream.label);
    }
    Ok(())
}
