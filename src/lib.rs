pub mod archive;
pub mod assemble;
pub mod cli;
pub mod config;
pub mod engine;
pub mod extenso;
pub mod extract;
pub mod identity;
pub mod intake;
pub mod money;
pub mod pipeline;
pub mod recalc;
pub mod records;
pub mod redact;
pub mod report;
pub mod util;
