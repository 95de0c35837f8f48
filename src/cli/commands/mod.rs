pub mod run;

pub use run::{render_dry_run, RunCommand};
