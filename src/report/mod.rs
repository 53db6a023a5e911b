pub mod plot;
pub mod reporter;

pub use plot::render_curves;
pub use reporter::{checkpoint_file_name, run_timestamp, ReportPaths, RunReporter};
