//! Command pipelines: read tables, run the core, write results.

mod activity;
mod detect;
mod paths;

pub use activity::{ActivityResult, execute_diel, execute_monthly};
pub use detect::{DetectResult, execute as execute_detections};
pub use paths::{output_dir_for, output_path_for, resolve_output};
