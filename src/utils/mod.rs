pub mod constants;
pub mod filename;
pub mod logging;
pub mod progress;
pub mod settings;

pub use constants::*;
pub use filename::{default_output_path, generate_output_filename};
pub use logging::init_logging;
pub use progress::ProgressReporter;
pub use settings::Settings;
