pub mod app;
pub mod audio;
pub mod chooser;
pub mod controller;
pub mod sessions;
pub mod ticker;
pub mod ui;
pub mod video;

use std::error::Error;

pub fn run(file: Option<&str>) -> Result<(), Box<dyn Error>> {
    app::run_with_file(file)
}
