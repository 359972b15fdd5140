pub mod database;
pub mod setting;
pub mod util;

pub const CLI_NAME: &str = "fyyur";

// logging constants
pub const FYYUR_LOGLEVEL: &str = "FYYUR_LOGLEVEL";
