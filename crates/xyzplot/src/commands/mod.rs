pub mod axes;
pub mod completion;
pub mod config_cmd;
pub mod generate;
pub mod name;
pub mod params;
pub mod parse;
pub mod version;
