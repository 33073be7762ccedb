// Library exports for testing and potential library use

pub mod cli;
pub mod debug;
pub mod lang_model;

pub use lang_model::{InstallReport, LangModel, LangModelError, RemoveReport, StatusReport};
