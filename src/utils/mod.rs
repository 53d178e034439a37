// region --- Modules

pub mod cli;
pub mod files;

// endregion --- Modules
