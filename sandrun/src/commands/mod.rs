pub mod generate;
pub mod registry;
pub mod run;
