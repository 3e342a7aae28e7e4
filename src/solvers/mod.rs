pub mod flux;
pub mod fofc;
pub mod update;
