#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

pub mod assembly;
pub mod graphs;
pub mod read_threading;
pub mod reads;
pub mod smith_waterman;
pub mod utils;
