/// helpers shared by tests, benches and demos
pub mod utils;
