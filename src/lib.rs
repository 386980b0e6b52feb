// qaops - Operational tooling for a SageMaker question-answering demo
// Library exports

pub mod config;
pub mod deploy;
pub mod errors;
pub mod predictor;
pub mod server;
pub mod sync;
