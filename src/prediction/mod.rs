pub mod assemble;
pub mod error;
pub mod model;
pub mod retry;

pub use assemble::assemble;
pub use error::PredictError;
pub use model::PredictionResult;
pub use retry::RetryPolicy;
