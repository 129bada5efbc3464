//! Fetches rendered pages through a FlareSolverr-style browser solving proxy.

mod fetcher;
mod transport;

pub use fetcher::{Delay, FetchPolicy, ResilientFetcher, TokioDelay};
pub use transport::{FlareSolverrTransport, SolveRequest, SolverTransport, decode_solution};
