//! Mathematical utilities: moments, order statistics, and least squares.

pub mod moments;
pub mod ols;
pub mod quantile;

pub use moments::*;
pub use ols::*;
pub use quantile::*;
