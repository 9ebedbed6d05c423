//! # Simulation
//!
//! $$
//! S_{t+\Delta t}=S_t\exp\!\left((\mu-\tfrac12\sigma^2)\Delta t+\sigma\,\Delta X_t\right)
//! $$
//!
//! Forward price-path simulators. Every model implements
//! [`ProcessExt`](crate::traits::ProcessExt), so `sample_par(m)` draws `m`
//! paths on the rayon pool.
//!
//! | Model            | Increment `ΔX`                         |
//! |------------------|----------------------------------------|
//! | [`Gbm`]          | Gaussian                               |
//! | [`LevyFlight`]   | Student-t, `df = alpha`                |
//! | [`AlphaStable`]  | symmetric α-stable (CMS)               |
//! | [`CoxJump`]      | Gaussian plus `theta·N(0, kappa²)`     |
//! | [`RandomWalk`]   | ±1                                     |
//! | [`Heston`]       | stochastic variance, correlated noise  |
//! | [`Cir`]          | square-root mean reversion             |
//! | [`Vasicek`]      | Ornstein–Uhlenbeck                     |

pub mod cir;
pub mod cox;
pub mod forecast;
pub mod gbm;
pub mod heston;
pub mod levy;
pub mod noise;
pub mod random_walk;
pub mod stable;
pub mod vasicek;

pub use cir::Cir;
pub use cox::CoxJump;
pub use forecast::calibrate;
pub use forecast::ForecastConfig;
pub use forecast::ForecastModel;
pub use forecast::PriceForecast;
pub use gbm::Gbm;
pub use heston::Heston;
pub use levy::LevyFlight;
pub use noise::Cgns;
pub use noise::Gn;
pub use random_walk::RandomWalk;
pub use stable::AlphaStable;
pub use vasicek::Vasicek;
