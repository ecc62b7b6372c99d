pub mod actuarial;
pub mod band;
pub mod composition;
mod error;
pub mod session;

pub use actuarial::{Adjustment, SCORE_CEILING, SCORE_FLOOR, Weight, adjust, sweep};
pub use band::RiskBand;
pub use composition::{ActuarialLine, ScoreComposition};
pub use error::ActuarialError;
pub use session::{Analysis, Session};
