// Domain models for the medical compliance engine

pub mod availability;
pub mod clearance;
pub mod injury;
pub mod load;
pub mod recovery;
pub mod restriction;
pub mod risk;
pub mod wellness;

pub use availability::*;
pub use clearance::*;
pub use injury::*;
pub use load::*;
pub use recovery::*;
pub use restriction::*;
pub use risk::*;
pub use wellness::*;
