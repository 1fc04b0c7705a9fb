//! Wave allocation domain models.
//!
//! Provides the input and output types shared by every solver.
//!
//! # Domain Mappings
//!
//! | u-waves | Warehouse | Generic |
//! |---------|-----------|---------|
//! | Carton | Box / tote | Item |
//! | SKU | Stock-keeping unit | Label |
//! | Wave | Picking wave | Capacity-bounded bin |
//! | Allocation | Wave plan | Item-to-bin map |

mod allocation;
mod carton;
mod instance;

pub use allocation::{Allocation, WaveAssignment};
pub use carton::{Carton, CartonItem};
pub use instance::{minimal_wave_count, InstanceData, ProblemInstance, DEFAULT_WAVE_CAPACITY};
