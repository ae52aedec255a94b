//! Headless test harness for auditview.
//!
//! [`SimDriver`] stands in for the terminal so the production
//! [`auditview_app::Runtime`] can be driven and observed from tests, and
//! [`Pipeline`] wires it to a real socket listener for end-to-end runs.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod pipeline;
pub mod sim_driver;

pub use pipeline::Pipeline;
pub use sim_driver::{Frame, SimDriver, SimDriverError, SimHandle, sim_driver};
