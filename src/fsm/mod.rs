//! The two state machines at the heart of the control loop: the threshold
//! FSM (§4.E) and the auto-recovery FSM (§4.F).
//!
//! Both are hand-rolled rather than built on a generic state-table engine:
//! their phases make synchronous, side-effecting calls into the sensor
//! pipeline and the actuator port mid-transition (`WATER_CHECK`'s five
//! spaced samples, `EC_CHECK`'s retry loop), which doesn't fit a pure
//! `fn(&mut Context) -> Option<NextState>` update signature cleanly.

pub mod recovery;
pub mod threshold;
