//! Hardware and network abstraction traits
//!
//! These traits define the interface between the application logic
//! and board-specific implementations (TCP stack, buttons, clock).

pub mod input;
pub mod net;
pub mod source;

pub use input::{Button, ButtonSet, Buttons, Clock};
pub use net::{Connection, Connector, Scheme};
pub use source::ChunkSource;
