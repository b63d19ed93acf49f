//! # Two-role session protocol
//!
//! ```text
//! initiator                              responder
//!   share_i  -------------------------->
//!            <--------------------------  share_r
//!   secret, scheme                        secret, scheme
//!   pad / substitute / transpose
//!   ciphertext ------------------------>
//!                                         reverse_transpose / reverse_substitute
//! ```
//!
//! [`Initiator`] and [`Responder`] are sans-IO state machines;
//! [`run_initiator`], [`run_responder`] and [`serve`] drive them over a
//! [`transport::Channel`].

pub mod agreement;
pub mod config;
pub mod error;
pub mod initiator;
pub mod responder;
pub mod server;
pub mod state;

pub use agreement::Agreement;
pub use config::{SessionConfig, DEFAULT_COMPOSE_TIMEOUT};
pub use error::{SessionError, SessionResult};
pub use initiator::{run_initiator, run_initiator_with, Initiator, InitiatorReport, Sealed};
pub use responder::{run_responder, run_responder_with, Opened, Responder, ResponderReport};
pub use server::{serve, SessionOutcome};
pub use state::{InitiatorState, ResponderState};
