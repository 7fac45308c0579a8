// Validation, timeouts and errors shared by the actions
pub mod constants;
mod errors;
mod timeout;
mod wait_for_element;

pub use errors::{ActionError, ActionResult};
pub use timeout::{
    MAX_INTERACTION_TIMEOUT_MS, MAX_NAVIGATION_TIMEOUT_MS, bounded, validate_interaction_timeout,
    validate_navigation_timeout,
};
pub use wait_for_element::wait_for_selector;
