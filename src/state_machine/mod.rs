// State machines for order item shipment status and label lifecycle.
//
// Transitions are pure: they validate an event against the current state and guards, and
// only mutate the entity when every check passes. The ledger uses the same machines to
// validate rows it has locked inside a transaction.

pub mod errors;
pub mod events;
pub mod guards;
pub mod item_state_machine;
pub mod label_state_machine;
pub mod states;

// Re-export main types for convenient access
pub use errors::{StateMachineError, StateMachineResult};
pub use events::{ItemEvent, LabelEvent};
pub use guards::StateGuard;
pub use item_state_machine::ItemStateMachine;
pub use label_state_machine::LabelStateMachine;
pub use states::{ItemStatus, LabelStatus};
