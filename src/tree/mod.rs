//! Folder → feed → item tree: the state it holds, how feed nodes load, and the
//! flattened rows the UI draws.

pub mod expansion;
pub mod node;
pub mod state;

pub use expansion::{Completion, ExpansionController, NodeState, Toggle};
pub use node::{visible_rows, NodeRef, Row, RowKind};
pub use state::TreeState;
