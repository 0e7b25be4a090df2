//! In-memory collaborator adapters.
//!
//! Reference implementations of the `ports` traits, sufficient to run the
//! full execution path without a surrounding node. Production deployments
//! substitute their own token service, fee schedule, and record stream.

mod auto_creation;
mod historian;
mod scoped_check;
mod token_validity;

pub use auto_creation::SequentialAutoCreation;
pub use historian::InMemoryHistorian;
pub use scoped_check::AccountScopedCheck;
pub use token_validity::LocalTokenValidity;
