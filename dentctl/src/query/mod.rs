//! Query and mutation layer.
//!
//! Reads are keyed by [`QueryKey`] (entity name plus every parameter that affects the result) and
//! served from one shared [`QueryClient`] cache. Writes run through [`Mutation`] and never touch
//! cached reads; consumers invalidate explicitly.

pub mod cache;
pub mod key;
pub mod mutation;
pub mod resource;
pub mod state;

pub use cache::QueryClient;
pub use key::QueryKey;
pub use mutation::{Mutation, MutationState};
pub use resource::{QueryResult, ResourceQueries};
pub use state::{QueryObserver, QueryState, Ticket};
