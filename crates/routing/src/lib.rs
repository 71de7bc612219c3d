//! Backend routing and fallback for Warden.
//!
//! Routing decides which backend handles the next model request; the
//! fallback controller decides what happens when that backend fails.
//!
//! - [`strategy`]: the routing contract plus the default, fallback and
//!   override strategies
//! - [`classifier`]: asks a small backend whether the request is simple
//! - [`composite`]: chains strategies, first decision wins
//! - [`router`]: the session's standard chain
//! - [`session`]: per-session active-backend selection
//! - [`fallback`]: interactive retry / stop / auth handling on failure

pub mod classifier;
pub mod composite;
pub mod fallback;
pub mod router;
pub mod session;
pub mod strategy;

pub use classifier::ClassifierStrategy;
pub use composite::CompositeStrategy;
pub use fallback::{
    FallbackController, FallbackError, FallbackHandler, FallbackIntent, FallbackResolution,
};
pub use router::ModelRouter;
pub use session::ModelSession;
pub use strategy::{
    DefaultStrategy, FallbackStrategy, OverrideStrategy, RoutingContext, RoutingDecision,
    RoutingMetadata, RoutingStrategy, TerminalStrategy,
};
