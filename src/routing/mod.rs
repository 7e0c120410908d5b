//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path, query)
//!     → router.rs (route lookup)
//!     → matcher.rs (evaluate match conditions)
//!     → Return: Health | Describe | Forward(method, target) or NoMatch
//!
//! Route Compilation (at startup):
//!     RoutesConfig (prefixes, shortcuts) + built-in local routes
//!     → Compile matchers
//!     → Sort by precedence, then specificity
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (exact and prefix matching only)
//! - Deterministic: same input always matches same route
//! - First match wins (shortcuts always before the generic prefix rule)

pub mod matcher;
pub mod router;

pub use router::{ForwardPlan, RouteAction, RouteError, RouteMatch, RouteSummary, RouteTable};
