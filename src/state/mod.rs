//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `AccountId` / `MatchId`: opaque identifiers for the two linked entity kinds
//! - `Frontier`: seen-set plus FIFO queue, instantiated once per entity kind
//! - `CrawlState`: both frontiers, the request window, counters and the lifecycle phase

mod crawl_state;
mod frontier;
mod ids;

// Re-export main types
pub use crawl_state::{CrawlPhase, CrawlState, RateWindow};
pub use frontier::{EmptyFrontier, Frontier};
pub use ids::{AccountId, EntityId, EntityKind, MatchId};
