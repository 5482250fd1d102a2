//! Classboard Core Library
//!
//! Scene graph, zone containment and layout, undo history and the peer sync
//! contract for the classroom whiteboard.

pub mod arrange;
pub mod board;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod history;
pub mod layout;
pub mod objects;
pub mod placement;
pub mod scene;
pub mod storage;
pub mod sync;
pub mod viewport;

pub use arrange::{AlignEdge, Axis};
pub use board::{Board, BoardRecord};
pub use config::{BoardConfig, LayoutConfig, PlacementConfig};
pub use error::{BoardError, BoardResult};
pub use history::History;
pub use layout::{Ghost, LayoutResult};
pub use objects::{InkStroke, ObjectId, SceneObject};
pub use scene::{ActivityMode, SceneStore};
pub use sync::{Outbox, SyncMessage, Transport};
pub use viewport::Viewport;
