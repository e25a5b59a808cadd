//! VolleyTag State Library
//!
//! This crate provides the match state engine behind live volleyball video
//! tagging.
//!
//! # Overview
//!
//! The state module provides:
//!
//! - **Zone Classification** - Maps a point on the rendered full court to one of
//!   the six rotational zones, respecting each half's numbering.
//!
//! - **Rosters** - Teams with unique jersey numbers, numeric ordering, and roles
//!   remembered per team name across sessions.
//!
//! - **Rotation** - Six zones plus a libero slot, with the libero swap rules.
//!
//! - **Event Recording** - Validates a pending tag, resolves its zones and
//!   appends an immutable event to the log.
//!
//! - **Match State** - Score, serve possession and side-out rotation derived
//!   from each committed event.
//!
//! # Design Principles
//!
//! 1. **Transitions return new values** - `apply_result` and `rotate` never
//!    mutate their input, so prior states can be kept for undo.
//!
//! 2. **Rejections are values** - Invalid commits and roster conflicts come
//!    back as errors and leave state untouched.
//!
//! 3. **No storage medium** - Persistence goes through the `KeyValueStore`
//!    capability supplied by the caller.
//!
//! 4. **Serialization-ready** - Snapshots, teams and events are plain JSON.
//!
//! # Example
//!
//! ```rust
//! use volleytag_state::state::{
//!     MemoryStore, RallyResult, Score, Side, Skill, TaggingSession,
//! };
//!
//! let mut session = TaggingSession::new(MemoryStore::new());
//! session.set_team_name(Side::Home, "Neihu");
//! session.add_player(Side::Home, "7", "Kuo").unwrap();
//!
//! // Tag a kill by home #7
//! session.pending_mut().select_player(Side::Home, "7");
//! session.pending_mut().select_skill(Skill::Attack);
//! session.commit(RallyResult::Point, 42.0).unwrap();
//!
//! assert_eq!(session.score(), Score::new(1, 0));
//! assert_eq!(session.serving(), Side::Home);
//! ```

pub mod state;

// Re-export everything from state module at crate root
pub use state::*;
