// NOTE: Tree representation
//
// The build tree is an arena: every node lives in one Vec and refers to its
// parent and children by `NodeId`. A node has at most one parent for its
// whole lifetime; `Tree::attach` refuses to re-parent. Node behavior that
// varies per kind (titles, relevance, durations) is an exhaustive match on
// `NodeKind` instead of per-type overrides.

pub mod arena;
pub mod kind;
pub mod node;
pub mod observer;
pub mod render;
pub mod selection;

pub use arena::*;
pub use kind::*;
pub use node::*;
pub use observer::*;
pub use render::duration_text;
pub use selection::*;
