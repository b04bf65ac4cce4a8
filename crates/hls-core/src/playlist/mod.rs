pub mod builder;
pub mod node;
pub mod tags;

pub use builder::{
    classify, variant_references, BuildError, ClassificationMode, TreeBuilder, VariantReference,
};
pub use node::{MasterPlaylist, NodeKind, Playlist, PlaylistNode};
pub use tags::{AttributeList, LineKind, Tag};
