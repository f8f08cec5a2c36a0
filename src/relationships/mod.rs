//! Scene relationship graph: edge inference, rebuild and clusters.

mod analyzers;
mod cluster;
mod engine;

pub use analyzers::{crossover_edge, graph_connection_edge, shared_members_edge, MemberKey};
pub use cluster::SceneCluster;
pub use engine::{RebuildReport, RelationshipEngine};
