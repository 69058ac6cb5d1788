//! Graph analysis service: centrality scores, community detection, and
//! blind-spot heuristics over the merged graph.

pub mod centrality;
pub mod community;
pub mod report;
pub mod view;

pub use centrality::NodeCentrality;
pub use community::Community;
pub use report::{AnalysisReport, BlindSpot, BlindSpotKind, GraphAnalysisService, Severity};
pub use view::GraphView;
