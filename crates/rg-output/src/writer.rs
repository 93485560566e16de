//! The `GraphWriter` trait implemented by output backends.

use rg_place::Placement;
use rg_spatial::SpatialGraph;

use crate::OutputResult;

pub trait GraphWriter {
    /// Write every node and edge of `graph`.
    fn write_graph(&mut self, graph: &SpatialGraph) -> OutputResult<()>;

    /// Write the selected nodes of one placement, looked up in `graph`.
    fn write_placement(
        &mut self,
        strategy: &'static str,
        placement: &Placement,
        graph: &SpatialGraph,
    ) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
