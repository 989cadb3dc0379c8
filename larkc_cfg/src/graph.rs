use ahash::AHashMap;
use petgraph::graph::NodeIndex;

use larkc_core::BlockRef;

use crate::cfg::Cfg;
use crate::inst::InstData;

/// The block-level view of a CFG, one node per basic block.
pub type BlockGraph = petgraph::graph::Graph<BlockRef, CfgEdge>;

/// edge-type used to describe how blocks are connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CfgEdge {
    /// The single edge of an unconditional branch.
    Uncond,

    /// The taken edge of a conditional branch.
    True,

    /// The not-taken edge of a conditional branch.
    False,
}

/// Build the block graph of `cfg` from its terminators.
///
/// Open blocks and value-less terminators (return, unreachable) contribute
/// a node but no out-edges.
pub fn block_graph(cfg: &Cfg) -> BlockGraph {
    let mut graph = BlockGraph::new();
    let mut nodes: AHashMap<BlockRef, NodeIndex> = AHashMap::new();

    for (block, _) in cfg.blocks() {
        nodes.insert(block, graph.add_node(block));
    }

    for (block, _) in cfg.blocks() {
        let from = nodes[&block];

        match cfg.terminator_of(block).map(|term| cfg.inst(term).data()) {
            Some(InstData::Branch { dest, .. }) => {
                graph.add_edge(from, nodes[dest], CfgEdge::Uncond);
            }

            Some(InstData::CondBranch { targets, .. }) => {
                graph.add_edge(from, nodes[&targets[0]], CfgEdge::True);
                graph.add_edge(from, nodes[&targets[1]], CfgEdge::False);
            }

            _ => continue,
        }
    }

    graph
}
