use std::fmt;

use thiserror::Error;

use crate::basic_types::VertexMapping;
use crate::containers::BitSet;
use crate::engine::domains::Domain;
use crate::engine::domains::Domains;

/// A vertex index paired with its human-readable name, as used in proof
/// events.
pub type NamedVertex = (usize, String);

/// The largest number of parallel graph pairs a model can carry; adjacency
/// between a pair of pattern vertices is summarised as one bit per graph.
pub const MAX_GRAPHS: usize = u32::BITS as usize;

/// The immutable input to a solve: the pattern graph, the target graph, and
/// everything precomputed about them.
///
/// Graph 0 holds the raw adjacency; graphs `1..max_graphs` are supplemental
/// filter graphs whose rows are intersected with a domain whenever the
/// corresponding adjacency bit is set for a pattern pair. For directed models
/// the target additionally carries separate out-neighbour and in-neighbour
/// rows.
///
/// A model is constructed through [`ModelBuilder`] and never changes
/// afterwards; the searcher only ever reads from it.
pub struct Model {
    pattern_size: usize,
    target_size: usize,
    max_graphs: usize,
    pattern_link_count: usize,
    directed: bool,
    has_edge_labels: bool,
    /// Indexed by `graph * pattern_size + vertex`; row 0 is the undirected
    /// neighbourhood view even for directed models.
    pattern_graph_rows: Vec<BitSet>,
    /// Indexed by `graph * target_size + vertex`; row 0 is the undirected
    /// neighbourhood view even for directed models.
    target_graph_rows: Vec<BitSet>,
    /// Out-neighbours per target vertex; empty unless the model is directed.
    forward_target_rows: Vec<BitSet>,
    /// In-neighbours per target vertex; empty unless the model is directed.
    reverse_target_rows: Vec<BitSet>,
    /// One bit per graph, indexed by `u * pattern_size + v`.
    adjacency_bits: Vec<u32>,
    pattern_degrees: Vec<usize>,
    target_degrees: Vec<usize>,
    largest_target_degree: usize,
    pattern_edge_labels: Vec<u32>,
    target_edge_labels: Vec<u32>,
    less_thans: Vec<(usize, usize)>,
    pattern_names: Vec<String>,
    target_names: Vec<String>,
    #[allow(clippy::type_complexity)]
    extra_bigraph_constraints: Option<Box<dyn Fn(&VertexMapping) -> bool>>,
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("pattern_size", &self.pattern_size)
            .field("target_size", &self.target_size)
            .field("max_graphs", &self.max_graphs)
            .field("directed", &self.directed)
            .field("has_edge_labels", &self.has_edge_labels)
            .finish()
    }
}

impl Model {
    pub fn pattern_size(&self) -> usize {
        self.pattern_size
    }

    pub fn target_size(&self) -> usize {
        self.target_size
    }

    pub fn max_graphs(&self) -> usize {
        self.max_graphs
    }

    /// The number of trailing pattern vertices which act as anchors when
    /// enumerating under extra bigraph constraints.
    pub fn pattern_link_count(&self) -> usize {
        self.pattern_link_count
    }

    pub fn directed(&self) -> bool {
        self.directed
    }

    pub fn has_edge_labels(&self) -> bool {
        self.has_edge_labels
    }

    pub fn has_less_thans(&self) -> bool {
        !self.less_thans.is_empty()
    }

    pub fn largest_target_degree(&self) -> usize {
        self.largest_target_degree
    }

    pub fn pattern_graph_row(&self, graph: usize, vertex: usize) -> &BitSet {
        &self.pattern_graph_rows[graph * self.pattern_size + vertex]
    }

    pub fn target_graph_row(&self, graph: usize, vertex: usize) -> &BitSet {
        &self.target_graph_rows[graph * self.target_size + vertex]
    }

    /// The out-neighbours of a target vertex; only meaningful for directed
    /// models.
    pub fn forward_target_graph_row(&self, vertex: usize) -> &BitSet {
        &self.forward_target_rows[vertex]
    }

    /// The in-neighbours of a target vertex; only meaningful for directed
    /// models.
    pub fn reverse_target_graph_row(&self, vertex: usize) -> &BitSet {
        &self.reverse_target_rows[vertex]
    }

    /// One bit per graph pair: bit `g` is set when the two pattern vertices
    /// are adjacent in graph `g`. For directed models bit 0 records the
    /// `u -> v` direction only.
    pub fn pattern_adjacency_bits(&self, u: usize, v: usize) -> u32 {
        self.adjacency_bits[u * self.pattern_size + v]
    }

    pub fn pattern_degree(&self, vertex: usize) -> usize {
        self.pattern_degrees[vertex]
    }

    pub fn target_degree(&self, vertex: usize) -> usize {
        self.target_degrees[vertex]
    }

    pub fn pattern_edge_label(&self, u: usize, v: usize) -> u32 {
        self.pattern_edge_labels[u * self.pattern_size + v]
    }

    pub fn target_edge_label(&self, u: usize, v: usize) -> u32 {
        self.target_edge_labels[u * self.target_size + v]
    }

    /// The ordered-vertex constraints: each pair `(a, b)` requires the target
    /// vertex chosen for `a` to be strictly smaller than the one chosen for
    /// `b`. Both propagation sweeps visit the pairs in this order.
    pub fn pattern_less_thans(&self) -> &[(usize, usize)] {
        &self.less_thans
    }

    pub fn pattern_vertex_for_proof(&self, vertex: usize) -> NamedVertex {
        (vertex, self.pattern_names[vertex].clone())
    }

    pub fn target_vertex_for_proof(&self, vertex: usize) -> NamedVertex {
        (vertex, self.target_names[vertex].clone())
    }

    /// Runs the extra bigraph constraint check over a complete mapping.
    /// Models without such constraints accept every mapping.
    pub fn check_extra_bigraph_constraints(&self, mapping: &VertexMapping) -> bool {
        match &self.extra_bigraph_constraints {
            Some(check) => check(mapping),
            None => true,
        }
    }

    /// The domains the search starts from: every target vertex is a candidate
    /// for every pattern vertex.
    pub(crate) fn initial_domains(&self) -> Domains {
        (0..self.pattern_size)
            .map(|vertex| Domain::new(vertex, BitSet::full(self.target_size)))
            .collect()
    }
}

/// The ways constructing a [`Model`] can fail.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelBuildError {
    #[error("pattern vertex {vertex} is out of range for a pattern of {size} vertices")]
    PatternVertexOutOfRange { vertex: usize, size: usize },
    #[error("target vertex {vertex} is out of range for a target of {size} vertices")]
    TargetVertexOutOfRange { vertex: usize, size: usize },
    #[error("edge labels are only supported on directed models")]
    EdgeLabelsRequireDirected,
    #[error("{num_graphs} graph pairs exceed the supported maximum")]
    TooManyGraphs { num_graphs: usize },
    #[error("link count {link_count} exceeds the pattern size {size}")]
    LinkCountOutOfRange { link_count: usize, size: usize },
    #[error("expected {expected} vertex names but got {actual}")]
    WrongNumberOfNames { expected: usize, actual: usize },
}

#[derive(Clone, Copy, Debug)]
struct EdgeSpec {
    from: usize,
    to: usize,
    label: Option<u32>,
}

/// Builds a [`Model`] from edge lists, validating the input and precomputing
/// the bitset rows, degrees, and adjacency bits the search reads.
#[derive(Default)]
pub struct ModelBuilder {
    pattern_size: usize,
    target_size: usize,
    directed: bool,
    pattern_link_count: usize,
    pattern_edges: Vec<EdgeSpec>,
    target_edges: Vec<EdgeSpec>,
    /// Each entry is one supplemental filter graph: pattern pairs and target
    /// pairs, both treated as undirected.
    supplemental_graphs: Vec<(Vec<(usize, usize)>, Vec<(usize, usize)>)>,
    less_thans: Vec<(usize, usize)>,
    pattern_names: Option<Vec<String>>,
    target_names: Option<Vec<String>>,
    #[allow(clippy::type_complexity)]
    extra_bigraph_constraints: Option<Box<dyn Fn(&VertexMapping) -> bool>>,
}

impl fmt::Debug for ModelBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBuilder")
            .field("pattern_size", &self.pattern_size)
            .field("target_size", &self.target_size)
            .field("directed", &self.directed)
            .finish()
    }
}

impl ModelBuilder {
    pub fn new(pattern_size: usize, target_size: usize) -> ModelBuilder {
        ModelBuilder {
            pattern_size,
            target_size,
            ..Default::default()
        }
    }

    /// Treat both graphs as directed; edges run from their first vertex to
    /// their second.
    pub fn directed(mut self) -> ModelBuilder {
        self.directed = true;
        self
    }

    pub fn add_pattern_edge(mut self, from: usize, to: usize) -> ModelBuilder {
        self.pattern_edges.push(EdgeSpec {
            from,
            to,
            label: None,
        });
        self
    }

    pub fn add_target_edge(mut self, from: usize, to: usize) -> ModelBuilder {
        self.target_edges.push(EdgeSpec {
            from,
            to,
            label: None,
        });
        self
    }

    pub fn add_labelled_pattern_edge(mut self, from: usize, to: usize, label: u32) -> ModelBuilder {
        self.pattern_edges.push(EdgeSpec {
            from,
            to,
            label: Some(label),
        });
        self
    }

    pub fn add_labelled_target_edge(mut self, from: usize, to: usize, label: u32) -> ModelBuilder {
        self.target_edges.push(EdgeSpec {
            from,
            to,
            label: Some(label),
        });
        self
    }

    /// Adds one supplemental filter graph. Whenever a pattern pair is
    /// adjacent in it, branching on one of the two restricts the other to the
    /// corresponding target row. Both edge lists are treated as undirected.
    pub fn add_supplemental_graph(
        mut self,
        pattern_edges: Vec<(usize, usize)>,
        target_edges: Vec<(usize, usize)>,
    ) -> ModelBuilder {
        self.supplemental_graphs.push((pattern_edges, target_edges));
        self
    }

    /// Requires the target vertex chosen for `a` to be strictly smaller than
    /// the one chosen for `b`.
    pub fn add_pattern_less_than(mut self, a: usize, b: usize) -> ModelBuilder {
        self.less_thans.push((a, b));
        self
    }

    /// Marks the trailing `link_count` pattern vertices as anchors for
    /// bigraph enumeration.
    pub fn pattern_link_count(mut self, link_count: usize) -> ModelBuilder {
        self.pattern_link_count = link_count;
        self
    }

    pub fn pattern_names(mut self, names: Vec<String>) -> ModelBuilder {
        self.pattern_names = Some(names);
        self
    }

    pub fn target_names(mut self, names: Vec<String>) -> ModelBuilder {
        self.target_names = Some(names);
        self
    }

    /// Installs a check which every complete mapping must pass before being
    /// reported, used by the bigraph extension.
    pub fn extra_bigraph_constraints(
        mut self,
        check: impl Fn(&VertexMapping) -> bool + 'static,
    ) -> ModelBuilder {
        self.extra_bigraph_constraints = Some(Box::new(check));
        self
    }

    pub fn build(self) -> Result<Model, ModelBuildError> {
        let pattern_size = self.pattern_size;
        let target_size = self.target_size;

        let check_pattern_vertex = |vertex: usize| {
            if vertex >= pattern_size {
                Err(ModelBuildError::PatternVertexOutOfRange {
                    vertex,
                    size: pattern_size,
                })
            } else {
                Ok(())
            }
        };
        let check_target_vertex = |vertex: usize| {
            if vertex >= target_size {
                Err(ModelBuildError::TargetVertexOutOfRange {
                    vertex,
                    size: target_size,
                })
            } else {
                Ok(())
            }
        };

        let num_graphs = 1 + self.supplemental_graphs.len();
        if num_graphs > MAX_GRAPHS {
            return Err(ModelBuildError::TooManyGraphs { num_graphs });
        }
        if self.pattern_link_count > pattern_size {
            return Err(ModelBuildError::LinkCountOutOfRange {
                link_count: self.pattern_link_count,
                size: pattern_size,
            });
        }

        let has_edge_labels = self
            .pattern_edges
            .iter()
            .chain(self.target_edges.iter())
            .any(|edge| edge.label.is_some());
        if has_edge_labels && !self.directed {
            return Err(ModelBuildError::EdgeLabelsRequireDirected);
        }

        let mut pattern_graph_rows = vec![BitSet::new(pattern_size); num_graphs * pattern_size];
        let mut target_graph_rows = vec![BitSet::new(target_size); num_graphs * target_size];
        let mut adjacency_bits = vec![0u32; pattern_size * pattern_size];
        let mut pattern_edge_labels = vec![0u32; pattern_size * pattern_size];
        let mut target_edge_labels = vec![0u32; target_size * target_size];

        let mut forward_target_rows = Vec::new();
        let mut reverse_target_rows = Vec::new();
        if self.directed {
            forward_target_rows = vec![BitSet::new(target_size); target_size];
            reverse_target_rows = vec![BitSet::new(target_size); target_size];
        }

        for edge in &self.pattern_edges {
            check_pattern_vertex(edge.from)?;
            check_pattern_vertex(edge.to)?;

            // Row 0 is the undirected neighbourhood view in both modes.
            pattern_graph_rows[edge.from].set(edge.to);
            pattern_graph_rows[edge.to].set(edge.from);

            adjacency_bits[edge.from * pattern_size + edge.to] |= 1;
            if !self.directed {
                adjacency_bits[edge.to * pattern_size + edge.from] |= 1;
            }
            if let Some(label) = edge.label {
                pattern_edge_labels[edge.from * pattern_size + edge.to] = label;
            }
        }

        for edge in &self.target_edges {
            check_target_vertex(edge.from)?;
            check_target_vertex(edge.to)?;

            target_graph_rows[edge.from].set(edge.to);
            target_graph_rows[edge.to].set(edge.from);

            if self.directed {
                forward_target_rows[edge.from].set(edge.to);
                reverse_target_rows[edge.to].set(edge.from);
            }
            if let Some(label) = edge.label {
                target_edge_labels[edge.from * target_size + edge.to] = label;
            }
        }

        for (graph, (pattern_pairs, target_pairs)) in self.supplemental_graphs.iter().enumerate() {
            let graph = graph + 1;
            for &(u, v) in pattern_pairs {
                check_pattern_vertex(u)?;
                check_pattern_vertex(v)?;
                pattern_graph_rows[graph * pattern_size + u].set(v);
                pattern_graph_rows[graph * pattern_size + v].set(u);
                adjacency_bits[u * pattern_size + v] |= 1 << graph;
                adjacency_bits[v * pattern_size + u] |= 1 << graph;
            }
            for &(u, v) in target_pairs {
                check_target_vertex(u)?;
                check_target_vertex(v)?;
                target_graph_rows[graph * target_size + u].set(v);
                target_graph_rows[graph * target_size + v].set(u);
            }
        }

        for &(a, b) in &self.less_thans {
            check_pattern_vertex(a)?;
            check_pattern_vertex(b)?;
        }

        let pattern_degrees: Vec<usize> = (0..pattern_size)
            .map(|vertex| pattern_graph_rows[vertex].count())
            .collect();
        let target_degrees: Vec<usize> = (0..target_size)
            .map(|vertex| target_graph_rows[vertex].count())
            .collect();
        let largest_target_degree = target_degrees.iter().copied().max().unwrap_or(0);

        let pattern_names = match self.pattern_names {
            Some(names) if names.len() != pattern_size => {
                return Err(ModelBuildError::WrongNumberOfNames {
                    expected: pattern_size,
                    actual: names.len(),
                })
            }
            Some(names) => names,
            None => (0..pattern_size).map(|vertex| vertex.to_string()).collect(),
        };
        let target_names = match self.target_names {
            Some(names) if names.len() != target_size => {
                return Err(ModelBuildError::WrongNumberOfNames {
                    expected: target_size,
                    actual: names.len(),
                })
            }
            Some(names) => names,
            None => (0..target_size).map(|vertex| vertex.to_string()).collect(),
        };

        Ok(Model {
            pattern_size,
            target_size,
            max_graphs: num_graphs,
            pattern_link_count: self.pattern_link_count,
            directed: self.directed,
            has_edge_labels,
            pattern_graph_rows,
            target_graph_rows,
            forward_target_rows,
            reverse_target_rows,
            adjacency_bits,
            pattern_degrees,
            target_degrees,
            largest_target_degree,
            pattern_edge_labels,
            target_edge_labels,
            less_thans: self.less_thans,
            pattern_names,
            target_names,
            extra_bigraph_constraints: self.extra_bigraph_constraints,
        })
    }
}
