//! Update operations.

use sparql_model::{NamedNode, Quad};

use crate::operator::GraphPattern;
use crate::pattern::QuadPattern;

/// The target graph(s) of a `CLEAR` (or `DROP`) operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphTarget {
    /// The default graph only.
    Default,
    /// One named graph.
    Named(NamedNode),
    /// Every named graph (not the default graph).
    AllNamed,
    /// The default graph and every named graph.
    All,
}

/// One SPARQL Update operation.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOperation {
    /// `INSERT DATA`: ground quads to insert as-is.
    InsertData(Vec<Quad>),
    /// `DELETE DATA`: ground quads to delete as-is.
    DeleteData(Vec<Quad>),
    /// `DELETE WHERE`: execute `patterns` as a query and delete each
    /// matched triple.
    DeleteWhere(Vec<QuadPattern>),
    /// `INSERT WHERE` / `MODIFY`: execute `pattern` once, then delete
    /// `delete_template` instantiations before inserting `insert_template`
    /// instantiations, per solution.
    Modify {
        /// Quad template to delete per solution (empty for `INSERT WHERE`).
        delete_template: Vec<QuadPattern>,
        /// Quad template to insert per solution (empty for plain `DELETE WHERE`).
        insert_template: Vec<QuadPattern>,
        /// The pattern supplying solutions.
        pattern: GraphPattern,
    },
    /// `CLEAR`: delete every triple in the target graph(s).
    Clear(GraphTarget),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_default_is_distinct_from_clear_all() {
        assert_ne!(GraphTarget::Default, GraphTarget::All);
    }
}
