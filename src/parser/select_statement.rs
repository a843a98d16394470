use crate::{aggregator::AggregateRegistry, parser::ParseNode, schema::normalize_identifier};

/// One entry of the SELECT list.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasedNode {
    pub node: ParseNode,
    pub alias: Option<String>,
    /// The alias was written quoted.
    pub case_sensitive: bool,
}

impl AliasedNode {
    pub fn new(node: ParseNode) -> Self {
        Self { node, alias: None, case_sensitive: false }
    }

    pub fn aliased(node: ParseNode, alias: &str) -> Self {
        Self { node, alias: Some(normalize_identifier(alias, false)), case_sensitive: false }
    }

    pub fn quoted_alias(node: ParseNode, alias: &str) -> Self {
        Self { node, alias: Some(alias.to_string()), case_sensitive: true }
    }

    /// Case sensitivity contributed by the alias; an absent alias does not
    /// restrict the projector.
    pub fn alias_case_sensitive(&self) -> bool {
        self.alias.is_none() || self.case_sensitive
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectStatement {
    pub select: Vec<AliasedNode>,
    pub group_by: Vec<ParseNode>,
    /// Statement aggregates rows: it calls an aggregate function in its
    /// select list or has a GROUP BY clause.
    pub is_aggregate: bool,
}

impl SelectStatement {
    pub fn new(select: Vec<AliasedNode>, group_by: Vec<ParseNode>) -> Self {
        let registry = AggregateRegistry::shared();
        let is_aggregate = !group_by.is_empty()
            || select.iter().any(|item| Self::contains_aggregate(&item.node, registry));
        Self { select, group_by, is_aggregate }
    }

    pub fn with_aggregate(mut self, is_aggregate: bool) -> Self {
        self.is_aggregate = is_aggregate;
        self
    }

    pub fn contains_aggregate(node: &ParseNode, registry: &AggregateRegistry) -> bool {
        match node {
            ParseNode::Function(f) if registry.get(&f.name).is_some() => true,
            other => other.children().into_iter().any(|c| Self::contains_aggregate(c, registry)),
        }
    }
}
