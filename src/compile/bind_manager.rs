use std::collections::BTreeMap;

use crate::{expression::Expression, schema::DataType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterMetaData {
    pub index: usize,
    /// None until something gives the parameter a type.
    pub data_type: Option<DataType>,
    pub nullable: bool,
}

/// Type information for the statement's bind parameters, consulted when
/// values are bound.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindManager {
    params: BTreeMap<usize, ParameterMetaData>,
}

impl BindManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_param_meta_data(&mut self, index: usize, expression: &Expression) {
        self.params.insert(index, ParameterMetaData {
            index,
            data_type: expression.data_type(),
            nullable: expression.is_nullable(),
        });
    }

    pub fn get(&self, index: usize) -> Option<&ParameterMetaData> {
        self.params.get(&index)
    }

    pub fn parameters(&self) -> impl Iterator<Item = &ParameterMetaData> {
        self.params.values()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
