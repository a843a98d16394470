use std::collections::HashMap;

use crate::scan::ReadSet;

/// Storage scan request as seen by the compiler: the families and columns
/// to read plus opaque attributes for server-side stages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scan {
    read_set: ReadSet,
    attributes: HashMap<String, Vec<u8>>,
}

impl Scan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_set(&self) -> &ReadSet {
        &self.read_set
    }

    pub fn set_read_set(&mut self, read_set: ReadSet) {
        self.read_set = read_set;
    }

    pub fn set_attribute(&mut self, name: &str, value: Vec<u8>) {
        self.attributes.insert(name.to_string(), value);
    }

    pub fn attribute(&self, name: &str) -> Option<&[u8]> {
        self.attributes.get(name).map(Vec::as_slice)
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<Vec<u8>> {
        self.attributes.remove(name)
    }
}
