//! Schema provider seam

use crate::session::MappingRequest;
use mapforge_schema::TypeTable;
use serde::{Deserialize, Serialize};

/// Supplies the type table and the mappings to resolve
///
/// Implemented by whatever front end reads the user's declarations.
pub trait SchemaProvider {
    /// Descriptors of every type the requests mention
    fn table(&self) -> &TypeTable;

    /// Mappings to resolve, in declaration order
    fn requests(&self) -> Vec<MappingRequest>;
}

/// A provider whose contents are already in memory, typically decoded from JSON
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticSchema {
    /// Type table
    pub table: TypeTable,
    /// Requests
    #[serde(default)]
    pub requests: Vec<MappingRequest>,
}

impl StaticSchema {
    /// Create from a table with no requests
    #[inline]
    #[must_use]
    pub fn new(table: TypeTable) -> Self {
        Self {
            table,
            requests: Vec::new(),
        }
    }

    /// Add a request
    #[inline]
    #[must_use]
    pub fn with_request(mut self, request: MappingRequest) -> Self {
        self.requests.push(request);
        self
    }

    /// Decode from JSON
    ///
    /// # Errors
    /// Returns error for malformed input
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl SchemaProvider for StaticSchema {
    fn table(&self) -> &TypeTable {
        &self.table
    }

    fn requests(&self) -> Vec<MappingRequest> {
        self.requests.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapforge_test_utils::company;

    #[test]
    fn static_schema_round_trips_through_json() {
        let c = company();
        let schema =
            StaticSchema::new(c.table).with_request(MappingRequest::new(c.point, c.point_dto));
        let json = serde_json::to_string(&schema).unwrap();
        let decoded = StaticSchema::from_json(&json).unwrap();
        assert_eq!(decoded, schema);
        assert_eq!(decoded.requests().len(), 1);
    }
}
