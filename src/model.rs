//! Schema registry: the named enums, records, type definitions and terms a
//! [`TypeRef`] can point at. Built by [`crate::lower::lower_schema`].

use indexmap::IndexMap;

use crate::ir::{EnumType, RecordType, Term, TypeDefinition, TypeRef};

#[derive(Debug, Clone, Default)]
pub struct Model {
    pub(crate) enums: IndexMap<String, EnumType>,
    pub(crate) records: IndexMap<String, RecordType>,
    pub(crate) type_definitions: IndexMap<String, TypeDefinition>,
    pub(crate) terms: IndexMap<String, Term>,
}

impl Model {
    pub fn new() -> Self { Self::default() }

    pub fn enum_type(&self, name: &str) -> Option<&EnumType> {
        self.enums.get(name)
    }

    pub fn record_type(&self, name: &str) -> Option<&RecordType> {
        self.records.get(name)
    }

    pub fn type_definition(&self, name: &str) -> Option<&TypeDefinition> {
        self.type_definitions.get(name)
    }

    pub fn term(&self, name: &str) -> Option<&Term> {
        self.terms.get(name)
    }

    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.terms.values()
    }

    /// Look a property up on `record`, then on its base types.
    pub fn find_property<'a>(&'a self, record: &'a RecordType, name: &str) -> Option<&'a TypeRef> {
        let mut current = Some(record);
        // a malformed model could chain bases into a loop
        let mut hops = 0usize;
        while let Some(rec) = current {
            if let Some(ty) = rec.properties.get(name) {
                return Some(ty);
            }
            hops += 1;
            if hops > self.records.len() {
                return None;
            }
            current = rec.base_type.as_deref().and_then(|b| self.records.get(b));
        }
        None
    }

    // --------------------------- registration ---------------------------- //

    pub fn add_enum(&mut self, ty: EnumType) {
        self.enums.insert(ty.name.clone(), ty);
    }

    pub fn add_record(&mut self, ty: RecordType) {
        self.records.insert(ty.name.clone(), ty);
    }

    pub fn add_type_definition(&mut self, ty: TypeDefinition) {
        self.type_definitions.insert(ty.name.clone(), ty);
    }

    pub fn add_term(&mut self, term: Term) {
        self.terms.insert(term.name.clone(), term);
    }

    pub(crate) fn declares(&self, name: &str) -> bool {
        self.enums.contains_key(name)
            || self.records.contains_key(name)
            || self.type_definitions.contains_key(name)
            || self.terms.contains_key(name)
    }
}
