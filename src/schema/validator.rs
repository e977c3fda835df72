//! Schema validation: every referenced field must exist.

use crate::error::SchemaError;
use crate::schema::Schema;
use std::collections::HashSet;

pub fn validate(schema: &Schema) -> Result<(), SchemaError> {
    let mut names = HashSet::new();
    for f in &schema.fields {
        if !names.insert(f.name.as_str()) {
            return Err(SchemaError::DuplicateField(f.name.clone()));
        }
    }

    for (list, refs) in [("filterable", &schema.filterable), ("searchable", &schema.searchable)] {
        for name in refs {
            if !names.contains(name.as_str()) {
                return Err(SchemaError::UnknownField {
                    list,
                    field: name.clone(),
                });
            }
        }
    }

    Ok(())
}
