use ccl_schema::Primitive;
use crate::types::{Definition, Model};

/// What a declared field type name refers to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolved<'a> {
    Primitive(Primitive),
    Model(&'a Model),
    Unknown,
}

/// Resolves `type_name` against the primitive keywords first, then against
/// every model of the fully parsed definition, so forward references work.
pub fn resolve<'a>(type_name: &str, definition: &'a Definition) -> Resolved<'a> {
    if let Some(primitive) = Primitive::from_name(type_name) {
        return Resolved::Primitive(primitive);
    }
    match definition.model_by_name(type_name) {
        Some(model) => Resolved::Model(model),
        None        => Resolved::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Field;

    #[test]
    fn test_resolve() {
        let def = Definition::new(None, vec![
            Model::new("Line", 0, vec![Field::new("A", "Point", false)]),
            Model::new("Point", 1, vec![]),
        ]);
        assert_eq!(resolve("int32", &def), Resolved::Primitive(Primitive::Int32));
        assert_eq!(resolve("datetime", &def), Resolved::Primitive(Primitive::DateTime));
        assert!(matches!(resolve("Point", &def), Resolved::Model(m) if m.model_id == 1));
        assert_eq!(resolve("point", &def), Resolved::Unknown);
    }
}
