//! Ordered namespace table of a mapping tree.

use weft_core::{Result, WeftError};

/// The ordered, unique namespace names of one mapping tree.
///
/// The set is fixed at construction; every per-namespace name array in the
/// tree is indexed by the position a name holds here. Namespace 0 is the
/// base namespace, the only one descriptors are recorded under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
    names: Vec<String>,
}

impl Namespaces {
    /// Build a namespace table from names in declaration order.
    ///
    /// Fails if a name repeats: two columns with the same name would make
    /// name lookups ambiguous.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(WeftError::format(1, format!("duplicate namespace '{name}'")));
            }
        }
        Ok(Self { names })
    }

    /// Resolve a namespace name to its id.
    pub fn id(&self, name: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| WeftError::NamespaceNotFound { name: name.to_string() })
    }

    /// Name of the namespace with the given id.
    pub fn name(&self, id: usize) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_lookup() {
        let ns = Namespaces::new(["obf", "intermediate", "named"]).unwrap();
        assert_eq!(ns.len(), 3);
        assert_eq!(ns.id("obf").unwrap(), 0);
        assert_eq!(ns.id("named").unwrap(), 2);
        assert_eq!(ns.name(1), Some("intermediate"));
        assert_eq!(ns.name(3), None);
    }

    #[test]
    fn test_unknown_namespace_fails() {
        let ns = Namespaces::new(["obf", "named"]).unwrap();
        let err = ns.id("srg").unwrap_err();
        assert!(matches!(err, WeftError::NamespaceNotFound { .. }));
    }

    #[test]
    fn test_duplicate_namespace_rejected() {
        let err = Namespaces::new(["obf", "obf"]).unwrap_err();
        assert!(matches!(err, WeftError::Format { .. }));
    }

    #[test]
    fn test_declaration_order_preserved() {
        let ns = Namespaces::new(["b", "a", "c"]).unwrap();
        let order: Vec<&str> = ns.iter().collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }
}
