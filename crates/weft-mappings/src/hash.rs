//! Canonical content hashing of mapping trees.
//!
//! The digest is used as a cache key, which makes it the most
//! safety-critical code in the crate: an order-dependent or ambiguous hash
//! silently serves stale artifacts. Entries are therefore sorted by a
//! stable key before hashing, and every name field is written with an
//! explicit presence tag and length prefix so an absent name, an empty
//! name and adjacent fields can never collide. (The tree itself normalizes
//! empty names to absent on insertion, so the two cases also never coexist.)

use crate::tree::{ArgEntry, ClassEntry, FieldEntry, MappingTree, MethodEntry, VarEntry};
use sha2::{Digest, Sha256};

const TAG_TREE: u8 = b'T';
const TAG_CLASS: u8 = b'c';
const TAG_METHOD: u8 = b'm';
const TAG_FIELD: u8 = b'f';
const TAG_ARG: u8 = b'p';
const TAG_VAR: u8 = b'v';

/// 256-bit canonical digest of a single tree.
pub fn hash_tree(tree: &MappingTree) -> [u8; 32] {
    hash_trees([tree])
}

/// 256-bit canonical digest of several trees, in argument order.
pub fn hash_trees<'a>(trees: impl IntoIterator<Item = &'a MappingTree>) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for tree in trees {
        hasher.update([TAG_TREE]);
        write_tree(&mut hasher, tree);
    }
    hasher.finalize().into()
}

/// Lowercase hex rendering of a digest.
pub fn to_hex(digest: &[u8; 32]) -> String {
    let mut s = String::with_capacity(64);
    for b in digest {
        s.push_str(&format!("{b:02x}"));
    }
    s
}

fn write_tree(hasher: &mut Sha256, tree: &MappingTree) {
    write_len(hasher, tree.namespaces().len());
    for ns in tree.namespaces().iter() {
        write_str(hasher, ns);
    }

    // Sort order must not depend on insertion order. Entries unmapped in
    // the base namespace tie on their base name, so every sort falls back
    // to the full name array.
    let mut classes: Vec<&ClassEntry> = tree.classes().iter().collect();
    classes.sort_by(|a, b| a.names().cmp(b.names()));
    write_len(hasher, classes.len());
    for class in classes {
        hasher.update([TAG_CLASS]);
        write_names(hasher, class.names());

        let mut methods: Vec<&MethodEntry> = class.methods().iter().collect();
        methods.sort_by(|a, b| {
            (a.desc(), a.names()).cmp(&(b.desc(), b.names()))
        });
        write_len(hasher, methods.len());
        for method in methods {
            hasher.update([TAG_METHOD]);
            write_str(hasher, method.desc());
            write_names(hasher, method.names());

            let mut args: Vec<&ArgEntry> = method.args().iter().collect();
            args.sort_by_key(|a| a.lv_index);
            write_len(hasher, args.len());
            for arg in args {
                hasher.update([TAG_ARG]);
                hasher.update(arg.lv_index.to_le_bytes());
                write_names(hasher, arg.names());
            }

            let mut vars: Vec<&VarEntry> = method.vars().iter().collect();
            vars.sort_by_key(|v| (v.lv_index, v.start_op_index, v.lvt_row_index));
            write_len(hasher, vars.len());
            for var in vars {
                hasher.update([TAG_VAR]);
                hasher.update(var.lv_index.to_le_bytes());
                hasher.update(var.start_op_index.to_le_bytes());
                hasher.update(var.lvt_row_index.to_le_bytes());
                write_names(hasher, var.names());
            }
        }

        let mut fields: Vec<&FieldEntry> = class.fields().iter().collect();
        fields.sort_by(|a, b| {
            (a.desc(), a.names()).cmp(&(b.desc(), b.names()))
        });
        write_len(hasher, fields.len());
        for field in fields {
            hasher.update([TAG_FIELD]);
            write_str(hasher, field.desc());
            write_names(hasher, field.names());
        }
    }
}

fn write_names(hasher: &mut Sha256, names: &[Option<String>]) {
    write_len(hasher, names.len());
    for name in names {
        match name {
            Some(n) => {
                hasher.update([1u8]);
                write_str(hasher, n);
            }
            None => hasher.update([0u8]),
        }
    }
}

fn write_str(hasher: &mut Sha256, s: &str) {
    write_len(hasher, s.len());
    hasher.update(s.as_bytes());
}

fn write_len(hasher: &mut Sha256, len: usize) {
    hasher.update((len as u64).to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::Namespaces;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    fn ns() -> Namespaces {
        Namespaces::new(["obf", "named"]).unwrap()
    }

    fn sample_tree(class_order: &[usize]) -> MappingTree {
        // Three classes inserted in the given order; content is identical
        // regardless of order.
        let data = [
            ("a", "Alpha", "()V", "run"),
            ("b", "Beta", "(I)I", "calc"),
            ("c", "Gamma", "()Z", "check"),
        ];
        let mut tree = MappingTree::new(ns());
        for &i in class_order {
            let (obf, named, desc, mname) = data[i];
            let c = tree.add_class(vec![some(obf), some(named)]).unwrap();
            let m = tree.add_method(c, desc, vec![some(obf), some(mname)]).unwrap();
            tree.add_arg(c, m, 0, vec![None, some("arg")]).unwrap();
            tree.add_field(c, "J", vec![some("x"), some("value")]).unwrap();
        }
        tree
    }

    #[test]
    fn test_hash_idempotent() {
        let tree = sample_tree(&[0, 1, 2]);
        assert_eq!(hash_tree(&tree), hash_tree(&tree));
    }

    #[test]
    fn test_hash_order_independent() {
        let a = sample_tree(&[0, 1, 2]);
        let b = sample_tree(&[2, 0, 1]);
        let c = sample_tree(&[1, 2, 0]);
        assert_eq!(hash_tree(&a), hash_tree(&b));
        assert_eq!(hash_tree(&a), hash_tree(&c));
    }

    #[test]
    fn test_hash_order_independent_for_base_unnamed_classes() {
        // Classes with no base-namespace name tie on their base name; the
        // digest must still not depend on insertion order.
        let mut a = MappingTree::new(ns());
        a.add_class(vec![None, some("Alpha")]).unwrap();
        a.add_class(vec![None, some("Beta")]).unwrap();
        let mut b = MappingTree::new(ns());
        b.add_class(vec![None, some("Beta")]).unwrap();
        b.add_class(vec![None, some("Alpha")]).unwrap();
        assert_eq!(hash_tree(&a), hash_tree(&b));
    }

    #[test]
    fn test_hash_order_independent_for_base_unnamed_members() {
        // Two base-unnamed methods sharing a descriptor also tie on their
        // primary key and fall back to the full name array.
        let mut a = MappingTree::new(ns());
        let c = a.add_class(vec![some("a"), some("Alpha")]).unwrap();
        a.add_method(c, "()V", vec![None, some("first")]).unwrap();
        a.add_method(c, "()V", vec![None, some("second")]).unwrap();
        let mut b = MappingTree::new(ns());
        let c = b.add_class(vec![some("a"), some("Alpha")]).unwrap();
        b.add_method(c, "()V", vec![None, some("second")]).unwrap();
        b.add_method(c, "()V", vec![None, some("first")]).unwrap();
        assert_eq!(hash_tree(&a), hash_tree(&b));
    }

    #[test]
    fn test_hash_sensitive_to_content() {
        let a = sample_tree(&[0, 1, 2]);
        let mut b = sample_tree(&[0, 1, 2]);
        b.add_class(vec![some("d"), some("Delta")]).unwrap();
        assert_ne!(hash_tree(&a), hash_tree(&b));
    }

    #[test]
    fn test_hash_sensitive_to_rename() {
        let mut a = MappingTree::new(ns());
        a.add_class(vec![some("a"), some("Alpha")]).unwrap();
        let mut b = MappingTree::new(ns());
        b.add_class(vec![some("a"), some("Alpha2")]).unwrap();
        assert_ne!(hash_tree(&a), hash_tree(&b));
    }

    #[test]
    fn test_absent_and_empty_hash_identically() {
        // The tree normalizes "" to absent, so both spellings make the
        // same digest.
        let mut a = MappingTree::new(ns());
        a.add_class(vec![some("a"), None]).unwrap();
        let mut b = MappingTree::new(ns());
        b.add_class(vec![some("a"), some("")]).unwrap();
        assert_eq!(hash_tree(&a), hash_tree(&b));
    }

    #[test]
    fn test_absent_differs_from_missing_column() {
        let mut a = MappingTree::new(ns());
        a.add_class(vec![some("a"), some("A")]).unwrap();
        let mut b = MappingTree::new(ns());
        b.add_class(vec![some("a"), None]).unwrap();
        assert_ne!(hash_tree(&a), hash_tree(&b));
    }

    #[test]
    fn test_namespace_names_affect_hash() {
        let mut a = MappingTree::new(Namespaces::new(["obf", "named"]).unwrap());
        a.add_class(vec![some("a"), some("A")]).unwrap();
        let mut b = MappingTree::new(Namespaces::new(["obf", "srg"]).unwrap());
        b.add_class(vec![some("a"), some("A")]).unwrap();
        assert_ne!(hash_tree(&a), hash_tree(&b));
    }

    #[test]
    fn test_multi_tree_order_matters() {
        let a = sample_tree(&[0, 1, 2]);
        let mut b = MappingTree::new(ns());
        b.add_class(vec![some("z"), some("Zeta")]).unwrap();
        assert_ne!(hash_trees([&a, &b]), hash_trees([&b, &a]));
    }

    #[test]
    fn test_to_hex() {
        let digest = hash_tree(&sample_tree(&[0, 1, 2]));
        let hex = to_hex(&digest);
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
