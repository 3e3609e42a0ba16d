//! Tiny-V2 writer.
//!
//! Always emits exactly one name column per namespace, padding unmapped
//! slots with an empty field. Omitting columns would shift the meaning of
//! every following field for readers that index columns by position.

use crate::escape::escape;
use weft_core::Result;
use weft_mappings::MappingTree;

/// Encode a mapping tree as Tiny-V2 text.
pub fn write_tree(tree: &MappingTree) -> String {
    let mut out = String::new();
    out.push_str("tiny\t2\t0");
    for ns in tree.namespaces().iter() {
        out.push('\t');
        out.push_str(&escape(ns));
    }
    out.push('\n');

    let ns_count = tree.namespaces().len();
    for class in tree.classes() {
        out.push('c');
        push_names(&mut out, class.names(), ns_count);
        out.push('\n');

        for method in class.methods() {
            out.push_str("\tm\t");
            out.push_str(&escape(method.desc()));
            push_names(&mut out, method.names(), ns_count);
            out.push('\n');

            for arg in method.args() {
                out.push_str("\t\tp\t");
                out.push_str(&arg.lv_index.to_string());
                push_names(&mut out, arg.names(), ns_count);
                out.push('\n');
            }
            for var in method.vars() {
                out.push_str("\t\tv\t");
                out.push_str(&var.lv_index.to_string());
                out.push('\t');
                out.push_str(&var.start_op_index.to_string());
                out.push('\t');
                out.push_str(&var.lvt_row_index.to_string());
                push_names(&mut out, var.names(), ns_count);
                out.push('\n');
            }
        }
        for field in class.fields() {
            out.push_str("\tf\t");
            out.push_str(&escape(field.desc()));
            push_names(&mut out, field.names(), ns_count);
            out.push('\n');
        }
    }
    out
}

/// Encode a tree and write it to disk.
pub fn write_file(tree: &MappingTree, path: &std::path::Path) -> Result<()> {
    std::fs::write(path, write_tree(tree))?;
    Ok(())
}

fn push_names(out: &mut String, names: &[Option<String>], ns_count: usize) {
    for ns in 0..ns_count {
        out.push('\t');
        if let Some(name) = names.get(ns).and_then(|n| n.as_deref()) {
            out.push_str(&escape(name));
        }
    }
}
