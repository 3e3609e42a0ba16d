//! Rename-table construction.
//!
//! The external bytecode remapper consumes a flat table of renames; this
//! module flattens a mapping tree for one (src, dst) namespace pair into
//! that shape. Member source keys carry src-namespace descriptors, derived
//! on demand through the descriptor remapper.

use crate::remap::remap_descriptor;
use crate::tree::MappingTree;
use weft_core::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRename {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRename {
    /// Owning class, src-namespace name.
    pub owner: String,
    pub from: String,
    /// Src-namespace descriptor.
    pub desc: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRename {
    pub owner: String,
    pub method: String,
    pub method_desc: String,
    pub lv_index: u32,
    /// `None` for parameters; `(start_op_index, lvt_row_index)` for vars.
    pub position: Option<(i32, i32)>,
    pub to: String,
}

/// Flat rename table for one namespace pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameTable {
    pub classes: Vec<ClassRename>,
    pub methods: Vec<MemberRename>,
    pub fields: Vec<MemberRename>,
    pub locals: Vec<LocalRename>,
}

impl RenameTable {
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
            && self.methods.is_empty()
            && self.fields.is_empty()
            && self.locals.is_empty()
    }
}

/// Build the rename table taking `src`-namespace names to `dst`-namespace
/// names. Entries unmapped on either side are omitted; the remapper leaves
/// anything it has no entry for untouched.
pub fn rename_table(tree: &MappingTree, src_ns: &str, dst_ns: &str) -> Result<RenameTable> {
    let src = tree.namespaces().id(src_ns)?;
    let dst = tree.namespaces().id(dst_ns)?;
    let mut table = RenameTable::default();

    for class in tree.classes() {
        let Some(owner) = class.name(src) else { continue };
        if let Some(to) = class.name(dst) {
            if to != owner {
                table.classes.push(ClassRename { from: owner.to_string(), to: to.to_string() });
            }
        }

        for method in class.methods() {
            let desc = remap_descriptor(method.desc(), tree, 0, src);
            if let (Some(from), Some(to)) = (method.name(src), method.name(dst)) {
                if from != to {
                    table.methods.push(MemberRename {
                        owner: owner.to_string(),
                        from: from.to_string(),
                        desc: desc.to_string(),
                        to: to.to_string(),
                    });
                }
            }
            let Some(method_name) = method.name(src) else { continue };
            for arg in method.args() {
                if let Some(to) = arg.name(dst) {
                    table.locals.push(LocalRename {
                        owner: owner.to_string(),
                        method: method_name.to_string(),
                        method_desc: desc.to_string(),
                        lv_index: arg.lv_index,
                        position: None,
                        to: to.to_string(),
                    });
                }
            }
            for var in method.vars() {
                if let Some(to) = var.name(dst) {
                    table.locals.push(LocalRename {
                        owner: owner.to_string(),
                        method: method_name.to_string(),
                        method_desc: desc.to_string(),
                        lv_index: var.lv_index,
                        position: Some((var.start_op_index, var.lvt_row_index)),
                        to: to.to_string(),
                    });
                }
            }
        }

        for field in class.fields() {
            if let (Some(from), Some(to)) = (field.name(src), field.name(dst)) {
                if from != to {
                    let desc = remap_descriptor(field.desc(), tree, 0, src);
                    table.fields.push(MemberRename {
                        owner: owner.to_string(),
                        from: from.to_string(),
                        desc: desc.to_string(),
                        to: to.to_string(),
                    });
                }
            }
        }
    }
    Ok(table)
}
