//! Merging two mapping trees into one.
//!
//! The base tree is visited through a namespace-renaming adapter into a
//! fresh target, then the overlay tree's entries are visited into the same
//! target. An optional fill policy completes a namespace from another one
//! for entries the overlay never named.

use crate::namespace::Namespaces;
use crate::tree::MappingTree;
use std::collections::HashMap;
use tracing::debug;
use weft_core::Result;

/// Options controlling a merge.
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Namespace renames applied to the base tree's declaration
    /// (`from -> to`) before merging.
    pub rename: HashMap<String, String>,
    /// Optional completion step after the merge.
    pub fill: Option<FillPolicy>,
}

/// After merging, any class or member with no name in `namespace` receives
/// its `from` name verbatim. This keeps the newest namespace total even
/// when one source only carries older names for part of the symbol set.
#[derive(Debug, Clone)]
pub struct FillPolicy {
    pub namespace: String,
    pub from: String,
}

/// Merge `overlay` onto `base`, producing a fresh tree.
///
/// The target's namespaces are the base's (renamed per options) followed by
/// any overlay namespaces not already present. Classes are matched by their
/// name in the target's base namespace, members by base-namespace name and
/// descriptor. Both sources must record descriptors under the namespace
/// that becomes the target's base.
pub fn merge_trees(
    base: &MappingTree,
    overlay: &MappingTree,
    options: &MergeOptions,
) -> Result<MappingTree> {
    let mut ns_names: Vec<String> = base
        .namespaces()
        .iter()
        .map(|n| options.rename.get(n).cloned().unwrap_or_else(|| n.to_string()))
        .collect();
    for n in overlay.namespaces().iter() {
        if !ns_names.iter().any(|existing| existing == n) {
            ns_names.push(n.to_string());
        }
    }
    let mut target = MappingTree::new(Namespaces::new(ns_names)?);

    let base_map = adapter(base, &target, &options.rename)?;
    visit_into(&mut target, base, &base_map)?;
    let overlay_map = adapter(overlay, &target, &HashMap::new())?;
    visit_into(&mut target, overlay, &overlay_map)?;

    if let Some(fill) = &options.fill {
        apply_fill(&mut target, fill)?;
    }
    Ok(target)
}

/// Map each source namespace id to its target namespace id, applying the
/// rename table to the source's declared names.
fn adapter(
    source: &MappingTree,
    target: &MappingTree,
    rename: &HashMap<String, String>,
) -> Result<Vec<usize>> {
    source
        .namespaces()
        .iter()
        .map(|n| {
            let renamed = rename.get(n).map(String::as_str).unwrap_or(n);
            target.namespaces().id(renamed)
        })
        .collect()
}

fn visit_into(target: &mut MappingTree, source: &MappingTree, ns_map: &[usize]) -> Result<()> {
    let ns_count = target.namespaces().len();
    let project = |names: &[Option<String>]| -> Vec<Option<String>> {
        let mut out = vec![None; ns_count];
        for (src_ns, name) in names.iter().enumerate() {
            if let Some(name) = name {
                out[ns_map[src_ns]] = Some(name.clone());
            }
        }
        out
    };

    for class in source.classes() {
        let names = project(class.names());
        let class_id = match names[0].as_deref().and_then(|n| target.class_by_name(n, 0)) {
            Some(existing) => {
                merge_class_names(target, existing, &names)?;
                existing
            }
            None => target.add_class(names)?,
        };

        for method in class.methods() {
            let names = project(method.names());
            let existing = target.class(class_id).and_then(|c| {
                c.methods()
                    .iter()
                    .position(|m| m.desc() == method.desc() && m.name(0) == names[0].as_deref())
            });
            let method_id = match existing {
                Some(id) => {
                    target.complete_method_names(class_id, id, &names)?;
                    id
                }
                None => target.add_method(class_id, method.desc(), names)?,
            };
            for arg in method.args() {
                let dup = target.class(class_id).is_some_and(|c| {
                    c.methods()[method_id].args().iter().any(|a| a.lv_index == arg.lv_index)
                });
                if !dup {
                    target.add_arg(class_id, method_id, arg.lv_index, project(arg.names()))?;
                }
            }
            for var in method.vars() {
                let dup = target.class(class_id).is_some_and(|c| {
                    c.methods()[method_id].vars().iter().any(|v| {
                        v.lv_index == var.lv_index
                            && v.start_op_index == var.start_op_index
                            && v.lvt_row_index == var.lvt_row_index
                    })
                });
                if !dup {
                    target.add_var(
                        class_id,
                        method_id,
                        var.lv_index,
                        var.start_op_index,
                        var.lvt_row_index,
                        project(var.names()),
                    )?;
                }
            }
        }
        for field in class.fields() {
            let names = project(field.names());
            let existing = target.class(class_id).and_then(|c| {
                c.fields()
                    .iter()
                    .position(|f| f.desc() == field.desc() && f.name(0) == names[0].as_deref())
            });
            match existing {
                Some(id) => target.complete_field_names(class_id, id, &names)?,
                None => {
                    target.add_field(class_id, field.desc(), names)?;
                }
            }
        }
    }
    Ok(())
}

/// Fill name slots of an already-matched class from a second source.
/// Existing names win; only absent slots are completed.
fn merge_class_names(
    target: &mut MappingTree,
    class_id: usize,
    names: &[Option<String>],
) -> Result<()> {
    for (ns, name) in names.iter().enumerate() {
        if let Some(name) = name {
            if target.class_name(class_id, ns).is_none() {
                target.set_class_name(class_id, ns, name)?;
            }
        }
    }
    Ok(())
}

fn apply_fill(target: &mut MappingTree, fill: &FillPolicy) -> Result<()> {
    let dst = target.namespaces().id(&fill.namespace)?;
    let src = target.namespaces().id(&fill.from)?;
    let mut filled = 0usize;
    for class_id in 0..target.len() {
        if target.class_name(class_id, dst).is_none() {
            if let Some(name) = target.class_name(class_id, src).map(str::to_string) {
                target.set_class_name(class_id, dst, &name)?;
                filled += 1;
            }
        }
        filled += target.fill_member_names(class_id, dst, src);
    }
    debug!(filled, namespace = %fill.namespace, from = %fill.from, "fill pass complete");
    Ok(())
}
