//! Multi-namespace mapping tree.
//!
//! Maintains a flat list of class entries plus per-namespace reverse maps
//! (name -> class index) so a class can be resolved in O(1) from either
//! direction of a remap.

use crate::namespace::Namespaces;
use std::collections::HashMap;
use weft_core::{Result, WeftError};

fn complete(existing: &mut [Option<String>], incoming: &[Option<String>]) {
    for (slot, name) in existing.iter_mut().zip(incoming) {
        if slot.is_none() {
            slot.clone_from(name);
        }
    }
}

/// Normalize a per-namespace name array: empty strings mean "unmapped in
/// this namespace" and are stored as `None`, short arrays are padded.
fn normalize(mut names: Vec<Option<String>>, ns_count: usize) -> Vec<Option<String>> {
    for slot in &mut names {
        if slot.as_deref() == Some("") {
            *slot = None;
        }
    }
    names.resize(ns_count, None);
    names
}

/// One class and its owned members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassEntry {
    names: Vec<Option<String>>,
    methods: Vec<MethodEntry>,
    fields: Vec<FieldEntry>,
}

impl ClassEntry {
    /// Name in the given namespace, if mapped there.
    pub fn name(&self, ns: usize) -> Option<&str> {
        self.names.get(ns).and_then(|n| n.as_deref())
    }

    pub fn names(&self) -> &[Option<String>] {
        &self.names
    }

    pub fn methods(&self) -> &[MethodEntry] {
        &self.methods
    }

    pub fn fields(&self) -> &[FieldEntry] {
        &self.fields
    }
}

/// A method with its base-namespace descriptor and owned locals.
///
/// The descriptor is recorded under the tree's base namespace only; other
/// namespaces derive theirs through the descriptor remapper, so they can
/// never drift out of sync with class renames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodEntry {
    names: Vec<Option<String>>,
    desc: String,
    args: Vec<ArgEntry>,
    vars: Vec<VarEntry>,
}

impl MethodEntry {
    pub fn name(&self, ns: usize) -> Option<&str> {
        self.names.get(ns).and_then(|n| n.as_deref())
    }

    pub fn names(&self) -> &[Option<String>] {
        &self.names
    }

    /// Descriptor in the base namespace.
    pub fn desc(&self) -> &str {
        &self.desc
    }

    pub fn args(&self) -> &[ArgEntry] {
        &self.args
    }

    pub fn vars(&self) -> &[VarEntry] {
        &self.vars
    }
}

/// A field with its base-namespace descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
    names: Vec<Option<String>>,
    desc: String,
}

impl FieldEntry {
    pub fn name(&self, ns: usize) -> Option<&str> {
        self.names.get(ns).and_then(|n| n.as_deref())
    }

    pub fn names(&self) -> &[Option<String>] {
        &self.names
    }

    pub fn desc(&self) -> &str {
        &self.desc
    }
}

/// A method parameter, keyed by local-variable index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgEntry {
    pub lv_index: u32,
    names: Vec<Option<String>>,
}

impl ArgEntry {
    pub fn name(&self, ns: usize) -> Option<&str> {
        self.names.get(ns).and_then(|n| n.as_deref())
    }

    pub fn names(&self) -> &[Option<String>] {
        &self.names
    }
}

/// A method local variable.
///
/// Start instruction and slot-row index disambiguate variables that reuse
/// the same local slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarEntry {
    pub lv_index: u32,
    pub start_op_index: i32,
    pub lvt_row_index: i32,
    names: Vec<Option<String>>,
}

impl VarEntry {
    pub fn name(&self, ns: usize) -> Option<&str> {
        self.names.get(ns).and_then(|n| n.as_deref())
    }

    pub fn names(&self) -> &[Option<String>] {
        &self.names
    }
}

/// In-memory multi-namespace symbol table.
///
/// Built by an append-only construction phase, then treated as logically
/// immutable for hashing, remapping and caching.
#[derive(Debug, Clone)]
pub struct MappingTree {
    namespaces: Namespaces,
    classes: Vec<ClassEntry>,
    by_name: Vec<HashMap<String, usize>>,
}

impl MappingTree {
    pub fn new(namespaces: Namespaces) -> Self {
        let ns_count = namespaces.len();
        Self {
            namespaces,
            classes: Vec::new(),
            by_name: vec![HashMap::new(); ns_count],
        }
    }

    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    pub fn classes(&self) -> &[ClassEntry] {
        &self.classes
    }

    pub fn class(&self, id: usize) -> Option<&ClassEntry> {
        self.classes.get(id)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Resolve a class by its name in one namespace.
    pub fn class_by_name(&self, name: &str, ns: usize) -> Option<usize> {
        self.by_name.get(ns).and_then(|m| m.get(name)).copied()
    }

    /// Name of a class in one namespace.
    pub fn class_name(&self, id: usize, ns: usize) -> Option<&str> {
        self.classes.get(id).and_then(|c| c.name(ns))
    }

    /// Append a class. Fails if any provided name already resolves to a
    /// different class in its namespace.
    pub fn add_class(&mut self, names: Vec<Option<String>>) -> Result<usize> {
        let names = normalize(names, self.namespaces.len());
        for (ns, name) in names.iter().enumerate() {
            if let Some(name) = name {
                if self.by_name[ns].contains_key(name) {
                    return Err(WeftError::format(
                        0,
                        format!(
                            "duplicate class '{name}' in namespace '{}'",
                            self.namespaces.name(ns).unwrap_or("?")
                        ),
                    ));
                }
            }
        }
        let id = self.classes.len();
        for (ns, name) in names.iter().enumerate() {
            if let Some(name) = name {
                self.by_name[ns].insert(name.clone(), id);
            }
        }
        self.classes.push(ClassEntry { names, methods: Vec::new(), fields: Vec::new() });
        Ok(id)
    }

    /// Append a method to a class; `desc` is the base-namespace descriptor.
    pub fn add_method(
        &mut self,
        class: usize,
        desc: impl Into<String>,
        names: Vec<Option<String>>,
    ) -> Result<usize> {
        let names = normalize(names, self.namespaces.len());
        let entry = self
            .classes
            .get_mut(class)
            .ok_or_else(|| WeftError::format(0, format!("no class with id {class}")))?;
        entry.methods.push(MethodEntry {
            names,
            desc: desc.into(),
            args: Vec::new(),
            vars: Vec::new(),
        });
        Ok(entry.methods.len() - 1)
    }

    /// Append a field to a class; `desc` is the base-namespace descriptor.
    pub fn add_field(
        &mut self,
        class: usize,
        desc: impl Into<String>,
        names: Vec<Option<String>>,
    ) -> Result<usize> {
        let names = normalize(names, self.namespaces.len());
        let entry = self
            .classes
            .get_mut(class)
            .ok_or_else(|| WeftError::format(0, format!("no class with id {class}")))?;
        entry.fields.push(FieldEntry { names, desc: desc.into() });
        Ok(entry.fields.len() - 1)
    }

    /// Append a parameter to a method.
    pub fn add_arg(
        &mut self,
        class: usize,
        method: usize,
        lv_index: u32,
        names: Vec<Option<String>>,
    ) -> Result<()> {
        let names = normalize(names, self.namespaces.len());
        let m = self.method_mut(class, method)?;
        m.args.push(ArgEntry { lv_index, names });
        Ok(())
    }

    /// Append a local variable to a method.
    pub fn add_var(
        &mut self,
        class: usize,
        method: usize,
        lv_index: u32,
        start_op_index: i32,
        lvt_row_index: i32,
        names: Vec<Option<String>>,
    ) -> Result<()> {
        let names = normalize(names, self.namespaces.len());
        let m = self.method_mut(class, method)?;
        m.vars.push(VarEntry { lv_index, start_op_index, lvt_row_index, names });
        Ok(())
    }

    /// Fill an absent class-name slot. Fails if the slot is already mapped
    /// or the name would collide with another class in that namespace.
    pub fn set_class_name(&mut self, class: usize, ns: usize, name: &str) -> Result<()> {
        if name.is_empty() {
            return Ok(());
        }
        if self.class_name(class, ns).is_some() {
            return Err(WeftError::format(
                0,
                format!("class {class} already named in namespace {ns}"),
            ));
        }
        if let Some(&other) = self.by_name.get(ns).and_then(|m| m.get(name)) {
            if other != class {
                return Err(WeftError::format(
                    0,
                    format!("class name '{name}' already taken in namespace {ns}"),
                ));
            }
        }
        let entry = self
            .classes
            .get_mut(class)
            .ok_or_else(|| WeftError::format(0, format!("no class with id {class}")))?;
        entry.names[ns] = Some(name.to_string());
        self.by_name[ns].insert(name.to_string(), class);
        Ok(())
    }

    /// Fill absent name slots of an existing method from a second source.
    /// Existing names win.
    pub fn complete_method_names(
        &mut self,
        class: usize,
        method: usize,
        names: &[Option<String>],
    ) -> Result<()> {
        let m = self.method_mut(class, method)?;
        complete(&mut m.names, names);
        Ok(())
    }

    /// Fill absent name slots of an existing field.
    pub fn complete_field_names(
        &mut self,
        class: usize,
        field: usize,
        names: &[Option<String>],
    ) -> Result<()> {
        let f = self
            .classes
            .get_mut(class)
            .and_then(|c| c.fields.get_mut(field))
            .ok_or_else(|| WeftError::format(0, format!("no field {field} on class {class}")))?;
        complete(&mut f.names, names);
        Ok(())
    }

    /// Copy `src`-namespace names into absent `dst` slots for every member
    /// of a class. Returns how many slots were filled.
    pub fn fill_member_names(&mut self, class: usize, dst: usize, src: usize) -> usize {
        let Some(entry) = self.classes.get_mut(class) else { return 0 };
        let mut filled = 0;
        let mut fill = |names: &mut Vec<Option<String>>| {
            if names[dst].is_none() {
                if let Some(name) = names[src].clone() {
                    names[dst] = Some(name);
                    filled += 1;
                }
            }
        };
        for method in &mut entry.methods {
            fill(&mut method.names);
            for arg in &mut method.args {
                fill(&mut arg.names);
            }
            for var in &mut method.vars {
                fill(&mut var.names);
            }
        }
        for field in &mut entry.fields {
            fill(&mut field.names);
        }
        filled
    }

    fn method_mut(&mut self, class: usize, method: usize) -> Result<&mut MethodEntry> {
        self.classes
            .get_mut(class)
            .and_then(|c| c.methods.get_mut(method))
            .ok_or_else(|| {
                WeftError::format(0, format!("no method {method} on class {class}"))
            })
    }
}
