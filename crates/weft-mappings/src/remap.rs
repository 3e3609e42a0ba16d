//! Descriptor remapping between namespaces.

use crate::tree::MappingTree;
use std::borrow::Cow;

/// Rewrite every `L<name>;` class reference in `desc` from `src` namespace
/// names to `dst` namespace names.
///
/// A reference whose class is unknown in `src`, or known but unmapped in
/// `dst`, is copied through unchanged; descriptors routinely reference
/// platform classes outside the mapped set. Primitive and array-dimension
/// markers are never touched. If nothing substitutes, the original string
/// is returned borrowed, without allocating.
pub fn remap_descriptor<'a>(
    desc: &'a str,
    tree: &MappingTree,
    src: usize,
    dst: usize,
) -> Cow<'a, str> {
    let bytes = desc.as_bytes();
    let mut out: Option<String> = None;
    let mut copied = 0; // everything before this offset is already in `out`
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'L' {
            i += 1;
            continue;
        }
        let Some(rel_end) = desc[i..].find(';') else {
            // Unterminated reference; nothing safe to rewrite past here.
            break;
        };
        let end = i + rel_end;
        let name = &desc[i + 1..end];
        let replacement = tree
            .class_by_name(name, src)
            .and_then(|id| tree.class_name(id, dst));
        if let Some(new_name) = replacement {
            if new_name != name {
                let out = out.get_or_insert_with(|| String::with_capacity(desc.len()));
                out.push_str(&desc[copied..=i]);
                out.push_str(new_name);
                copied = end; // the ';' copies with the next segment
            }
        }
        i = end + 1;
    }
    match out {
        Some(mut s) => {
            s.push_str(&desc[copied..]);
            Cow::Owned(s)
        }
        None => Cow::Borrowed(desc),
    }
}
