//! Tiny-V2 reader.
//!
//! Indentation depth (leading tabs) carries nesting: 0 = class, 1 =
//! method/field, 2 = parameter/variable. Splitting a row keeps trailing
//! empty fields; an empty per-namespace name column is meaningful data,
//! not absence of a column.

use crate::escape::unescape;
use tracing::{debug, warn};
use weft_core::{ParseMode, Result, WeftError};
use weft_mappings::{MappingTree, Namespaces};

/// Parse Tiny-V2 text into a mapping tree.
pub fn read_tree(input: &str, mode: ParseMode) -> Result<MappingTree> {
    let mut lines = input.split('\n').enumerate();

    let (_, header) = lines
        .next()
        .ok_or_else(|| WeftError::format(1, "empty input"))?;
    let tree_namespaces = parse_header(trim_line(header))?;
    let ns_count = tree_namespaces.len();
    let mut tree = MappingTree::new(tree_namespaces);

    // Current nesting context. `None` means the enclosing entry was
    // skipped and its children are skipped with it.
    let mut current_class: Option<usize> = None;
    let mut current_method: Option<usize> = None;

    for (idx, raw) in lines {
        let line_no = idx + 1;
        let line = trim_line(raw);
        if line.is_empty() {
            continue;
        }
        let depth = line.bytes().take_while(|&b| b == b'\t').count();
        let fields = split_fields(&line[depth..], depth, ns_count, line_no)?;
        let kind = fields[0];

        match (depth, kind) {
            (0, "c") => {
                current_method = None;
                let names = parse_names(&fields[1..], ns_count, line_no)?;
                match tree.add_class(names) {
                    Ok(id) => current_class = Some(id),
                    Err(WeftError::Format { message, .. }) => {
                        skip_row(mode, WeftError::format(line_no, message))?;
                        current_class = None;
                    }
                    Err(err) => return Err(err),
                }
            }
            (1, "m") => {
                current_method = None;
                let desc = unescape(fields[1], line_no)?;
                let names = parse_names(&fields[2..], ns_count, line_no)?;
                match current_class {
                    Some(class) => current_method = Some(tree.add_method(class, desc, names)?),
                    None => skip_row(mode, WeftError::format(line_no, "method row outside a class"))?,
                }
            }
            (1, "f") => {
                current_method = None;
                let desc = unescape(fields[1], line_no)?;
                let names = parse_names(&fields[2..], ns_count, line_no)?;
                match current_class {
                    Some(class) => {
                        tree.add_field(class, desc, names)?;
                    }
                    None => skip_row(mode, WeftError::format(line_no, "field row outside a class"))?,
                }
            }
            (2, "p") => {
                let names = parse_names(&fields[2..], ns_count, line_no)?;
                let lv_index = parse_int::<u32>(fields.get(1), line_no, "parameter lv-index");
                match (current_class, current_method, lv_index) {
                    (Some(class), Some(method), Ok(lv_index)) => {
                        tree.add_arg(class, method, lv_index, names)?;
                    }
                    (_, _, Err(err)) => skip_row(mode, err)?,
                    _ => skip_row(mode, WeftError::format(line_no, "parameter row outside a method"))?,
                }
            }
            (2, "v") => {
                let names = parse_names(&fields[4..], ns_count, line_no)?;
                let position = parse_int::<u32>(fields.get(1), line_no, "variable lv-index")
                    .and_then(|lv| {
                        let start = parse_int::<i32>(fields.get(2), line_no, "variable start offset")?;
                        let row = parse_int::<i32>(fields.get(3), line_no, "variable lvt row")?;
                        Ok((lv, start, row))
                    });
                match (current_class, current_method, position) {
                    (Some(class), Some(method), Ok((lv_index, start, row))) => {
                        tree.add_var(class, method, lv_index, start, row, names)?;
                    }
                    (_, _, Err(err)) => skip_row(mode, err)?,
                    _ => skip_row(mode, WeftError::format(line_no, "variable row outside a method"))?,
                }
            }
            _ => {
                // Unrecognized row kinds (and over-indented rows) carry no
                // mapping data we understand.
                debug!(line = line_no, kind, depth, "ignoring unrecognized row");
            }
        }
    }
    Ok(tree)
}

/// Parse a Tiny-V2 file from disk.
pub fn read_file(path: &std::path::Path, mode: ParseMode) -> Result<MappingTree> {
    let content = std::fs::read_to_string(path)?;
    read_tree(&content, mode)
}

fn trim_line(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

fn parse_header(header: &str) -> Result<Namespaces> {
    let fields: Vec<&str> = header.split('\t').collect();
    if fields.len() < 4 || fields[0] != "tiny" {
        return Err(WeftError::format(1, "not a tiny v2 header"));
    }
    if fields[1] != "2" || fields[2] != "0" {
        return Err(WeftError::format(
            1,
            format!("unsupported tiny version {}.{}", fields[1], fields[2]),
        ));
    }
    let mut names = Vec::with_capacity(fields.len() - 3);
    for field in &fields[3..] {
        names.push(unescape(field, 1)?);
    }
    Namespaces::new(names)
}

/// Split row content on tabs. If the result is short of the column count
/// the row kind requires, re-split by scanning literal tab positions from
/// the indent boundary; a row still short after that is unrecoverable.
fn split_fields<'a>(
    content: &'a str,
    depth: usize,
    ns_count: usize,
    line_no: usize,
) -> Result<Vec<&'a str>> {
    let fields: Vec<&str> = content.split('\t').collect();
    let required = match fields[0] {
        "c" => 1 + ns_count,
        "m" | "f" => 2 + ns_count,
        "p" => 2 + ns_count,
        "v" => 4 + ns_count,
        _ => return Ok(fields),
    };
    if fields.len() >= required {
        return Ok(fields);
    }

    let strict = resplit_strict(content);
    if strict.len() >= required {
        debug!(line = line_no, depth, "recovered non-conforming row by strict re-split");
        return Ok(strict);
    }
    Err(WeftError::format(
        line_no,
        format!("row has {} fields, {} required", strict.len(), required),
    ))
}

/// Field boundaries taken from literal tab byte positions, independent of
/// any iterator splitting semantics.
fn resplit_strict(content: &str) -> Vec<&str> {
    let bytes = content.as_bytes();
    let mut fields = Vec::new();
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'\t' {
            fields.push(&content[start..i]);
            start = i + 1;
        }
    }
    fields.push(&content[start..]);
    fields
}

fn parse_names(fields: &[&str], ns_count: usize, line_no: usize) -> Result<Vec<Option<String>>> {
    fields
        .iter()
        .take(ns_count)
        .map(|f| {
            if f.is_empty() {
                Ok(None)
            } else {
                unescape(f, line_no).map(Some)
            }
        })
        .collect()
}

fn parse_int<T: std::str::FromStr>(
    field: Option<&&str>,
    line_no: usize,
    what: &str,
) -> Result<T> {
    field
        .and_then(|f| f.parse().ok())
        .ok_or_else(|| WeftError::format(line_no, format!("invalid {what}")))
}

/// Strict mode turns a skippable row into a fatal format error; lenient
/// mode logs and drops the row. Losing one entry from third-party mapping
/// data beats discarding the whole artifact.
fn skip_row(mode: ParseMode, err: WeftError) -> Result<()> {
    match mode {
        ParseMode::Strict => Err(err),
        ParseMode::Lenient => {
            warn!("skipping malformed row: {err}");
            Ok(())
        }
    }
}
