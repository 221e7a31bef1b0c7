//! Display labels for passes
//!
//! A pipeline may run the same pass several times, but selection lists and
//! checkbox groups need one distinct label per entry. [`uniquify`] prefixes
//! every pass name with [`PASS_MARKER`] and pads repeats with trailing spaces
//! until each label is unique. Padding keeps labels visually identical to the
//! pass name while still telling them apart.
//!
//! The ordinal form (`"[3/7] canonicalize"`) is what the viewer shows in its
//! pass pickers; [`initial_label`] is the matching sentinel for stage 0.

use std::collections::HashSet;

/// Prefix placed in front of every pass name
pub const PASS_MARKER: &str = "--";

/// Appended to a label until it no longer collides with an earlier one
pub const PADDING: char = ' ';

/// Derive a unique label for every name, preserving order.
pub fn uniquify<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(names.len());
    let mut labels = Vec::with_capacity(names.len());

    for name in names {
        let mut label = format!("{PASS_MARKER}{}", name.as_ref());
        while seen.contains(&label) {
            label.push(PADDING);
        }
        seen.insert(label.clone());
        labels.push(label);
    }

    labels
}

/// `"[k/N] name"` for the pass at 1-based `ordinal` of `count`
pub fn ordinal_label(ordinal: usize, count: usize, name: &str) -> String {
    format!("[{ordinal}/{count}] {name}")
}

/// The "before any pass" sentinel for a pipeline of `count` passes
pub fn initial_label(count: usize) -> String {
    format!("[0/{count}] Initial")
}

/// Split an ordinal label into `(ordinal, count, name)`.
pub fn parse_ordinal_label(label: &str) -> Option<(usize, usize, &str)> {
    let rest = label.strip_prefix('[')?;
    let (counts, name) = rest.split_once("] ")?;
    let (ordinal, count) = counts.split_once('/')?;
    Some((ordinal.parse().ok()?, count.parse().ok()?, name))
}
