//! Address list helpers

use std::collections::HashSet;

/// Trimmed entries of `addresses` that are not blank, in order.
pub fn non_blank(addresses: &[String]) -> Vec<String> {
    addresses
        .iter()
        .map(|address| address.trim())
        .filter(|address| !address.is_empty())
        .map(str::to_string)
        .collect()
}

/// Concatenate `primary` and `secondary`, dropping blank entries and
/// keeping only the first occurrence of each address.
///
/// Entries are trimmed before comparison, so padded duplicates collapse.
pub fn merge_addresses(primary: &[String], secondary: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();

    primary
        .iter()
        .chain(secondary)
        .map(|address| address.trim())
        .filter(|address| !address.is_empty())
        .filter(|address| seen.insert(*address))
        .map(str::to_string)
        .collect()
}
