use std::io::{self, BufRead};

use controllers::naming::{self, Axis};

/// Names from the command line, or one per line from stdin when none were given.
pub fn collect_names(args: &[String]) -> io::Result<Vec<String>> {
    if !args.is_empty() {
        return Ok(args.to_vec());
    }
    let stdin = io::stdin();
    let mut names = Vec::new();
    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            names.push(trimmed.to_string());
        }
    }
    Ok(names)
}

/// Crowbar stereo names cleaned up; other names pass through unchanged.
pub fn clean(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|name| naming::clean_crowbar_name(name).unwrap_or_else(|| name.clone()))
        .collect()
}

/// Scale key names for each base, sanitized the way bone and object names are.
pub fn scale(bases: &[String], axes: &str) -> Result<Vec<String>, String> {
    let axes = Axis::parse_list(axes)?;
    Ok(bases
        .iter()
        .flat_map(|base| naming::scale_key_names(&naming::sanitize_name(base), &axes))
        .collect())
}

/// The names that are scale keys of one of `bases`.
pub fn filter(names: &[String], bases: &[String]) -> Vec<String> {
    let bases: Vec<String> = bases.iter().map(|b| naming::sanitize_name(b)).collect();
    names
        .iter()
        .filter(|name| bases.iter().any(|base| naming::is_scale_key_of(name, base)))
        .cloned()
        .collect()
}
