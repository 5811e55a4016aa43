//! Interactive coordinate-file picker.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `foil fit` and choose a file" UX
//!
//! The picker searches for `*.dat` and `*.json` files under the current working
//! directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Default directory recursion depth for finding coordinate files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

const EXTENSIONS: [&str; 2] = ["dat", "json"];

/// Prompt the user to select a coordinate file from the current directory tree.
///
/// Behavior:
/// - list discovered `*.dat` / `*.json` files
/// - accept either a number (from the list) or an explicit path
/// - `q` cancels
pub fn prompt_for_coords_path() -> Result<PathBuf, AppError> {
    let files = discover_coord_files();
    if files.is_empty() {
        return Err(AppError::invalid_input(
            "No .dat or .json files found. Provide one with `foil fit -f <airfoil.dat>`.",
        ));
    }

    println!("Found {} coordinate file(s):", files.len());
    for (idx, path) in files.iter().enumerate() {
        println!("{:>3}) {}", idx + 1, pretty_path(path));
    }

    loop {
        print!("Select a file by number (1-{}) or type a path (q to quit): ", files.len());
        io::stdout()
            .flush()
            .map_err(|e| AppError::io(format!("Failed to write prompt: {e}")))?;

        let mut input = String::new();
        let bytes = io::stdin()
            .read_line(&mut input)
            .map_err(|e| AppError::io(format!("Failed to read input: {e}")))?;

        if bytes == 0 {
            return Err(AppError::invalid_input(
                "No input received. Provide a file with `foil fit -f <airfoil.dat>`.",
            ));
        }

        let input = input.trim();
        if input.eq_ignore_ascii_case("q") {
            return Err(AppError::invalid_input("Canceled."));
        }

        if let Ok(choice) = input.parse::<usize>() {
            if (1..=files.len()).contains(&choice) {
                return validate_coords_path(&files[choice - 1]);
            }
            println!("Invalid choice: {choice}. Enter a number between 1 and {}.", files.len());
            continue;
        }

        match validate_coords_path(&PathBuf::from(input)) {
            Ok(path) => return Ok(path),
            Err(err) => println!("{err}"),
        }
    }
}

/// Validate the provided path points to a `.dat` or `.json` file.
pub fn validate_coords_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::invalid_input(format!(
            "Coordinate file not found: {}",
            path.display()
        )));
    }
    if path.is_dir() {
        return Err(AppError::invalid_input(format!(
            "Expected a file, got a directory: {}",
            path.display()
        )));
    }
    if !has_coord_extension(path) {
        return Err(AppError::invalid_input(format!(
            "Expected a .dat or .json file (got: {}).",
            path.display()
        )));
    }
    Ok(path.to_path_buf())
}

/// Discover coordinate files under the current directory (deterministic order).
pub fn discover_coord_files() -> Vec<PathBuf> {
    find_coord_files(Path::new("."), DEFAULT_SEARCH_DEPTH)
}

fn find_coord_files(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut out = Vec::new();
    find_coord_files_inner(root, 0, max_depth, &mut out);
    out.sort_by(|a, b| pretty_path(a).cmp(&pretty_path(b)));
    out
}

fn find_coord_files_inner(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }
    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            if !should_skip_dir(&path) {
                find_coord_files_inner(&path, depth + 1, max_depth, out);
            }
        } else if file_type.is_file() && has_coord_extension(&path) {
            out.push(path);
        }
    }
}

fn has_coord_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules")
}

fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_dat_and_json_only() {
        let dir = std::env::temp_dir().join(format!("foilfit-picker-{}", std::process::id()));
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("a.dat"), "").unwrap();
        fs::write(dir.join("nested/b.JSON"), "").unwrap();
        fs::write(dir.join("c.csv"), "").unwrap();

        let found = find_coord_files(&dir, 2);
        let _ = fs::remove_dir_all(&dir);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| has_coord_extension(p)));
        assert!(validate_coords_path(Path::new("/definitely/missing.dat")).is_err());
    }
}
