use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use controllers::{Generation, GeneratorConfig};
use kv2::document::Document;
use kv2::parser::Parser;

const FIXTURE_SUFFIX: &str = ".test.dmx";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestConfig {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// Inline combinations document handed to the generator.
    #[serde(default)]
    pub combinations: Option<String>,

    /// Generator settings for this fixture.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Expected number of generated controllers.
    #[serde(default)]
    pub expect_count: Option<usize>,

    /// Expected controller names, in output order.
    #[serde(default)]
    pub expect_names: Option<Vec<String>>,

    /// Expected error: the error's Display string must contain this substring.
    #[serde(default)]
    pub expect_error: Option<String>,

    /// Expected number of warnings.
    #[serde(default)]
    pub expect_warnings: Option<usize>,
}

/// Split a `.test.dmx` file into its TOML config and the ID source document.
fn parse_test_file(content: &str) -> Result<(TestConfig, &str), String> {
    let content = content.trim_start_matches('\u{feff}'); // strip BOM

    let after_open = content
        .strip_prefix("---")
        .ok_or("missing opening --- frontmatter delimiter")?;
    let after_open = after_open
        .strip_prefix('\n')
        .or_else(|| after_open.strip_prefix("\r\n"))
        .unwrap_or(after_open);

    let close_pos = after_open
        .find("\n---")
        .ok_or("missing closing --- frontmatter delimiter")?;

    let toml_str = after_open[..close_pos].trim_end_matches('\r');
    let rest = &after_open[close_pos + 4..]; // skip \n---
    let source = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    let config: TestConfig =
        toml::from_str(toml_str).map_err(|e| format!("TOML parse error: {}", e))?;

    Ok((config, source))
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

fn run_single_test(path: &Path) -> TestResult {
    let (description, outcome) = match std::fs::read_to_string(path) {
        Ok(content) => match parse_test_file(&content) {
            Ok((config, source)) => (config.description.clone(), check_fixture(&config, source)),
            Err(e) => (None, Some(format!("frontmatter error: {}", e))),
        },
        Err(e) => (None, Some(format!("cannot read file: {}", e))),
    };

    TestResult {
        path: path.to_path_buf(),
        description,
        outcome: match outcome {
            None => TestOutcome::Pass,
            Some(reason) => TestOutcome::Fail(reason),
        },
    }
}

/// Run the generator over one fixture. Returns `Some(reason)` on mismatch.
fn check_fixture(config: &TestConfig, source: &str) -> Option<String> {
    let id_source = Document::from_source(source, 0);
    let combinations = config
        .combinations
        .as_deref()
        .map(|text| Document::from_source(text, 1));

    let result = controllers::generate(
        Some(&id_source),
        combinations.as_ref(),
        &config.generator,
    );

    let generation = match (&config.expect_error, result) {
        (Some(expected), Err(err)) => {
            let err_str = err.to_string();
            return if err_str.contains(expected.as_str()) {
                None
            } else {
                Some(format!(
                    "expected error containing \"{}\", got: {}",
                    expected, err_str
                ))
            };
        }
        (Some(expected), Ok(_)) => {
            return Some(format!(
                "expected error containing \"{}\", but generation succeeded",
                expected
            ));
        }
        (None, Err(err)) => return Some(format!("unexpected error: {}", err)),
        (None, Ok(generation)) => generation,
    };

    if let Some(expected) = config.expect_count {
        if generation.block_count != expected {
            return Some(format!(
                "expected {} controller(s), got {}",
                expected, generation.block_count
            ));
        }
    }

    if let Some(expected) = &config.expect_names {
        let actual = match output_names(&generation) {
            Ok(names) => names,
            Err(e) => return Some(format!("generated document does not parse: {}", e)),
        };
        if &actual != expected {
            return Some(format!(
                "controller names mismatch\n  expected: {}\n  actual:   {}",
                expected.join(", "),
                actual.join(", ")
            ));
        }
    }

    if let Some(expected) = config.expect_warnings {
        if generation.warnings.len() != expected {
            let actual: Vec<String> = generation
                .warnings
                .iter()
                .map(|w| format!("  - {}", w))
                .collect();
            return Some(format!(
                "expected {} warning(s), got {}\n  actual warnings:\n{}",
                expected,
                generation.warnings.len(),
                if actual.is_empty() {
                    "    (none)".to_string()
                } else {
                    actual.join("\n")
                }
            ));
        }
    }

    None
}

/// Names of the controller blocks in a generated document, in order.
fn output_names(generation: &Generation) -> Result<Vec<String>, String> {
    let doc = Document::from_lines(generation.lines.iter().cloned(), 0);
    let blocks = Parser::new(&doc)
        .parse_blocks(kv2::COMBINATION_INPUT_CONTROL)
        .map_err(|e| e.to_string())?;
    Ok(blocks
        .iter()
        .map(|b| b.name().unwrap_or_default().to_string())
        .collect())
}

/// Discover fixture files grouped by category (subfolder relative to root).
/// Files directly in `root` get category "" (uncategorized).
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_tests(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_tests(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_tests(&path, root, out);
        } else if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.ends_with(FIXTURE_SUFFIX) {
                let category = path
                    .parent()
                    .and_then(|p| p.strip_prefix(root).ok())
                    .map(|p| p.to_string_lossy().replace('\\', "/"))
                    .unwrap_or_default();
                out.entry(category).or_default().push(path);
            }
        }
    }
}

/// List available categories for the given test path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no {} files found in {}", FIXTURE_SUFFIX, path.display());
        return;
    }

    eprintln!("available categories:");
    for (cat, files) in &categories {
        let label = if cat.is_empty() { "(root)" } else { cat.as_str() };
        eprintln!("  {} ({} tests)", label, files.len());
    }
}

fn paint(text: &str, code: &str, no_color: bool) -> String {
    if no_color {
        text.to_string()
    } else {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    }
}

fn label_of(result: &TestResult) -> &str {
    result.description.as_deref().unwrap_or_else(|| {
        result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .and_then(|s| s.strip_suffix(FIXTURE_SUFFIX))
            .unwrap_or("?")
    })
}

/// Run all fixtures under `path` (or a single file).
/// If `categories` is non-empty, only run fixtures in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let run_categories: BTreeMap<String, Vec<PathBuf>> = if path.is_file() {
        BTreeMap::from([(String::new(), vec![path.to_path_buf()])])
    } else {
        let all_categories = discover_categorized(path);
        if all_categories.is_empty() {
            eprintln!("no {} files found in {}", FIXTURE_SUFFIX, path.display());
            return 1;
        }
        select_categories(all_categories, categories)
    };

    if run_categories.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let mut passed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();

    for (cat, files) in &run_categories {
        if !path.is_file() {
            let header = if cat.is_empty() { "(root)" } else { cat.as_str() };
            eprintln!();
            eprintln!("{}", paint(header, "1", no_color));
        }

        for file in files {
            let result = run_single_test(file);
            match &result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", paint("PASS", "32", no_color), label_of(&result));
                }
                TestOutcome::Fail(_) => {
                    eprintln!("  {}  {}", paint("FAIL", "31", no_color), label_of(&result));
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for f in &failures {
            eprintln!();
            eprintln!("  --- {} ---", f.path.display());
            if let TestOutcome::Fail(reason) = &f.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    let failed = failures.len();
    if failed == 0 {
        eprintln!(
            "test result: {}. {} passed, 0 failed",
            paint("ok", "32", no_color),
            passed
        );
        0
    } else {
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            paint("FAILED", "31", no_color),
            passed,
            failed,
            passed + failed
        );
        1
    }
}

/// Keep the requested categories (and their subcategories); warn about unknown ones.
fn select_categories(
    all: BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<String, Vec<PathBuf>> {
    if requested.is_empty() {
        return all;
    }
    let mut filtered = BTreeMap::new();
    for requested in requested {
        let req = requested.trim_matches('/');
        let matching: Vec<&String> = all
            .keys()
            .filter(|cat| *cat == req || cat.starts_with(&format!("{}/", req)))
            .collect();
        if matching.is_empty() {
            eprintln!(
                "warning: category '{}' not found (available: {})",
                req,
                all.keys()
                    .map(|k| if k.is_empty() { "(root)" } else { k.as_str() })
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        for cat in matching {
            filtered.insert(cat.clone(), all[cat].clone());
        }
    }
    filtered
}
