//! Load stage: resolve input paths and extract every file on a worker pool.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use glob::glob;
use rayon::prelude::*;

use crate::extractor::{TransactionExtractor, create_extractor};
use crate::log::RunLog;
use crate::models::{Configuration, Transaction, TransactionCollection};

const SUPPORTED_EXTENSIONS: [&str; 2] = ["pdf", "csv"];

/// Resolve files and directories into a sorted, de-duplicated list of
/// statement files.
pub fn resolve_files(paths: &[PathBuf], recursive: bool, log: &RunLog) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            files.extend(list_directory(path, recursive, log));
        } else if path.is_file() && is_statement_file(path) {
            files.push(path.clone());
        } else {
            log.warning(format_args!(
                "{}: not a PDF/CSV file or a directory, skipping",
                path.display()
            ));
        }
    }

    files.sort();
    files.dedup();
    if files.is_empty() {
        log.warning("no statement files found in the given paths");
    }
    files
}

fn is_statement_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

fn list_directory(dir: &Path, recursive: bool, log: &RunLog) -> Vec<PathBuf> {
    if recursive {
        let pattern = format!(
            "{}/**/*",
            glob::Pattern::escape(&dir.to_string_lossy())
        );
        let entries = match glob(&pattern) {
            Ok(entries) => entries,
            Err(e) => {
                log.warning(format_args!("{}: {}", dir.display(), e));
                return Vec::new();
            }
        };
        return entries
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    log.warning(format_args!("{}", e));
                    None
                }
            })
            .filter(|p| p.is_file() && is_statement_file(p))
            .collect();
    }

    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_statement_file(p))
            .collect(),
        Err(e) => {
            log.warning(format_args!("{}: {}", dir.display(), e));
            Vec::new()
        }
    }
}

/// Resolve the configured input paths and extract all of them.
pub fn load(config: &Configuration, log: &RunLog) -> TransactionCollection {
    let files = resolve_files(&config.input_paths, config.recursive, log);
    load_files(&files, config, log)
}

/// Extract `files` with up to `config.jobs` workers.
///
/// Results are merged in the order of `files`, so the output does not depend
/// on scheduling. A file that fails contributes no transactions.
pub fn load_files(files: &[PathBuf], config: &Configuration, log: &RunLog) -> TransactionCollection {
    if files.is_empty() {
        return TransactionCollection::new();
    }

    let workers = config.jobs.clamp(1, files.len());
    log.debug(format_args!("extracting {} files with {} workers", files.len(), workers));

    let extract_all = || {
        files
            .par_iter()
            .map(|path| isolated(path, log, || extract_file(path, config, log)))
            .collect::<Vec<_>>()
    };

    let results = match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool.install(extract_all),
        Err(e) => {
            log.warning(format_args!("cannot start worker pool, using the shared one: {}", e));
            extract_all()
        }
    };

    results.into_iter().flatten().collect()
}

/// Run one file's extraction; a panic costs only this file.
fn isolated<F>(path: &Path, log: &RunLog, extract: F) -> Vec<Transaction>
where
    F: FnOnce() -> Vec<Transaction>,
{
    match panic::catch_unwind(AssertUnwindSafe(extract)) {
        Ok(transactions) => transactions,
        Err(_) => {
            log.error(format_args!("{}: extractor panicked, file skipped", path.display()));
            Vec::new()
        }
    }
}

fn extract_file(path: &Path, config: &Configuration, log: &RunLog) -> Vec<Transaction> {
    let extractor = match create_extractor(path, config, log) {
        Ok(Some(extractor)) => extractor,
        Ok(None) => return Vec::new(),
        Err(e) => {
            log.warning(format_args!("{}: {}", path.display(), e));
            return Vec::new();
        }
    };

    match extractor.extract_transactions(log) {
        Ok(transactions) => {
            log.success(format_args!(
                "{}: {} transactions ({})",
                path.display(),
                transactions.len(),
                extractor.kind()
            ));
            transactions
        }
        Err(e) => {
            log.warning(format_args!("{}: {}", path.display(), e));
            Vec::new()
        }
    }
}
