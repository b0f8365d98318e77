//! `transform` and `check` commands.
//!
//! Each input is read and run on its own: a file that cannot be read or
//! fails to compile is counted and reported, and the remaining files still
//! run. The command fails at the end if any file did.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rustc_hash::FxHashSet;

use super::InputArgs;
use crate::file::VirtualFile;
use crate::logger::ProgressLine;
use crate::pipeline::Pipeline;
use crate::{debug, log};

/// Transform every input and print it, or write it under `output`.
pub async fn transform_files(
    pipeline: &Pipeline,
    input: &InputArgs,
    output: Option<&Path>,
) -> Result<()> {
    let wrapper = Wrapper::load(input)?;
    let total = input.paths.len();

    let Some(dir) = output else {
        let mut failed = 0;
        for path in &input.paths {
            match run_one(pipeline, &wrapper, path).await {
                Some(file) => println!("{}", file.contents),
                None => failed += 1,
            }
        }
        return finish(failed, total);
    };

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let progress = ProgressLine::new("transform", total);
    let mut written: FxHashSet<PathBuf> = FxHashSet::default();
    let mut failed = 0;
    for path in &input.paths {
        let Some(file) = run_one(pipeline, &wrapper, path).await else {
            failed += 1;
            progress.inc_failed();
            continue;
        };
        let target = dir.join(file.path());
        if !written.insert(target.clone()) {
            log!("error"; "{}: output {} already written by another input", path.display(), target.display());
            failed += 1;
            progress.inc_failed();
            continue;
        }
        fs::write(&target, &file.contents)
            .with_context(|| format!("Failed to write {}", target.display()))?;
        debug!("transform"; "wrote {}", target.display());
        progress.inc();
    }
    progress.finish();
    finish(failed, total)
}

/// Run every input through the pipeline without writing anything.
pub async fn check_files(pipeline: &Pipeline, input: &InputArgs) -> Result<()> {
    let wrapper = Wrapper::load(input)?;
    let total = input.paths.len();

    let mut failed = 0;
    for path in &input.paths {
        if run_one(pipeline, &wrapper, path).await.is_some() {
            log!("check"; "{} ok", path.display());
        } else {
            failed += 1;
            log!("check"; "{} failed", path.display());
        }
    }
    finish(failed, total)
}

/// `--head` / `--tail` text applied to every input.
struct Wrapper {
    head: String,
    tail: String,
}

impl Wrapper {
    fn load(input: &InputArgs) -> Result<Self> {
        Ok(Self {
            head: read_optional(input.head.as_deref())?,
            tail: read_optional(input.tail.as_deref())?,
        })
    }

    fn read(&self, path: &Path) -> Result<VirtualFile> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(VirtualFile::from_path(path, contents)
            .with_head(self.head.clone())
            .with_tail(self.tail.clone()))
    }
}

/// Read and transform one input. Failures are already logged.
async fn run_one(pipeline: &Pipeline, wrapper: &Wrapper, path: &Path) -> Option<VirtualFile> {
    let file = match wrapper.read(path) {
        Ok(file) => file,
        Err(err) => {
            log!("error"; "{:#}", err);
            return None;
        }
    };
    pipeline.run(file).await.ok()
}

fn read_optional(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
        }
        None => Ok(String::new()),
    }
}

fn finish(failed: usize, total: usize) -> Result<()> {
    if failed > 0 {
        bail!("{failed} of {total} file(s) failed");
    }
    Ok(())
}
