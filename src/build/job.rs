//! Compile jobs and run planning.
//!
//! A job is one source file to compile, with its output path and the
//! post-processing decision fixed at plan time.

use crate::build::options::{CompileOptions, PrefixOptions};
use crate::build::output::resolve_output_path;
use crate::build::policy::post_processing_applies;
use crate::build::resolve::resolve_changed_file;
use crate::build::source::{display_name, is_source_file};
use std::path::{Path, PathBuf};

/// A single file to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Sass source to compile
    pub source: PathBuf,
    /// Where the CSS is written; never recomputed after planning
    pub output: PathBuf,
    /// Whether the prefixer runs on the compiled CSS
    pub apply_post_processing: bool,
}

impl Job {
    /// Create a job for `source`, resolving its output path now.
    pub fn plan(source: PathBuf, apply_post_processing: bool) -> Self {
        let output = resolve_output_path(&source);
        Self { source, output, apply_post_processing }
    }

    /// Name reported in events: the output file name without extension.
    pub fn name(&self) -> String {
        display_name(&self.output)
    }
}

/// Why a run was skipped without emitting any events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The changed file is not a Sass source
    UnsupportedExtension(PathBuf),
    /// Resolution produced no files to compile
    NoJobs(PathBuf),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::UnsupportedExtension(path) => {
                write!(f, "{} is not a Sass source", path.display())
            }
            SkipReason::NoJobs(path) => {
                write!(f, "nothing to compile for {}", path.display())
            }
        }
    }
}

/// Ordered, deduplicated jobs for one run.
#[derive(Debug, Default)]
pub struct CompilePlan {
    jobs: Vec<Job>,
}

impl CompilePlan {
    /// Create a new empty plan.
    pub fn new() -> Self {
        Self { jobs: vec![] }
    }

    /// Plan the jobs triggered by a change to `changed`.
    pub fn for_change(
        changed: &Path,
        compile: &CompileOptions,
        prefix: &PrefixOptions,
    ) -> Result<Self, SkipReason> {
        if !is_source_file(changed) {
            return Err(SkipReason::UnsupportedExtension(changed.to_path_buf()));
        }

        let project_root = compile.project_root.as_deref();
        let sources =
            resolve_changed_file(changed, project_root, compile.dependency_index.as_ref());

        let mut plan = Self::new();
        for source in sources {
            let apply = prefix.enabled
                && post_processing_applies(
                    &source,
                    &prefix.include_rules,
                    &prefix.exclude_rules,
                    project_root,
                );
            plan.add_job(Job::plan(source, apply));
        }

        if plan.is_empty() {
            return Err(SkipReason::NoJobs(changed.to_path_buf()));
        }
        Ok(plan)
    }

    /// Add a job unless one for the same source is already planned.
    pub fn add_job(&mut self, job: Job) {
        if !self.jobs.iter().any(|j| j.source == job.source) {
            self.jobs.push(job);
        }
    }

    /// Get all jobs in plan order.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Take ownership of the jobs.
    pub fn into_jobs(self) -> Vec<Job> {
        self.jobs
    }

    /// Get the number of jobs in the plan.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Check if the plan is empty.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::resolve::DependencyIndex;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(&path).unwrap();
        path
    }

    #[test]
    fn test_unsupported_extension_is_skipped() {
        let result = CompilePlan::for_change(
            Path::new("/p/readme.md"),
            &CompileOptions::default(),
            &PrefixOptions::default(),
        );
        assert_eq!(result.unwrap_err(), SkipReason::UnsupportedExtension("/p/readme.md".into()));
    }

    #[test]
    fn test_lonely_partial_is_skipped() {
        let temp = TempDir::new().unwrap();
        let partial = touch(temp.path(), "_vars.scss");

        let result = CompilePlan::for_change(
            &partial,
            &CompileOptions::default(),
            &PrefixOptions::default(),
        );
        assert!(matches!(result, Err(SkipReason::NoJobs(_))));
    }

    #[test]
    fn test_plan_single_file() {
        let temp = TempDir::new().unwrap();
        let source = touch(temp.path(), "scss/app.scss");
        fs::create_dir_all(temp.path().join("css")).unwrap();

        let plan =
            CompilePlan::for_change(&source, &CompileOptions::default(), &PrefixOptions::default())
                .unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.jobs()[0].output, temp.path().join("css/app.css"));
        assert_eq!(plan.jobs()[0].name(), "app");
        assert!(!plan.jobs()[0].apply_post_processing);
    }

    #[test]
    fn test_plan_deduplicates_index_entries() {
        let temp = TempDir::new().unwrap();
        let partial = touch(temp.path(), "_vars.scss");
        let mut index = DependencyIndex::new();
        index.insert(
            "_vars.scss".to_string(),
            vec!["b.scss".to_string(), "a.scss".to_string(), "b.scss".to_string()],
        );
        let compile = CompileOptions {
            project_root: Some(temp.path().to_path_buf()),
            dependency_index: Some(index),
            ..Default::default()
        };

        let plan = CompilePlan::for_change(&partial, &compile, &PrefixOptions::default()).unwrap();
        let sources: Vec<_> = plan.jobs().iter().map(|j| j.source.clone()).collect();
        assert_eq!(sources, vec![temp.path().join("b.scss"), temp.path().join("a.scss")]);
    }

    #[test]
    fn test_plan_post_processing_per_job() {
        let temp = TempDir::new().unwrap();
        let partial = touch(temp.path(), "_vars.scss");
        let mut index = DependencyIndex::new();
        index.insert(
            "_vars.scss".to_string(),
            vec!["components/a.scss".to_string(), "vendor/b.scss".to_string()],
        );
        let compile = CompileOptions {
            project_root: Some(temp.path().to_path_buf()),
            dependency_index: Some(index),
            ..Default::default()
        };
        let prefix = PrefixOptions {
            enabled: true,
            exclude_rules: vec!["vendor/".to_string()],
            ..Default::default()
        };

        let plan = CompilePlan::for_change(&partial, &compile, &prefix).unwrap();
        assert!(plan.jobs()[0].apply_post_processing);
        assert!(!plan.jobs()[1].apply_post_processing);
    }

    #[test]
    fn test_disabled_prefixer_never_applies() {
        let temp = TempDir::new().unwrap();
        let source = touch(temp.path(), "app.scss");
        let compile = CompileOptions::default();
        let prefix = PrefixOptions { enabled: false, ..Default::default() };

        let plan = CompilePlan::for_change(&source, &compile, &prefix).unwrap();
        assert!(!plan.jobs()[0].apply_post_processing);
    }

    #[test]
    fn test_skip_reason_display() {
        let reason = SkipReason::NoJobs(PathBuf::from("_a.scss"));
        assert_eq!(reason.to_string(), "nothing to compile for _a.scss");
    }
}
