// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The text-template evaluator used to render measurement paths (spec §1,
//! §3 "host-evaluated"/"local-evaluated" JobConfig). Out of scope per
//! spec.md §1 — represented here as a trait plus an in-memory fake.

use rc_core::JobConfig;

/// Server-side context a template is rendered against: the values that
/// differ between the host-evaluated and local-evaluated passes live in the
/// `JobConfig` itself (canonicalised separators); everything that is the
/// same for every recipient of a given job lives here.
#[derive(Debug, Clone)]
pub struct TemplateContext {
    pub job_id: i64,
    pub start_time_unix_secs: u64,
}

impl TemplateContext {
    pub fn new(job_id: i64, start_time_unix_secs: u64) -> Self {
        Self { job_id, start_time_unix_secs }
    }
}

/// Renders `$`-prefixed template variables (e.g. `$YYYY-$MM-$DD`,
/// `$MEAS_ID`) in a `JobConfig`'s `meas_name`/`meas_root_dir`/`description`
/// fields against a [`TemplateContext`]. Always called before a job is
/// dispatched, once for the host-evaluated variant and again (with further
/// path canonicalisation) for the local-evaluated variant sent to the
/// in-process recorder (spec §3).
pub trait TemplateEvaluator: Send + Sync {
    fn evaluate(&self, template: &JobConfig, context: &TemplateContext) -> JobConfig;
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;

    /// Substitutes a fixed, deterministic set of template variables so
    /// tests can assert exact rendered names without depending on wall
    /// clock time. `$MEAS_ID` becomes the job id; `$YYYY`/`$MM`/`$DD` are
    /// derived from `start_time_unix_secs` treated as whole days/months/
    /// years since an arbitrary epoch, which is stable and sufficient for
    /// assertions but not meant to match real calendar semantics.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct FakeTemplateEvaluator;

    impl FakeTemplateEvaluator {
        pub fn new() -> Self {
            Self
        }
    }

    impl TemplateEvaluator for FakeTemplateEvaluator {
        fn evaluate(&self, template: &JobConfig, context: &TemplateContext) -> JobConfig {
            let mut rendered = template.clone();
            rendered.job_id = context.job_id;
            rendered.meas_name = substitute(&template.meas_name, context);
            rendered.meas_root_dir = substitute(&template.meas_root_dir, context);
            rendered.description = substitute(&template.description, context);
            rendered
        }
    }

    fn substitute(input: &str, context: &TemplateContext) -> String {
        input
            .replace("$MEAS_ID", &context.job_id.to_string())
            .replace("$YYYY", &(1970 + context.start_time_unix_secs / (365 * 86_400)).to_string())
            .replace("$MM", &format!("{:02}", (context.start_time_unix_secs / (30 * 86_400)) % 12 + 1))
            .replace("$DD", &format!("{:02}", (context.start_time_unix_secs / 86_400) % 30 + 1))
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeTemplateEvaluator;

#[cfg(test)]
#[path = "template_evaluator_tests.rs"]
mod tests;
