//! Scope-based start/complete logging for one unit of work
//!
//! - Logs `{name}_START` on creation
//! - Logs `{name}_COMPLETE` with `duration_ms` on `complete`
//! - Logs `{name}_FAILED` on `fail`
//! - Logs `{name}_ABANDONED` on drop if neither was called

use std::time::Instant;

use super::logger::Logger;

/// A scope that logs the lifecycle of an operation.
///
/// The scope owns its fields so it can be held across `.await` points.
pub struct ObservationScope {
    name: &'static str,
    fields: Vec<(&'static str, String)>,
    timer: Timer,
    finished: bool,
}

impl ObservationScope {
    /// Open a scope with identifying fields attached to every event it logs.
    pub fn with_fields(name: &'static str, fields: &[(&'static str, &str)]) -> Self {
        let scope = Self {
            name,
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            timer: Timer::new(),
            finished: false,
        };
        Logger::info(&format!("{}_START", name), &scope.field_refs());
        scope
    }

    /// Mark the scope as successfully completed
    pub fn complete(mut self, extra_fields: &[(&str, &str)]) {
        self.finished = true;
        let elapsed = self.timer.elapsed_ms();

        let mut all_fields = self.field_refs();
        all_fields.extend(extra_fields.iter().copied());
        all_fields.push(("duration_ms", elapsed.as_str()));

        Logger::info(&format!("{}_COMPLETE", self.name), &all_fields);
    }

    /// Mark the scope as failed with an error code and reason
    pub fn fail(mut self, code: &str, reason: &str) {
        self.finished = true;

        let mut all_fields = self.field_refs();
        all_fields.push(("code", code));
        all_fields.push(("reason", reason));

        Logger::error(&format!("{}_FAILED", self.name), &all_fields);
    }

    /// Check if the scope has been completed or failed
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn field_refs(&self) -> Vec<(&str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect()
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        // A dropped request future lands here; the database call itself is not interrupted
        if !self.finished {
            let mut fields = self.field_refs();
            fields.push(("reason", "scope dropped before completion"));
            Logger::warn(&format!("{}_ABANDONED", self.name), &fields);
        }
    }
}

/// A simple duration timer for logging elapsed time
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed milliseconds as a string
    pub fn elapsed_ms(&self) -> String {
        self.start.elapsed().as_millis().to_string()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
