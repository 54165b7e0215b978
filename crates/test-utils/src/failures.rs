use std::collections::HashSet;

use opset_service_manager::{Collaborator, CollaboratorError};
use parking_lot::Mutex;

/// Set of calls a fake collaborator should fail.
#[derive(Debug)]
pub struct FailureInjector {
    collaborator: Collaborator,
    calls: Mutex<HashSet<&'static str>>,
}

impl FailureInjector {
    pub fn new(collaborator: Collaborator) -> Self {
        Self {
            collaborator,
            calls: Mutex::new(HashSet::new()),
        }
    }

    /// Makes every later invocation of `call` fail.
    pub fn fail_on(&self, call: &'static str) {
        self.calls.lock().insert(call);
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    /// Returns the injected error if `call` was set to fail.
    pub fn check(&self, call: &'static str) -> Result<(), CollaboratorError> {
        if self.calls.lock().contains(call) {
            return Err(CollaboratorError::new(
                self.collaborator,
                call,
                "injected failure",
            ));
        }
        Ok(())
    }
}
