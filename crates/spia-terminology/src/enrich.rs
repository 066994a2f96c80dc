use std::sync::Arc;

use spia_model::{CodeSystemId, RefsetEntry};

use crate::client::TerminologyService;
use crate::error::{Result, TerminologyError};
use crate::lookup::{batch_lookup, is_inactive, lookup_parameters};

/// Reports whether a code is active in its code system.
pub trait ActiveStatusChecker: Send + Sync {
    fn is_active(&self, system: CodeSystemId, code: &str) -> Result<bool>;
}

/// Attaches server-side display text to reference set entries.
#[derive(Clone)]
pub struct TerminologyEnricher {
    service: Arc<dyn TerminologyService>,
}

impl TerminologyEnricher {
    pub fn new(service: Arc<dyn TerminologyService>) -> Self {
        Self { service }
    }

    /// Looks up the display of each entry's code in one round-trip and
    /// returns the entries with `native_display` set, in the same order.
    pub fn add_displays(
        &self,
        entries: Vec<RefsetEntry>,
        system: CodeSystemId,
    ) -> Result<Vec<RefsetEntry>> {
        let codes: Vec<String> = entries
            .iter()
            .map(|entry| entry.code.clone().unwrap_or_default())
            .collect();
        let displays = batch_lookup(self.service.as_ref(), system.uri(), &codes)?;
        Ok(entries
            .into_iter()
            .zip(displays)
            .map(|(entry, display)| entry.with_native_display(display))
            .collect())
    }

    /// Looks up the display of every unit code of every entry in one
    /// round-trip and returns the entries with `unit_displays` set.
    pub fn add_unit_displays(&self, entries: Vec<RefsetEntry>) -> Result<Vec<RefsetEntry>> {
        let codes: Vec<String> = entries
            .iter()
            .flat_map(|entry| entry.unit_codes.iter().cloned())
            .collect();
        let mut displays = batch_lookup(self.service.as_ref(), CodeSystemId::Ucum.uri(), &codes)?
            .into_iter();
        Ok(entries
            .into_iter()
            .map(|entry| {
                let count = entry.unit_codes.len();
                let own: Vec<Option<String>> = displays.by_ref().take(count).collect();
                entry.with_unit_displays(own)
            })
            .collect())
    }
}

impl ActiveStatusChecker for TerminologyEnricher {
    fn is_active(&self, system: CodeSystemId, code: &str) -> Result<bool> {
        let parameters = lookup_parameters(system.uri(), code, &["inactive"]);
        let response = self.service.lookup(&parameters)?;
        match response.get("resourceType").and_then(|t| t.as_str()) {
            Some("Parameters") => Ok(!is_inactive(&response)),
            Some(other) => Err(TerminologyError::MalformedResponse(format!(
                "$lookup for {code} returned {other}"
            ))),
            None => Err(TerminologyError::MalformedResponse(format!(
                "$lookup for {code} returned no resource"
            ))),
        }
    }
}

impl std::fmt::Debug for TerminologyEnricher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminologyEnricher").finish_non_exhaustive()
    }
}
