use itertools::Itertools;

use super::explanation::explain_power;
use super::host::Host;
use super::Permutation;
use super::VirtualFixings;
use crate::basic_types::BinaryValue;
use crate::basic_types::Fixing;
use crate::basic_types::Inconsistency;
use crate::basic_types::InferenceCode;
use crate::basic_types::Predicate;
use crate::symretope_assert_moderate;

/// Gives the algorithms access to the values of the entries, and a way to fix them.
///
/// Without virtual fixings, values are read from the host and fixings are posted to it. With
/// virtual fixings, fixings are only recorded in them; the host is then only read, and only if
/// `use_host_bounds` is set.
#[derive(Debug)]
pub(crate) struct FixingContext<'a, H: Host> {
    host: &'a mut H,
    variables: &'a [H::Variable],
    virtual_fixings: Option<&'a mut VirtualFixings>,
    use_host_bounds: bool,
    /// If present, every entry whose value is requested through [`FixingContext::value`] is
    /// marked.
    checked_entries: Option<&'a mut [bool]>,
}

impl<'a, H: Host> FixingContext<'a, H> {
    pub(crate) fn real(host: &'a mut H, variables: &'a [H::Variable]) -> Self {
        FixingContext {
            host,
            variables,
            virtual_fixings: None,
            use_host_bounds: true,
            checked_entries: None,
        }
    }

    pub(crate) fn with_virtual_fixings(
        host: &'a mut H,
        variables: &'a [H::Variable],
        virtual_fixings: &'a mut VirtualFixings,
        use_host_bounds: bool,
    ) -> Self {
        FixingContext {
            host,
            variables,
            virtual_fixings: Some(virtual_fixings),
            use_host_bounds,
            checked_entries: None,
        }
    }

    pub(crate) fn tracking_checked_entries(mut self, checked_entries: &'a mut [bool]) -> Self {
        self.checked_entries = Some(checked_entries);
        self
    }

    /// A context over `virtual_fixings` which reads the same host and marks the same entries.
    pub(crate) fn probe<'b>(
        &'b mut self,
        virtual_fixings: &'b mut VirtualFixings,
    ) -> FixingContext<'b, H> {
        FixingContext {
            host: &mut *self.host,
            variables: self.variables,
            virtual_fixings: Some(virtual_fixings),
            use_host_bounds: self.use_host_bounds,
            checked_entries: self.checked_entries.as_deref_mut(),
        }
    }

    pub(crate) fn is_virtual(&self) -> bool {
        self.virtual_fixings.is_some()
    }

    /// The value of `entry`, marking the entry as checked.
    pub(crate) fn value(&mut self, entry: usize) -> Option<BinaryValue> {
        if let Some(checked_entries) = self.checked_entries.as_deref_mut() {
            checked_entries[entry] = true;
        }
        self.lookup(entry)
    }

    /// The value of `entry`, without marking it.
    ///
    /// A value which is read from the host is cached in the virtual fixings, if any.
    pub(crate) fn lookup(&mut self, entry: usize) -> Option<BinaryValue> {
        if let Some(value) = self
            .virtual_fixings
            .as_deref()
            .and_then(|fixings| fixings.value(entry))
        {
            return Some(value);
        }

        if !self.use_host_bounds {
            return None;
        }

        let value = self.host.fixed_value(self.variables[entry], None)?;
        if let Some(fixings) = self.virtual_fixings.as_deref_mut() {
            fixings.set(entry, value);
        }
        Some(value)
    }

    /// Applies `fixing`; returns whether it changed anything.
    pub(crate) fn fix(
        &mut self,
        fixing: Fixing,
        inference_code: InferenceCode,
    ) -> Result<bool, Inconsistency> {
        match self.virtual_fixings.as_deref_mut() {
            None => {
                let predicate = Predicate::fixing(self.variables[fixing.entry], fixing.value);
                Ok(self.host.post(predicate, inference_code)?)
            }
            Some(fixings) => {
                let is_new = !fixings.get(fixing.entry).contains(fixing.value);
                fixings.set(fixing.entry, fixing.value);

                if fixings.is_contradictory(fixing.entry) {
                    Err(Inconsistency::Conflict)
                } else {
                    Ok(is_new)
                }
            }
        }
    }

    /// Hands the reason of a conflict to the host.
    ///
    /// Every cause is a power of the permutation under which the current bounds either imply the
    /// given fixing or, without fixing, are violated; the conflict is the union of the reasons.
    /// Nothing is reported when working on virtual fixings.
    pub(crate) fn report_conflict(
        &mut self,
        permutation: &Permutation,
        causes: &[(Option<Fixing>, u64)],
    ) {
        if self.is_virtual() || !self.host.is_conflict_analysis_applicable() {
            return;
        }

        let mut reason = Vec::new();
        for &(inferred, power) in causes {
            let explained = explain_power(
                &*self.host,
                self.variables,
                permutation,
                inferred,
                power,
                None,
                &mut reason,
            );
            symretope_assert_moderate!(explained, "conflict could not be explained");
        }

        self.host.begin_conflict();
        for predicate in reason.into_iter().unique() {
            self.host.add_bound_to_conflict(predicate, None);
        }
        self.host.commit_conflict();
    }
}
