/// The entries which have been compared while growing implication trees; these are the candidates
/// for peeking.
///
/// An entry is recorded at most once per propagation, even after it has been taken out again.
#[derive(Clone, Debug, Default)]
pub(crate) struct ImpactfulEntries {
    stack: Vec<usize>,
    is_recorded: Vec<bool>,
}

impl ImpactfulEntries {
    pub(crate) fn new(num_entries: usize) -> Self {
        ImpactfulEntries {
            stack: Vec::new(),
            is_recorded: vec![false; num_entries],
        }
    }

    pub(crate) fn record(&mut self, entry: usize) {
        if !self.is_recorded[entry] {
            self.is_recorded[entry] = true;
            self.stack.push(entry);
        }
    }

    /// Takes out the most recently recorded entry.
    pub(crate) fn pop(&mut self) -> Option<usize> {
        self.stack.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_recorded_once() {
        let mut entries = ImpactfulEntries::new(3);

        entries.record(2);
        entries.record(0);
        entries.record(2);

        assert_eq!(Some(0), entries.pop());
        assert_eq!(Some(2), entries.pop());
        assert_eq!(None, entries.pop());

        entries.record(2);
        assert_eq!(None, entries.pop());
    }
}
