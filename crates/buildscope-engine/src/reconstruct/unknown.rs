use buildscope_types::{
    DiagnosticNode, Error, ErrorType, NodeKind, RecoverableReadError, Result, UnknownDataBehavior,
};
use std::collections::BTreeMap;

/// Counts of records that could not be interpreted, per error type.
#[derive(Debug, Default)]
pub struct UnknownDataTally {
    counts: BTreeMap<ErrorType, usize>,
}

impl UnknownDataTally {
    /// Apply `behavior` to one skipped record.
    ///
    /// Only `ThrowException` turns it into an error; every other policy
    /// counts it and keeps going.
    pub fn record(
        &mut self,
        behavior: UnknownDataBehavior,
        err: RecoverableReadError,
    ) -> Result<()> {
        match behavior {
            UnknownDataBehavior::ThrowException => {
                return Err(Error::UnknownData {
                    error_type: err.error_type,
                    record_kind: err.record_kind,
                    message: err.message,
                });
            }
            UnknownDataBehavior::Ignore => {
                log::trace!("Ignoring unreadable record '{}': {}", err.record_kind, err.message);
            }
            UnknownDataBehavior::Error
            | UnknownDataBehavior::Warning
            | UnknownDataBehavior::Message => {
                log::warn!(
                    "Skipping unreadable record '{}' ({}): {}",
                    err.record_kind,
                    err.error_type,
                    err.message
                );
            }
        }

        *self.counts.entry(err.error_type).or_default() += 1;
        Ok(())
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn count(&self, error_type: ErrorType) -> usize {
        self.counts.get(&error_type).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// One line describing all skipped records
    pub fn summary_text(&self) -> String {
        let total = self.total();
        let breakdown = self
            .counts
            .iter()
            .map(|(error_type, count)| format!("{}: {}", error_type, count))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Skipped {} {} that could not be read ({}). The log was likely written by a newer version of the build engine; update this reader to see all data.",
            total,
            if total == 1 { "record" } else { "records" },
            breakdown
        )
    }

    /// Summary node for the configured severity, if the policy wants one
    pub fn summary_node(&self, behavior: UnknownDataBehavior) -> Option<NodeKind> {
        if self.is_empty() {
            return None;
        }
        let node = DiagnosticNode::new(self.summary_text());
        match behavior {
            UnknownDataBehavior::Error => Some(NodeKind::Error(node)),
            UnknownDataBehavior::Warning => Some(NodeKind::Warning(node)),
            UnknownDataBehavior::Message => Some(NodeKind::Message(node)),
            UnknownDataBehavior::Ignore | UnknownDataBehavior::ThrowException => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unknown(kind: &str) -> RecoverableReadError {
        RecoverableReadError::new(ErrorType::UnknownEventData, kind, "not understood")
    }

    #[test]
    fn test_counts_per_error_type() {
        let mut tally = UnknownDataTally::default();
        tally.record(UnknownDataBehavior::Warning, unknown("40")).unwrap();
        tally.record(UnknownDataBehavior::Warning, unknown("41")).unwrap();
        tally
            .record(
                UnknownDataBehavior::Warning,
                RecoverableReadError::new(ErrorType::UnknownFormatOfEventData, "7", "short read"),
            )
            .unwrap();

        assert_eq!(tally.total(), 3);
        assert_eq!(tally.count(ErrorType::UnknownEventData), 2);
        assert_eq!(
            tally.summary_text(),
            "Skipped 3 records that could not be read (unknown event data: 2, unknown format of event data: 1). The log was likely written by a newer version of the build engine; update this reader to see all data."
        );
    }

    #[test]
    fn test_throw_policy_fails_immediately() {
        let mut tally = UnknownDataTally::default();
        let err = tally
            .record(UnknownDataBehavior::ThrowException, unknown("40"))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownData { ref record_kind, .. } if record_kind == "40"));
        assert!(tally.is_empty());
    }

    #[test]
    fn test_summary_node_severity() {
        let mut tally = UnknownDataTally::default();
        assert!(tally.summary_node(UnknownDataBehavior::Error).is_none());

        tally.record(UnknownDataBehavior::Ignore, unknown("40")).unwrap();
        assert!(matches!(
            tally.summary_node(UnknownDataBehavior::Error),
            Some(NodeKind::Error(_))
        ));
        assert!(matches!(
            tally.summary_node(UnknownDataBehavior::Message),
            Some(NodeKind::Message(_))
        ));
        assert!(tally.summary_node(UnknownDataBehavior::Ignore).is_none());
        assert!(tally.summary_text().starts_with("Skipped 1 record that"));
    }
}
