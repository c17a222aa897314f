use crate::domain::model::{MtgSet, SetType};
use std::collections::HashSet;
use std::fmt;
use tracing::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    Type(SetType),
    Digital,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionReason::Type(set_type) => write!(f, "{}", set_type),
            ExclusionReason::Digital => f.write_str("digital"),
        }
    }
}

/// Drops sets whose type is excluded, or digital-only sets when `exclude_digital` is on.
pub struct SetFilter {
    exclude_types: HashSet<SetType>,
    exclude_digital: bool,
    span: Span,
}

impl SetFilter {
    pub fn new<I: IntoIterator<Item = SetType>>(exclude_types: I, exclude_digital: bool) -> Self {
        Self {
            exclude_types: exclude_types.into_iter().collect(),
            exclude_digital,
            span: tracing::info_span!("filter"),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// The type check runs first, so a digital set of an excluded type reports its type.
    pub fn exclusion_reason(&self, set: &MtgSet) -> Option<ExclusionReason> {
        if self.exclude_types.contains(&set.set_type) {
            Some(ExclusionReason::Type(set.set_type))
        } else if self.exclude_digital && set.digital {
            Some(ExclusionReason::Digital)
        } else {
            None
        }
    }

    /// Returns the kept sets in their original order and the number dropped.
    pub fn apply(&self, sets: Vec<MtgSet>) -> (Vec<MtgSet>, usize) {
        let _entered = self.span.enter();
        tracing::info!("Removing unwanted sets");

        let mut kept = Vec::with_capacity(sets.len());
        let mut excluded = 0;
        for set in sets {
            match self.exclusion_reason(&set) {
                Some(reason) => {
                    tracing::info!("Removing set {} ({})", set, reason);
                    excluded += 1;
                }
                None => kept.push(set),
            }
        }

        (kept, excluded)
    }
}
