//! Which snapshot fields are relevant to a given command.
//!
//! Every command would otherwise capture the clipboard, the visible ranges and
//! both previous-command marks, turning unrelated host state into fixture
//! noise. The policy is a fixed table of [`ExclusionRule`]s; each field is
//! omitted when its rule holds.

use std::collections::BTreeSet;
use std::fmt;

use crate::recording::command::TestCaseCommand;
use crate::recording::target::{MarkType, Target, any_includes_mark_of_type};

/// Snapshot fields the policy can omit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SnapshotField {
    Clipboard,
    ThatMark,
    SourceMark,
    VisibleRanges,
}

impl SnapshotField {
    /// Name of the field as it appears in a serialized snapshot
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotField::Clipboard => "clipboard",
            SnapshotField::ThatMark => "thatMark",
            SnapshotField::SourceMark => "sourceMark",
            SnapshotField::VisibleRanges => "visibleRanges",
        }
    }
}

impl fmt::Display for SnapshotField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When a field is omitted
#[derive(Debug, Clone, Copy)]
pub enum ExclusionRule {
    /// The command's action is not one of these
    ActionNotIn(&'static [&'static str]),
    /// Initial snapshot only, and no target references this mark type.
    /// A command may produce such a mark, so final snapshots keep it.
    InitialUnlessTargeted(MarkType),
}

const CLIPBOARD_ACTIONS: &[&str] = &["copy", "paste"];

const VISIBLE_RANGE_ACTIONS: &[&str] = &[
    "fold",
    "unfold",
    "scrollToBottom",
    "scrollToCenter",
    "scrollToTop",
];

pub const EXCLUSION_RULES: &[(SnapshotField, ExclusionRule)] = &[
    (
        SnapshotField::Clipboard,
        ExclusionRule::ActionNotIn(CLIPBOARD_ACTIONS),
    ),
    (
        SnapshotField::ThatMark,
        ExclusionRule::InitialUnlessTargeted(MarkType::That),
    ),
    (
        SnapshotField::SourceMark,
        ExclusionRule::InitialUnlessTargeted(MarkType::Source),
    ),
    (
        SnapshotField::VisibleRanges,
        ExclusionRule::ActionNotIn(VISIBLE_RANGE_ACTIONS),
    ),
];

impl ExclusionRule {
    pub fn applies(
        &self,
        command: &TestCaseCommand,
        initial_snapshot: bool,
        full_targets: &[Target],
    ) -> bool {
        match self {
            ExclusionRule::ActionNotIn(actions) => !command.is_action(actions),
            ExclusionRule::InitialUnlessTargeted(mark_type) => {
                initial_snapshot && !any_includes_mark_of_type(full_targets, *mark_type)
            }
        }
    }
}

/// Set of fields to leave out of one snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludedFields(BTreeSet<SnapshotField>);

impl ExcludedFields {
    pub fn contains(&self, field: SnapshotField) -> bool {
        self.0.contains(&field)
    }

    pub fn includes(&self, field: SnapshotField) -> bool {
        !self.contains(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = SnapshotField> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<SnapshotField> for ExcludedFields {
    fn from_iter<I: IntoIterator<Item = SnapshotField>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for ExcludedFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.iter().map(|field| field.as_str()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// Fields to omit from a snapshot of `command` over `full_targets`
pub fn excluded_fields(
    command: &TestCaseCommand,
    initial_snapshot: bool,
    full_targets: &[Target],
) -> ExcludedFields {
    let excluded: ExcludedFields = EXCLUSION_RULES
        .iter()
        .filter(|(_, rule)| rule.applies(command, initial_snapshot, full_targets))
        .map(|(field, _)| *field)
        .collect();

    log::trace!(
        "excluding {excluded} from {} snapshot of '{}'",
        if initial_snapshot { "initial" } else { "final" },
        command.action
    );

    excluded
}
