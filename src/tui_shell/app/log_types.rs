use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::tui_shell) enum EntryKind {
    Output,
    Error,
}

#[derive(Clone, Debug)]
pub(in crate::tui_shell) struct ScrollEntry {
    pub(in crate::tui_shell) ts: OffsetDateTime,
    pub(in crate::tui_shell) kind: EntryKind,
    pub(in crate::tui_shell) lines: Vec<String>,
}
