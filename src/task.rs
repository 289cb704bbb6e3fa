//! Per-widget pending work.
//!
//! Each widget carries a [`TaskSet`]; the tree keeps a derived
//! "subtree dirty" flag so the drain can skip clean subtrees. Task kinds are
//! processed in declaration order: style, reflow, repaint, refresh, destroy.

use bitflags::bitflags;

bitflags! {
    /// Pending task kinds of one widget.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TaskSet: u8 {
        /// Recompute the computed style.
        const STYLE   = 0b0000_0001;
        /// Recompute the box of the widget and arrange its children.
        const REFLOW  = 0b0000_0010;
        /// Invalidate the whole canvas box of the widget.
        const REPAINT = 0b0000_0100;
        /// The widget holds invalid rects waiting to be composited.
        const REFRESH = 0b0000_1000;
        /// The widget is queued for destruction.
        const DESTROY = 0b0001_0000;

        /// What a freshly attached widget needs.
        const ATTACH = Self::STYLE.bits() | Self::REFLOW.bits() | Self::REPAINT.bits();
    }
}

/// One kind of pending work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskKind {
    StyleUpdate,
    Reflow,
    Repaint,
    Refresh,
    Destroy,
}

impl TaskKind {
    /// Every kind in processing order.
    pub const ALL: [TaskKind; 5] = [
        TaskKind::StyleUpdate,
        TaskKind::Reflow,
        TaskKind::Repaint,
        TaskKind::Refresh,
        TaskKind::Destroy,
    ];

    pub fn flag(self) -> TaskSet {
        match self {
            TaskKind::StyleUpdate => TaskSet::STYLE,
            TaskKind::Reflow => TaskSet::REFLOW,
            TaskKind::Repaint => TaskSet::REPAINT,
            TaskKind::Refresh => TaskSet::REFRESH,
            TaskKind::Destroy => TaskSet::DESTROY,
        }
    }
}

impl From<TaskKind> for TaskSet {
    fn from(kind: TaskKind) -> Self {
        kind.flag()
    }
}

impl TaskSet {
    /// The pending kinds in processing order.
    pub fn kinds(self) -> impl Iterator<Item = TaskKind> {
        TaskKind::ALL.into_iter().filter(move |k| self.contains(k.flag()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_twice_collapses() {
        let mut set = TaskSet::empty();
        set |= TaskKind::Reflow.into();
        set |= TaskKind::Reflow.into();
        assert_eq!(set.kinds().collect::<Vec<_>>(), vec![TaskKind::Reflow]);
    }

    #[test]
    fn kinds_in_processing_order() {
        let set = TaskSet::DESTROY | TaskSet::STYLE | TaskSet::REPAINT;
        assert_eq!(
            set.kinds().collect::<Vec<_>>(),
            vec![TaskKind::StyleUpdate, TaskKind::Repaint, TaskKind::Destroy]
        );
    }

    #[test]
    fn attach_set() {
        assert!(TaskSet::ATTACH.contains(TaskSet::STYLE | TaskSet::REFLOW | TaskSet::REPAINT));
        assert!(!TaskSet::ATTACH.contains(TaskSet::REFRESH));
    }
}
