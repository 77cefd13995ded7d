//! Paging through versions, independent of any terminal.

/// Input to the history pager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent {
    Previous,
    Next,
    First,
    Last,
    ShowDiff,
    Quit,
    Ignored,
}

/// What the pager should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Show(usize),
    ShowDiff(usize),
    Quit,
}

/// Step the pager over `count` versions from `index`. Movement clamps at both
/// ends; an empty list can only quit.
pub fn navigate(count: usize, index: usize, event: NavEvent) -> NavOutcome {
    if count == 0 {
        return NavOutcome::Quit;
    }
    let last = count - 1;
    let index = index.min(last);

    match event {
        NavEvent::Previous => NavOutcome::Show(index.saturating_sub(1)),
        NavEvent::Next => NavOutcome::Show((index + 1).min(last)),
        NavEvent::First => NavOutcome::Show(0),
        NavEvent::Last => NavOutcome::Show(last),
        NavEvent::ShowDiff => NavOutcome::ShowDiff(index),
        NavEvent::Quit => NavOutcome::Quit,
        NavEvent::Ignored => NavOutcome::Show(index),
    }
}
