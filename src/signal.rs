use tokio::sync::mpsc;

use crate::{error::ErrorKind, models::SortBy};

/// How a failed list action can be re-run with its original parameters.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryAction {
    LoadFirst,
    Refresh,
    LoadMore,
    SwitchSort(SortBy),
}

/// Events a list pushes at its view. Granular where the view can animate
/// (insert/remove), coarse where it cannot (full change).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ListSignal {
    ItemsChanged,
    ItemsInserted { start: usize, count: usize },
    ItemRemoved { pos: usize },
    ScrollTo { pos: usize },
    Error { message: String, kind: ErrorKind, retry: Option<RetryAction> },
}

pub type SignalSender = mpsc::UnboundedSender<ListSignal>;
pub type SignalReceiver = mpsc::UnboundedReceiver<ListSignal>;

/// One channel per list; the view owns the receiving end.
pub fn channel() -> (SignalSender, SignalReceiver) {
    mpsc::unbounded_channel()
}
