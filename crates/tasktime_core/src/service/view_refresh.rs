//! Presentation refresh targets emitted after successful mutations.
//!
//! # Responsibility
//! - Name the views whose rendered rollups go stale after a write.
//! - Let the host plug in cache revalidation and navigation.
//!
//! # Invariants
//! - Events are only emitted after the store write succeeded.

use crate::model::{ProjectId, SubtaskId};
use std::cell::RefCell;
use std::fmt::{Display, Formatter};

/// One presentation view, rendered as its route path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewPath {
    /// Project listing at `/`.
    Overview,
    /// Project detail at `/projects/{project_id}`.
    Project(ProjectId),
    /// Subtask detail at `/projects/{project_id}/subtasks/{subtask_id}`.
    Subtask {
        project_id: ProjectId,
        subtask_id: SubtaskId,
    },
}

impl Display for ViewPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overview => write!(f, "/"),
            Self::Project(project_id) => write!(f, "/projects/{project_id}"),
            Self::Subtask {
                project_id,
                subtask_id,
            } => write!(f, "/projects/{project_id}/subtasks/{subtask_id}"),
        }
    }
}

/// Refresh request recorded by [`RecordingViewRefresh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    Revalidate(ViewPath),
    Redirect(ViewPath),
}

/// Sink for cache revalidation and navigation side effects.
pub trait ViewRefresh {
    /// Marks one view as stale.
    fn revalidate(&self, path: &ViewPath);
    /// Asks the host to navigate to one view.
    fn redirect(&self, path: &ViewPath);
}

impl<T: ViewRefresh + ?Sized> ViewRefresh for &T {
    fn revalidate(&self, path: &ViewPath) {
        (**self).revalidate(path);
    }

    fn redirect(&self, path: &ViewPath) {
        (**self).redirect(path);
    }
}

/// Discards every refresh request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopViewRefresh;

impl ViewRefresh for NoopViewRefresh {
    fn revalidate(&self, _path: &ViewPath) {}

    fn redirect(&self, _path: &ViewPath) {}
}

/// Collects refresh requests in call order.
#[derive(Debug, Default)]
pub struct RecordingViewRefresh {
    events: RefCell<Vec<ViewEvent>>,
}

impl RecordingViewRefresh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns and clears recorded events.
    pub fn take(&self) -> Vec<ViewEvent> {
        self.events.take()
    }

    /// Paths revalidated so far, without duplicates, in first-seen order.
    pub fn revalidated(&self) -> Vec<ViewPath> {
        let mut paths = Vec::new();
        for event in self.events.borrow().iter() {
            if let ViewEvent::Revalidate(path) = event {
                if !paths.contains(path) {
                    paths.push(*path);
                }
            }
        }
        paths
    }

    /// Last redirect target, if any.
    pub fn redirect_target(&self) -> Option<ViewPath> {
        self.events
            .borrow()
            .iter()
            .rev()
            .find_map(|event| match event {
                ViewEvent::Redirect(path) => Some(*path),
                ViewEvent::Revalidate(_) => None,
            })
    }
}

impl ViewRefresh for RecordingViewRefresh {
    fn revalidate(&self, path: &ViewPath) {
        self.events.borrow_mut().push(ViewEvent::Revalidate(*path));
    }

    fn redirect(&self, path: &ViewPath) {
        self.events.borrow_mut().push(ViewEvent::Redirect(*path));
    }
}
