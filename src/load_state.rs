// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-source load state and the reducer that combines two sources.
//!
//! A view can be fed by a parent coordinator's combined load and by a load it
//! owns itself. Each source moves through `Idle → Loading → Loaded | Failed`
//! independently. The combined view is loading when either source is, and
//! reports the parent's error in preference to its own.

/// State of one asynchronous data source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

/// What a view should render given both sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinedState {
    pub loading: bool,
    pub error: Option<String>,
}

/// Combine a parent-supplied source with an internally owned one.
pub fn combine(parent: &LoadState, internal: &LoadState) -> CombinedState {
    CombinedState {
        loading: parent.is_loading() || internal.is_loading(),
        error: parent.error().or(internal.error()).map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_is_logical_or() {
        let cases = [
            (LoadState::Idle, LoadState::Idle, false),
            (LoadState::Loading, LoadState::Loaded, true),
            (LoadState::Loaded, LoadState::Loading, true),
            (LoadState::Failed("x".into()), LoadState::Loaded, false),
        ];
        for (parent, internal, expected) in cases {
            assert_eq!(combine(&parent, &internal).loading, expected);
        }
    }

    #[test]
    fn parent_error_takes_priority() {
        let parent = LoadState::Failed("parent".into());
        let internal = LoadState::Failed("internal".into());
        assert_eq!(
            combine(&parent, &internal).error.as_deref(),
            Some("parent")
        );
        assert_eq!(
            combine(&LoadState::Loaded, &internal).error.as_deref(),
            Some("internal")
        );
        assert_eq!(combine(&LoadState::Loaded, &LoadState::Idle).error, None);
    }
}
