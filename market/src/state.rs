//! Application state for one viewer session.
//!
//! Holds everything the UI reads: the synthesizer (and so the current
//! snapshot), the display configuration, the last selection and pending
//! notices. It is an ordinary value owned by the caller; share it with
//! `Arc<RwLock<_>>` when a background feed needs to write into it.

use std::collections::VecDeque;
use std::sync::Arc;

use adapters::upstream::FetchError;
use chrono::{DateTime, Utc};
use corelib::{CurvePoint, Orderbook, OrderbookError, PairTag, Side};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::presentation::{DepthView, DisplayConfig, DisplayError, render, tooltip_lines};
use crate::selection::{SelectionOutcome, point_at, select};
use crate::synthesizer::{ApplyOutcome, FetchTicket, OrderbookSnapshot, OrderbookSynthesizer};

const MAX_NOTICES: usize = 32;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    #[error(transparent)]
    Display(#[from] DisplayError),

    #[error(transparent)]
    Orderbook(#[from] OrderbookError),

    #[error("no orderbook snapshot available yet")]
    NoSnapshot,

    #[error("no {side:?} point at index {index}")]
    PointOutOfRange { side: Side, index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Warning,
    Error,
}

/// Non-fatal, user-visible message about a failed refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub retryable: bool,
    pub at: DateTime<Utc>,
}

impl Notice {
    pub fn from_fetch_error(err: &FetchError) -> Self {
        let retryable = err.is_retryable();
        Self {
            level: if retryable {
                NoticeLevel::Warning
            } else {
                NoticeLevel::Error
            },
            message: err.to_string(),
            retryable,
            at: Utc::now(),
        }
    }
}

pub struct AppState {
    synthesizer: OrderbookSynthesizer,
    display: DisplayConfig,
    selection: Option<SelectionOutcome>,
    notices: VecDeque<Notice>,
}

impl AppState {
    pub fn new(pair: PairTag, display: DisplayConfig) -> Result<Self, StateError> {
        display.validate()?;
        Ok(Self {
            synthesizer: OrderbookSynthesizer::new(pair),
            display,
            selection: None,
            notices: VecDeque::new(),
        })
    }

    pub fn pair(&self) -> &PairTag {
        self.synthesizer.pair()
    }

    pub fn display(&self) -> &DisplayConfig {
        &self.display
    }

    /// Changes only how the next `view()` is drawn. An invalid config is
    /// rejected and the current one kept.
    pub fn set_display(&mut self, display: DisplayConfig) -> Result<(), StateError> {
        display.validate()?;
        self.display = display;
        Ok(())
    }

    pub fn switch_pair(&mut self, pair: PairTag) {
        self.synthesizer.switch_pair(pair);
        self.selection = None;
    }

    pub fn snapshot(&self) -> Option<Arc<OrderbookSnapshot>> {
        self.synthesizer.current()
    }

    pub fn view(&self) -> DepthView {
        render(self.synthesizer.current().as_deref(), &self.display)
    }

    pub fn begin_refresh(&mut self) -> FetchTicket {
        self.synthesizer.begin_refresh()
    }

    /// Feed back the result of a fetch.
    ///
    /// Errors never touch the current snapshot; they become a [`Notice`].
    /// Returns `None` for a failed fetch.
    pub fn complete_refresh(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Orderbook, FetchError>,
    ) -> Option<ApplyOutcome> {
        match result {
            Ok(orderbook) => Some(self.synthesizer.apply(ticket, orderbook)),
            Err(err) => {
                warn!(
                    pair = %ticket.pair,
                    seq = ticket.seq,
                    error = %err,
                    retryable = err.is_retryable(),
                    timeout = err.is_timeout(),
                    "orderbook fetch failed, keeping previous snapshot"
                );
                self.push_notice(Notice::from_fetch_error(&err));
                None
            }
        }
    }

    pub fn select_point(&mut self, point: &CurvePoint) -> Result<&SelectionOutcome, StateError> {
        let snapshot = self.synthesizer.current().ok_or(StateError::NoSnapshot)?;
        Ok(&*self.selection.insert(select(point, &snapshot)))
    }

    pub fn select_at(&mut self, side: Side, index: usize) -> Result<&SelectionOutcome, StateError> {
        let snapshot = self.synthesizer.current().ok_or(StateError::NoSnapshot)?;
        let point = point_at(&snapshot, side, index).ok_or(StateError::PointOutOfRange { side, index })?;
        Ok(&*self.selection.insert(select(point, &snapshot)))
    }

    pub fn selection(&self) -> Option<&SelectionOutcome> {
        self.selection.as_ref()
    }

    pub fn tooltip_at(&self, side: Side, index: usize) -> Result<Vec<String>, StateError> {
        let snapshot = self.synthesizer.current().ok_or(StateError::NoSnapshot)?;
        let point = point_at(&snapshot, side, index).ok_or(StateError::PointOutOfRange { side, index })?;
        Ok(tooltip_lines(point, &snapshot)?)
    }

    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    fn push_notice(&mut self, notice: Notice) {
        if self.notices.len() == MAX_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(notice);
    }
}
