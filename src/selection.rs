use tracing::{debug, warn};

use crate::dataset::{AirportRecord, Dataset};
use crate::registry::{RowIndexRegistry, ViewId};

pub const DETAIL_PROMPT: &str = "Click on an airport in the map to see details";

/// A click on a mark of the map view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionEvent {
    pub mark_position: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    Selected(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordSummary {
    pub row: usize,
    pub title: String,
    pub lines: Vec<String>,
}

impl RecordSummary {
    pub fn from_record(row: usize, record: &AirportRecord) -> Self {
        RecordSummary {
            row,
            title: format!("{} ({})", record.display_name, record.code),
            lines: vec![
                format!("Location: {}", record.city_line),
                format!(
                    "Coordinates: {:.4}, {:.4}",
                    record.latitude, record.longitude
                ),
                format!(
                    "State: {}",
                    record.region.as_deref().unwrap_or("unknown")
                ),
            ],
        }
    }

    pub fn as_text(&self) -> String {
        std::iter::once(self.title.as_str())
            .chain(self.lines.iter().map(|l| l.as_str()))
            .collect::<Vec<&str>>()
            .join("\n")
    }
}

/// What the detail panel shows.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailView {
    Prompt(String),
    Record(RecordSummary),
}

/// Turns selections on the map into the row shown by the detail panel.
///
/// Starts `Idle`; every successfully resolved selection replaces the
/// current one. Selections that can not be resolved are dropped and the
/// previous state is kept.
#[derive(Debug, Default)]
pub struct InteractionController {
    state: SelectionState,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn handle(
        &mut self,
        event: Option<SelectionEvent>,
        registry: &RowIndexRegistry,
        dataset: &Dataset,
    ) -> SelectionState {
        let Some(event) = event else {
            debug!("Ignoring empty selection event");
            return self.state;
        };

        match registry.resolve(ViewId::Map, event.mark_position) {
            Ok(row) if row < dataset.len() => {
                debug!("Mark {} resolved to row {row}", event.mark_position);
                self.state = SelectionState::Selected(row);
            }
            Ok(row) => {
                warn!(
                    "Mark {} resolved to row {row} outside of the {} rows of the dataset",
                    event.mark_position,
                    dataset.len()
                );
            }
            Err(e) => warn!("Dropping selection: {e}"),
        }
        self.state
    }

    pub fn detail(&self, dataset: &Dataset) -> DetailView {
        match self.state {
            SelectionState::Selected(row) => match dataset.get(row) {
                Some(record) => DetailView::Record(RecordSummary::from_record(row, record)),
                None => DetailView::Prompt(DETAIL_PROMPT.to_string()),
            },
            SelectionState::Idle => DetailView::Prompt(DETAIL_PROMPT.to_string()),
        }
    }
}
