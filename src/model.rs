use arboard::Clipboard;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, trace};

use crate::aggregate::{
    category_frequencies, histogram, top_n, CategoryCount, CategoryFrequencies, HistogramBin,
    NumericField,
};
use crate::dataset::Dataset;
use crate::domain::{AirscopeError, ExplorerConfig, HELP_TEXT, Message, TopN};
use crate::registry::{RowIndexRegistry, ViewId};
use crate::selection::{DetailView, InteractionController, SelectionEvent, SelectionState};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    DASHBOARD,
    POPUP,
}

/// Summaries shown by the chart views. They only depend on the dataset and
/// the view parameters, never on the current selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardViews {
    pub top_regions: Vec<CategoryCount>,
    pub latitude: Vec<HistogramBin>,
    pub longitude: Vec<HistogramBin>,
}

impl DashboardViews {
    pub fn compute(
        dataset: &Dataset,
        frequencies: &CategoryFrequencies,
        top: TopN,
        bins: usize,
    ) -> Result<Self, AirscopeError> {
        let (top_regions, (latitude, longitude)) = rayon::join(
            || top_n(frequencies, top.get()),
            || {
                rayon::join(
                    || histogram(dataset, NumericField::Latitude, bins),
                    || histogram(dataset, NumericField::Longitude, bins),
                )
            },
        );
        Ok(DashboardViews {
            top_regions: top_regions?,
            latitude: latitude?,
            longitude: longitude?,
        })
    }
}

struct MapView {
    filter: Option<String>,
    rows: Arc<Vec<usize>>, // Mapping of mark position to dataset row, in render order.
    cursor: usize,
}

/// Dataset rows drawn on the map, in the order they are drawn.
pub fn map_rows(dataset: &Dataset, filter: Option<&str>) -> Vec<usize> {
    dataset
        .iter()
        .enumerate()
        .filter(|(_, r)| r.has_coordinates())
        .filter(|(_, r)| filter.is_none() || r.region.as_deref() == filter)
        .map(|(idx, _)| idx)
        .collect()
}

pub struct UIData {
    pub name: String,
    pub dataset: Arc<Dataset>,
    pub views: DashboardViews,
    pub top_n: TopN,
    pub region_colors: HashMap<String, usize>,
    pub map_rows: Arc<Vec<usize>>,
    pub map_filter: Option<String>,
    pub map_cursor: usize,
    pub selected_row: Option<usize>,
    pub detail: DetailView,
    pub show_popup: bool,
    pub popup_message: String,
    pub status_message: String,
    pub last_update: Instant,
}

pub struct Model {
    pub status: Status,
    modus: Modus,
    dataset: Arc<Dataset>,
    frequencies: CategoryFrequencies,
    top_n: TopN,
    views: DashboardViews,
    map: MapView,
    registry: RowIndexRegistry,
    selection: InteractionController,
    uidata: UIData,
    clipboard: Option<Clipboard>,
}

impl Model {
    pub fn init(
        name: impl Into<String>,
        dataset: Arc<Dataset>,
        config: &ExplorerConfig,
    ) -> Result<Self, AirscopeError> {
        let start_time = Instant::now();
        let frequencies = category_frequencies(&dataset);
        let views = DashboardViews::compute(
            &dataset,
            &frequencies,
            config.top_n,
            config.histogram_bins,
        )?;
        info!(
            "Computed views for {} airports in {}ms",
            dataset.len(),
            start_time.elapsed().as_millis()
        );

        let region_colors = frequencies
            .counts
            .iter()
            .enumerate()
            .map(|(idx, c)| (c.category.clone(), idx))
            .collect();

        let selection = InteractionController::new();
        let uidata = UIData {
            name: name.into(),
            dataset: Arc::clone(&dataset),
            views: views.clone(),
            top_n: config.top_n,
            region_colors,
            map_rows: Arc::new(Vec::new()),
            map_filter: None,
            map_cursor: 0,
            selected_row: None,
            detail: selection.detail(&dataset),
            show_popup: false,
            popup_message: String::new(),
            status_message: String::new(),
            last_update: Instant::now(),
        };

        let mut model = Model {
            status: Status::READY,
            modus: Modus::DASHBOARD,
            dataset,
            frequencies,
            top_n: config.top_n,
            views,
            map: MapView {
                filter: None,
                rows: Arc::new(Vec::new()),
                cursor: 0,
            },
            registry: RowIndexRegistry::new(),
            selection,
            uidata,
            clipboard: None,
        };
        model.rebuild_map();
        model.set_status_message(format!("Loaded {} airports", model.dataset.len()));
        Ok(model)
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn selection_state(&self) -> SelectionState {
        self.selection.state()
    }

    pub fn registry(&self) -> &RowIndexRegistry {
        &self.registry
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), AirscopeError> {
        if let Some(msg) = message {
            trace!("Update: Modus {:?}, Message {:?}", self.modus, msg);
            match self.modus {
                Modus::DASHBOARD => match msg {
                    Message::Quit => self.quit(),
                    Message::Help => self.show_help(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    Message::IncreaseTopN => self.set_top_n(self.top_n.increment())?,
                    Message::DecreaseTopN => self.set_top_n(self.top_n.decrement())?,
                    Message::SelectMark(position) => self.select_mark(Some(position)),
                    Message::MarkCursorNext => self.move_map_cursor(1),
                    Message::MarkCursorPrev => self.move_map_cursor(-1),
                    Message::SelectCursorMark => {
                        let position = (!self.map.rows.is_empty()).then_some(self.map.cursor);
                        self.select_mark(position)
                    }
                    Message::NextMapFilter => self.next_map_filter(),
                    Message::ClearMapFilter => self.set_map_filter(None),
                    Message::CopyDetail => self.copy_detail(),
                    Message::Exit => (),
                },
                Modus::POPUP => match msg {
                    Message::Quit => self.quit(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    Message::Exit | Message::Help => self.exit(),
                    _ => (),
                },
            }
        }
        Ok(())
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    fn exit(&mut self) {
        trace!("Close popup ...");
        self.modus = Modus::DASHBOARD;
        self.uidata.show_popup = false;
        self.uidata.last_update = Instant::now();
    }

    fn show_help(&mut self) {
        self.modus = Modus::POPUP;
        self.uidata.popup_message = HELP_TEXT.to_string();
        self.uidata.show_popup = true;
        self.uidata.last_update = Instant::now();
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!("UI was resized to w:{width}, h:{height}");
        self.uidata.last_update = Instant::now();
    }

    fn set_top_n(&mut self, top: TopN) -> Result<(), AirscopeError> {
        if top == self.top_n {
            return Ok(());
        }
        self.top_n = top;
        self.views.top_regions = top_n(&self.frequencies, top.get())?;
        debug!("Showing top {} states", top.get());
        self.uidata.top_n = top;
        self.uidata.views = self.views.clone();
        self.set_status_message(format!("Showing top {} states", top.get()));
        Ok(())
    }

    fn rebuild_map(&mut self) {
        let rows = Arc::new(map_rows(&self.dataset, self.map.filter.as_deref()));
        self.registry.register(ViewId::Map, Arc::clone(&rows));
        self.map.rows = rows;
        self.map.cursor = 0;

        self.uidata.map_rows = Arc::clone(&self.map.rows);
        self.uidata.map_filter = self.map.filter.clone();
        self.uidata.map_cursor = self.map.cursor;
        self.uidata.last_update = Instant::now();
    }

    fn set_map_filter(&mut self, filter: Option<String>) {
        if filter == self.map.filter {
            return;
        }
        self.map.filter = filter;
        self.rebuild_map();
        let message = match &self.map.filter {
            Some(region) => format!("Map shows {} airports in {region}", self.map.rows.len()),
            None => format!("Map shows all {} airports", self.map.rows.len()),
        };
        self.set_status_message(message);
    }

    // Steps through the states of the bar chart, then back to all airports.
    fn next_map_filter(&mut self) {
        let regions = &self.views.top_regions;
        let next = match &self.map.filter {
            None => regions.first(),
            Some(current) => regions
                .iter()
                .position(|c| &c.category == current)
                .and_then(|idx| regions.get(idx + 1)),
        }
        .map(|c| c.category.clone());
        self.set_map_filter(next);
    }

    fn move_map_cursor(&mut self, step: isize) {
        let marks = self.map.rows.len();
        if marks == 0 {
            return;
        }
        self.map.cursor = (self.map.cursor as isize + step).rem_euclid(marks as isize) as usize;
        self.uidata.map_cursor = self.map.cursor;
        self.uidata.last_update = Instant::now();
    }

    fn select_mark(&mut self, mark_position: Option<usize>) {
        let event = mark_position.map(|mark_position| SelectionEvent { mark_position });
        let before = self.selection.state();
        let state = self.selection.handle(event, &self.registry, &self.dataset);

        if let (Some(position), SelectionState::Selected(_)) = (mark_position, state)
            && position < self.map.rows.len()
        {
            self.map.cursor = position;
            self.uidata.map_cursor = position;
        }
        self.uidata.detail = self.selection.detail(&self.dataset);
        self.uidata.selected_row = match state {
            SelectionState::Selected(row) => Some(row),
            SelectionState::Idle => None,
        };
        self.uidata.last_update = Instant::now();

        if state != before
            && let DetailView::Record(summary) = &self.uidata.detail
        {
            let message = format!("Selected {}", summary.title);
            self.set_status_message(message);
        }
    }

    fn copy_detail(&mut self) {
        let DetailView::Record(summary) = &self.uidata.detail else {
            self.set_status_message("Nothing selected to copy");
            return;
        };
        let text = summary.as_text();

        if self.clipboard.is_none() {
            self.clipboard = Clipboard::new()
                .map_err(|e| debug!("Clipboard not available: {:?}", e))
                .ok();
        }
        let result = match self.clipboard.as_mut() {
            Some(clipboard) => clipboard.set_text(text).map_err(|e| format!("{e:?}")),
            None => Err("no clipboard".to_string()),
        };
        match result {
            Ok(_) => self.set_status_message("Copied airport details to clipboard"),
            Err(e) => {
                trace!("Error copying to clipboard: {e}");
                self.set_status_message("Could not copy to clipboard");
            }
        }
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.uidata.status_message = message.into();
        self.uidata.last_update = Instant::now();
    }
}
