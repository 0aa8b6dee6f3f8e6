use std::path::Path;
use std::sync::Arc;

use crate::color::ColorMap;
use crate::data::filter::FilterSelection;
use crate::data::loader::{DataSource, DatasetCache};
use crate::data::model::Dataset;
use crate::view::{render, ViewModel};

/// The two categorical sidebar selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Disease,
    Region,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Source of the dataset currently shown.
    pub source: DataSource,

    /// Memo of every dataset loaded during this process.
    cache: DatasetCache,

    /// Loaded dataset (None only when the startup load failed).
    pub dataset: Option<Arc<Dataset>>,

    /// Fatal startup failure; when set nothing else is rendered.
    pub load_error: Option<String>,

    /// Current sidebar selection.
    pub selection: FilterSelection,

    /// Output of the last render pass.
    pub view: Option<ViewModel>,

    /// Line colours (time series is coloured by region).
    pub region_colors: ColorMap,

    /// Bar colours (bar chart is coloured by disease).
    pub disease_colors: ColorMap,

    /// Non-fatal status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    /// Load `source` once and build the initial view at full extent.
    pub fn load(source: DataSource) -> Self {
        let mut state = AppState {
            source: source.clone(),
            cache: DatasetCache::new(),
            dataset: None,
            load_error: None,
            selection: FilterSelection::full_extent(&Dataset::default()),
            view: None,
            region_colors: ColorMap::default(),
            disease_colors: ColorMap::default(),
            status_message: None,
        };

        match state.cache.fetch(&source) {
            Ok(dataset) => state.set_dataset(source, dataset),
            Err(e) => {
                log::error!("Failed to load {source}: {e}");
                state.load_error = Some(format!("Failed to load {source}: {e}"));
            }
        }
        state
    }

    /// Ingest a loaded dataset: reset selectors to full extent, rebuild colours and view.
    pub fn set_dataset(&mut self, source: DataSource, dataset: Arc<Dataset>) {
        self.selection = FilterSelection::full_extent(&dataset);
        self.region_colors = ColorMap::new(dataset.regions());
        self.disease_colors = ColorMap::new(dataset.diseases());
        self.source = source;
        self.dataset = Some(dataset);
        self.status_message = None;
        self.rerender();
    }

    /// Load another local file through the cache. On failure the current dataset stays.
    pub fn open_file(&mut self, path: &Path) {
        let source = DataSource::File(path.to_path_buf());
        match self.cache.fetch(&source) {
            Ok(dataset) => self.set_dataset(source, dataset),
            Err(e) => {
                log::error!("Failed to load file: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Recompute the view from the current selection.
    pub fn rerender(&mut self) {
        if let Some(ds) = &self.dataset {
            self.view = Some(render(ds, &self.selection));
        }
    }

    fn selected_mut(&mut self, dim: Dimension) -> &mut std::collections::BTreeSet<String> {
        match dim {
            Dimension::Disease => &mut self.selection.diseases,
            Dimension::Region => &mut self.selection.regions,
        }
    }

    /// Toggle a single label in a selector.
    pub fn toggle_value(&mut self, dim: Dimension, value: &str) {
        let selected = self.selected_mut(dim);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.rerender();
    }

    /// Select all labels of a selector.
    pub fn select_all(&mut self, dim: Dimension) {
        let Some(ds) = self.dataset.clone() else {
            return;
        };
        *self.selected_mut(dim) = match dim {
            Dimension::Disease => ds.diseases().clone(),
            Dimension::Region => ds.regions().clone(),
        };
        self.rerender();
    }

    /// Deselect all labels of a selector.
    pub fn select_none(&mut self, dim: Dimension) {
        self.selected_mut(dim).clear();
        self.rerender();
    }

    /// Set the inclusive year range. `lo > hi` is allowed and selects nothing.
    pub fn set_years(&mut self, lo: i32, hi: i32) {
        self.selection.years = (lo, hi);
        self.rerender();
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const CSV: &str = "\
Disease,Region,Year,Cases
Flu,North,2019,10
Flu,South,2020,12
Measles,North,2021,5
";

    fn csv_source(dir: &tempfile::TempDir, name: &str, contents: &str) -> DataSource {
        let path = dir.path().join(name);
        std::fs::File::create(&path)
            .unwrap()
            .write_all(contents.as_bytes())
            .unwrap();
        DataSource::File(path)
    }

    #[test]
    fn startup_selects_full_extent() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::load(csv_source(&dir, "cases.csv", CSV));

        assert!(state.load_error.is_none());
        assert_eq!(state.selection.years, (2019, 2021));
        assert_eq!(state.selection.diseases.len(), 2);
        assert_eq!(state.view.as_ref().unwrap().filtered.len(), 3);
    }

    #[test]
    fn startup_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::load(DataSource::File(dir.path().join("missing.csv")));

        assert!(state.load_error.is_some());
        assert!(state.dataset.is_none());
        assert!(state.view.is_none());
    }

    #[test]
    fn selector_changes_rerender() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::load(csv_source(&dir, "cases.csv", CSV));

        state.toggle_value(Dimension::Disease, "Flu");
        assert_eq!(state.view.as_ref().unwrap().filtered.len(), 1);

        state.toggle_value(Dimension::Disease, "Flu");
        state.set_years(2020, 2020);
        assert_eq!(state.view.as_ref().unwrap().filtered.len(), 1);

        state.set_years(2021, 2019);
        assert!(state.view.as_ref().unwrap().filtered.is_empty());
    }

    #[test]
    fn select_none_then_all() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::load(csv_source(&dir, "cases.csv", CSV));

        state.select_none(Dimension::Region);
        let view = state.view.as_ref().unwrap();
        assert!(view.filtered.is_empty());
        assert!(view.bars.facets.is_empty());

        state.select_all(Dimension::Region);
        assert_eq!(state.view.as_ref().unwrap().filtered.len(), 3);
    }

    #[test]
    fn failed_open_keeps_current_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::load(csv_source(&dir, "cases.csv", CSV));

        state.open_file(&dir.path().join("absent.csv"));
        assert!(state.status_message.is_some());
        assert_eq!(state.dataset.as_ref().unwrap().len(), 3);
        assert!(state.load_error.is_none());
    }

    #[test]
    fn open_file_resets_selection() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::load(csv_source(&dir, "cases.csv", CSV));
        state.select_none(Dimension::Disease);

        let other = csv_source(
            &dir,
            "other.csv",
            "Disease,Region,Year,Cases\nCholera,West,2015,7\n",
        );
        let DataSource::File(path) = other.clone() else {
            unreachable!()
        };
        state.open_file(&path);

        assert_eq!(state.source, other);
        assert_eq!(state.selection.years, (2015, 2015));
        assert_eq!(state.view.as_ref().unwrap().filtered.len(), 1);
    }
}
