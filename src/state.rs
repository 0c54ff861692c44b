use std::path::Path;

use anyhow::Result;

use crate::brush::BrushRules;
use crate::config::{self, Sources};
use crate::data::fetch::PendingFetch;
use crate::data::loader::{self, DatasetKind};
use crate::data::model::{Dataset, GroupSpec};
use crate::scene::Scene;
use crate::scene::correlogram::{CorrelogramEvent, CorrelogramView};
use crate::scene::splom::SplomView;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Correlogram,
    Splom,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Where the two datasets are fetched from.
    pub sources: Sources,

    /// Which view fills the central panel.
    pub tab: Tab,

    /// Abalone correlation matrices (None until loaded).
    pub correlogram: Option<CorrelogramView>,

    /// Iris scatter-plot matrix (None until loaded).
    pub splom: Option<SplomView>,

    /// Edge rules handed to the brush of a newly built SPLOM.
    pub brush_rules: BrushRules,

    /// Errors shown in the UI, keyed by the dataset they concern.
    /// `None` holds the latest error that belongs to no dataset.
    errors: Vec<(Option<DatasetKind>, String)>,

    pending: Vec<PendingFetch>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Sources::from_env())
    }
}

impl AppState {
    pub fn new(sources: Sources) -> Self {
        Self {
            sources,
            tab: Tab::Correlogram,
            correlogram: None,
            splom: None,
            brush_rules: BrushRules::default(),
            errors: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Whether any fetch is still in flight.
    pub fn loading(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_kinds(&self) -> Vec<DatasetKind> {
        self.pending.iter().map(|p| p.kind).collect()
    }

    // -- fetching ---------------------------------------------------------

    /// Fetch both datasets in the background.
    pub fn start_fetches<F>(&mut self, notify: F)
    where
        F: Fn() + Clone + Send + 'static,
    {
        self.fetch(DatasetKind::Abalone, notify.clone());
        self.fetch(DatasetKind::Iris, notify);
    }

    /// Fetch one dataset unless a fetch for it is already running.
    pub fn fetch<F>(&mut self, kind: DatasetKind, notify: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.pending.iter().any(|p| p.kind == kind) {
            return;
        }
        let url = match kind {
            DatasetKind::Abalone => self.sources.abalone_url.clone(),
            DatasetKind::Iris => self.sources.iris_url.clone(),
        };
        self.pending.push(PendingFetch::spawn(&url, kind, notify));
    }

    /// Collect finished fetches. Returns true if anything changed.
    pub fn poll_fetches(&mut self) -> bool {
        let mut finished = Vec::new();
        self.pending.retain(|p| match p.poll() {
            Some(result) => {
                finished.push((p.kind, p.url.clone(), result));
                false
            }
            None => true,
        });

        let changed = !finished.is_empty();
        for (kind, url, result) in finished {
            match result {
                Ok(dataset) => self.set_dataset(kind, dataset),
                Err(e) => self.fail_for(kind, format!("Failed to fetch {} from {url}: {e}", kind.label())),
            }
        }
        changed
    }

    // -- loading ----------------------------------------------------------

    /// Ingest a dataset into the view it belongs to.
    pub fn set_dataset(&mut self, kind: DatasetKind, dataset: Dataset) {
        log::info!(
            "Loaded {} {} records with features {:?}",
            dataset.len(),
            kind.label(),
            dataset.features
        );
        match kind {
            DatasetKind::Abalone => self.set_abalone(&dataset),
            DatasetKind::Iris => self.set_iris(dataset),
        }
        self.errors.retain(|(k, _)| *k != Some(kind));
    }

    fn set_abalone(&mut self, dataset: &Dataset) {
        let specs: Vec<GroupSpec> = config::ABALONE_GROUPS
            .iter()
            .map(|(key, label)| GroupSpec::new(key, label))
            .collect();
        let groups = dataset.partition(&specs);
        let dropped = dataset.len() - groups.iter().map(|g| g.len()).sum::<usize>();
        if dropped > 0 {
            log::info!("{dropped} abalone records with an unknown sex were left out");
        }
        self.correlogram = Some(CorrelogramView::new(&groups, &dataset.features));
    }

    fn set_iris(&mut self, dataset: Dataset) {
        self.splom = Some(SplomView::new(dataset, self.brush_rules));
    }

    /// Load a local file; the extension picks the view.
    pub fn open_file(&mut self, path: &Path) -> Result<DatasetKind> {
        let (kind, dataset) = loader::load_file(path)?;
        self.install(kind, dataset);
        Ok(kind)
    }

    /// Load a local file into a given view regardless of its extension.
    pub fn open_file_as(&mut self, path: &Path, kind: DatasetKind) -> Result<()> {
        let dataset = loader::load_file_as(path, kind)?;
        self.install(kind, dataset);
        Ok(())
    }

    fn install(&mut self, kind: DatasetKind, dataset: Dataset) {
        self.set_dataset(kind, dataset);
        self.tab = match kind {
            DatasetKind::Abalone => Tab::Correlogram,
            DatasetKind::Iris => Tab::Splom,
        };
    }

    /// Log an error and show it in the top bar.
    pub fn fail(&mut self, message: String) {
        self.push_error(None, message);
    }

    /// Like [`AppState::fail`], but cleared once `kind` loads successfully.
    pub fn fail_for(&mut self, kind: DatasetKind, message: String) {
        self.push_error(Some(kind), message);
    }

    fn push_error(&mut self, kind: Option<DatasetKind>, message: String) {
        log::error!("{message}");
        self.errors.retain(|(k, _)| *k != kind);
        self.errors.push((kind, message));
    }

    pub fn errors(&self) -> impl Iterator<Item = &str> + '_ {
        self.errors.iter().map(|(_, msg)| msg.as_str())
    }

    pub fn error_for(&self, kind: DatasetKind) -> Option<&str> {
        self.errors
            .iter()
            .find(|(k, _)| *k == Some(kind))
            .map(|(_, msg)| msg.as_str())
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    // -- view interaction -------------------------------------------------

    pub fn select_group(&mut self, name: &str) -> bool {
        self.correlogram
            .as_mut()
            .is_some_and(|view| view.handle(&CorrelogramEvent::SelectGroup(name.to_string())))
    }

    /// Switch brush edge rules; rebuilds the SPLOM, which drops the brush.
    pub fn set_brush_rules(&mut self, rules: BrushRules) {
        if rules == self.brush_rules {
            return;
        }
        self.brush_rules = rules;
        if let Some(view) = self.splom.take() {
            self.splom = Some(SplomView::new(view.dataset().clone(), rules));
        }
    }

    /// Scene of the view on the current tab.
    pub fn current_scene(&self) -> Option<Scene> {
        match self.tab {
            Tab::Correlogram => self.correlogram.as_ref().map(|v| v.composite()),
            Tab::Splom => self.splom.as_ref().map(|v| v.scene().clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::{Duration, Instant};

    fn sources() -> Sources {
        Sources {
            abalone_url: "http://127.0.0.1:1/abalone.data".into(),
            iris_url: "http://127.0.0.1:1/iris.csv".into(),
        }
    }

    const ABALONE: &str = "\
M,0.455,0.365,0.095,0.514,0.2245,0.101,0.15,15
M,0.35,0.265,0.09,0.2255,0.0995,0.0485,0.07,7
F,0.53,0.42,0.135,0.677,0.2565,0.1415,0.21,9
F,0.545,0.425,0.125,0.768,0.294,0.1495,0.26,16
I,0.33,0.255,0.08,0.205,0.0895,0.0395,0.055,7
X,0.1,0.1,0.1,0.1,0.1,0.1,0.1,1
";

    #[test]
    fn opening_abalone_builds_three_groups() {
        let mut file = tempfile::Builder::new().suffix(".data").tempfile().unwrap();
        file.write_all(ABALONE.as_bytes()).unwrap();

        let mut state = AppState::new(sources());
        state.tab = Tab::Splom;
        let kind = state.open_file(file.path()).unwrap();
        assert_eq!(kind, DatasetKind::Abalone);
        assert_eq!(state.tab, Tab::Correlogram);

        let view = state.correlogram.as_ref().unwrap();
        let sizes: Vec<usize> = view.groups().iter().map(|g| g.records).collect();
        assert_eq!(sizes, vec![2, 2, 1]);

        assert!(state.select_group("infant"));
        assert!(!state.select_group("infant"));
        assert!(state.current_scene().is_some());
    }

    #[test]
    fn iris_file_as_explicit_kind() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"sepal length,sepal width,petal length,petal width,class\n5.1,3.5,1.4,0.2,Iris-setosa\n")
            .unwrap();

        let mut state = AppState::new(sources());
        state.open_file_as(file.path(), DatasetKind::Iris).unwrap();
        assert_eq!(state.tab, Tab::Splom);
        assert_eq!(state.splom.as_ref().unwrap().dataset().len(), 1);
    }

    #[test]
    fn switching_rules_rebuilds_splom() {
        let mut state = AppState::new(sources());
        let ds = loader::parse_text(
            "sepal length,sepal width,petal length,petal width,class\n5.1,3.5,1.4,0.2,Iris-setosa\n",
            &DatasetKind::Iris.schema(),
        )
        .unwrap();
        state.set_dataset(DatasetKind::Iris, ds);
        state.set_brush_rules(BrushRules::LEGACY);
        assert_eq!(state.splom.as_ref().unwrap().brush().rules(), BrushRules::LEGACY);
    }

    #[test]
    fn failed_fetch_surfaces_status() {
        let mut state = AppState::new(sources());
        state.fetch(DatasetKind::Iris, || {});
        state.fetch(DatasetKind::Iris, || {});
        assert_eq!(state.pending_kinds(), vec![DatasetKind::Iris]);

        let deadline = Instant::now() + Duration::from_secs(10);
        while state.loading() && Instant::now() < deadline {
            state.poll_fetches();
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(!state.loading());
        assert!(state.splom.is_none());
        let msg = state.error_for(DatasetKind::Iris).unwrap();
        assert!(msg.contains("iris"), "{msg}");
    }

    #[test]
    fn loading_one_dataset_keeps_the_other_error() {
        let mut state = AppState::new(sources());
        state.fail_for(DatasetKind::Abalone, "Failed to fetch abalone".into());
        state.fail("Nothing to export yet".into());

        let ds = loader::parse_text(
            "sepal length,sepal width,petal length,petal width,class\n5.1,3.5,1.4,0.2,Iris-setosa\n",
            &DatasetKind::Iris.schema(),
        )
        .unwrap();
        state.set_dataset(DatasetKind::Iris, ds);
        assert!(state.correlogram.is_none());
        assert_eq!(state.error_for(DatasetKind::Abalone), Some("Failed to fetch abalone"));

        let mut file = tempfile::Builder::new().suffix(".data").tempfile().unwrap();
        file.write_all(ABALONE.as_bytes()).unwrap();
        state.open_file(file.path()).unwrap();
        assert_eq!(state.error_for(DatasetKind::Abalone), None);
        assert_eq!(state.errors().collect::<Vec<_>>(), vec!["Nothing to export yet"]);
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut state = AppState::new(sources());
        let err = state.open_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }
}
