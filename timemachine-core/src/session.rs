use tracing::debug;

use timemachine_catalog::{CatalogError, RecordStore};
use timemachine_types::ExploitRecord;

use crate::actuarial::{Adjustment, Weight, adjust};
use crate::band::RiskBand;
use crate::composition::ScoreComposition;

/// Per-session UI state: which record is shown and at what actuarial weight.
///
/// Owned by one controller and passed to renderers as an [`Analysis`].
/// Selecting a record always resets the weight to [`Weight::DEFAULT`].
#[derive(Debug)]
pub struct Session<'a> {
    store: &'a RecordStore,
    selected: Option<&'a ExploitRecord>,
    weight: Weight,
}

impl<'a> Session<'a> {
    pub fn new(store: &'a RecordStore) -> Self {
        Self {
            store,
            selected: None,
            weight: Weight::DEFAULT,
        }
    }

    /// Show `id`. An unknown id leaves the current selection untouched.
    pub fn select(&mut self, id: &str) -> Result<&'a ExploitRecord, CatalogError> {
        let record = self.store.get(id)?;
        self.selected = Some(record);
        self.weight = Weight::DEFAULT;
        debug!(id, weight = %self.weight, "record selected");
        Ok(record)
    }

    pub fn set_weight(&mut self, weight: Weight) {
        debug!(weight = %weight, "actuarial weight changed");
        self.weight = weight;
    }

    /// Return to the home screen.
    pub fn clear(&mut self) {
        self.selected = None;
        self.weight = Weight::DEFAULT;
    }

    pub fn selected_id(&self) -> Option<&'a str> {
        self.selected.map(|r| r.id.as_str())
    }

    pub fn weight(&self) -> Weight {
        self.weight
    }

    pub fn store(&self) -> &'a RecordStore {
        self.store
    }

    /// The current analysis, or `None` before anything is selected.
    pub fn analysis(&self) -> Option<Analysis<'a>> {
        self.selected.map(|r| Analysis::new(r, self.weight))
    }
}

/// A record at a chosen weight, with the derived score. Every renderer takes this.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Analysis<'a> {
    pub record: &'a ExploitRecord,
    pub weight: Weight,
    pub adjustment: Adjustment,
}

impl<'a> Analysis<'a> {
    pub fn new(record: &'a ExploitRecord, weight: Weight) -> Self {
        Self {
            record,
            weight,
            adjustment: adjust(&record.actuarial, weight),
        }
    }

    pub fn current_score(&self) -> i32 {
        self.adjustment.current_score
    }

    pub fn delta(&self) -> i32 {
        self.adjustment.delta
    }

    pub fn band(&self) -> RiskBand {
        RiskBand::from_score(self.current_score())
    }

    pub fn composition(&self) -> ScoreComposition {
        ScoreComposition::build(self.record, &self.adjustment)
    }

    /// Base analysis already at the ceiling; the actuarial overlay is not shown.
    pub fn at_max_risk(&self) -> bool {
        self.record.actuarial.show_max_risk_message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RecordStore {
        RecordStore::bundled().unwrap()
    }

    #[test]
    fn nothing_selected_initially() {
        let store = store();
        let session = Session::new(&store);
        assert!(session.analysis().is_none());
        assert_eq!(session.weight(), Weight::DEFAULT);
    }

    #[test]
    fn selection_resets_weight() {
        let store = store();
        let mut session = Session::new(&store);
        session.select("dao_2016").unwrap();
        session.set_weight(Weight::new(90).unwrap());
        assert_eq!(session.weight().percent(), 90);

        session.select("euler_2023").unwrap();
        assert_eq!(session.weight(), Weight::DEFAULT);
        assert_eq!(session.selected_id(), Some("euler_2023"));
    }

    #[test]
    fn reselecting_same_record_resets_weight() {
        let store = store();
        let mut session = Session::new(&store);
        session.select("dao_2016").unwrap();
        session.set_weight(Weight::MAX);
        session.select("dao_2016").unwrap();
        assert_eq!(session.weight(), Weight::DEFAULT);
    }

    #[test]
    fn unknown_selection_keeps_state() {
        let store = store();
        let mut session = Session::new(&store);
        session.select("mango_2022").unwrap();
        session.set_weight(Weight::new(70).unwrap());

        assert!(matches!(
            session.select("nope"),
            Err(CatalogError::NotFound(_))
        ));
        assert_eq!(session.selected_id(), Some("mango_2022"));
        assert_eq!(session.weight().percent(), 70);
    }

    #[test]
    fn default_analysis_matches_model() {
        let store = store();
        let mut session = Session::new(&store);
        for id in store.list() {
            let record = session.select(id).unwrap();
            let analysis = session.analysis().unwrap();
            assert_eq!(
                analysis.adjustment,
                adjust(&record.actuarial, Weight::DEFAULT)
            );
        }
    }

    #[test]
    fn dao_default_score() {
        let store = store();
        let mut session = Session::new(&store);
        session.select("dao_2016").unwrap();
        let analysis = session.analysis().unwrap();
        assert_eq!(analysis.current_score(), 68);
        assert_eq!(analysis.delta(), 6);
        assert_eq!(analysis.band(), RiskBand::High);
    }

    #[test]
    fn clear_returns_home() {
        let store = store();
        let mut session = Session::new(&store);
        session.select("dao_2016").unwrap();
        session.clear();
        assert!(session.selected_id().is_none());
        assert!(session.analysis().is_none());
    }
}
