mod analysis;

pub use analysis::AnalysisView;
