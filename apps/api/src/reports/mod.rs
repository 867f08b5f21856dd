/// Reports: interview evaluation, covering the final report, feedback synthesis,
/// the analysis pipeline and its persistence.
pub mod feedback;
pub mod final_report;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod store;
#[cfg(test)]
pub mod testing;
