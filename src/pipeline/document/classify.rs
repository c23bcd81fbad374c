use super::types::{RawDocument, StructureKind};

/// Decide whether a document is tabular or narrative.
///
/// Probes the first page for ruled tables. Any table means `Tabular`.
/// A probe failure is treated as "no tables" so this never fails; the
/// orchestrator re-validates the decision after segmentation.
pub fn classify(doc: &dyn RawDocument) -> StructureKind {
    match doc.probe_first_page_tables() {
        Ok(n) if n > 0 => {
            tracing::info!(tables = n, "Table-based document detected");
            StructureKind::Tabular
        }
        Ok(_) => {
            tracing::info!("Narrative document detected");
            StructureKind::Narrative
        }
        Err(e) => {
            tracing::warn!(error = %e, "Table probe failed, treating document as narrative");
            StructureKind::Narrative
        }
    }
}
