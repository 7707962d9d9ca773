//! Runs proof cases through the core engine.

use kheight_core::{
    BlockError, BlockModel, Divergence, DivergenceOptions, GridBlock, Height, Topology,
};

use crate::case::{Case, Family, Workload};
use crate::error::CaseError;
use crate::families;
use crate::report::CaseRecord;

impl Case {
    fn fail(&self, source: BlockError) -> CaseError {
        CaseError::Block {
            label: self.label.clone(),
            k: self.k,
            source,
        }
    }
}

/// Evaluates one case and pairs the result with its metadata.
///
/// Topology and degeneracy failures abort the case and are returned with the
/// case label and k attached.
pub fn run_case(case: &Case, options: &DivergenceOptions) -> Result<CaseRecord, CaseError> {
    let span = tracing::info_span!("case", label = %case.label, k = case.k);
    let _enter = span.enter();

    let record = match &case.workload {
        Workload::Block {
            topology,
            augmentation_vertex,
        } => {
            let model = BlockModel::new(topology.clone()).map_err(|e| case.fail(e))?;
            let divergence = model
                .block_divergence(*augmentation_vertex, options)
                .map_err(|e| case.fail(e))?;
            let counts = (
                Some(model.fillings().len()),
                Some(model.boundary_constraints().len()),
            );
            record(case, divergence, counts, topology.clone())
        }
        Workload::Grid {
            layout,
            augmentation_vertices,
        } => {
            let grid = GridBlock::new(case.k, *layout).map_err(|e| case.fail(e))?;
            let mut best: Option<Divergence> = None;
            let mut scanned = 0;
            let mut target_reached = false;
            for &vertex in augmentation_vertices {
                let divergence = grid
                    .block_divergence(vertex, options)
                    .map_err(|e| case.fail(e))?;
                tracing::debug!(vertex = %vertex, value = divergence.value, "grid vertex done");
                scanned += divergence.scanned;
                target_reached |= divergence.target_reached;
                // Ties keep the earliest listed vertex.
                if best.as_ref().is_none_or(|b| divergence.value > b.value) {
                    best = Some(divergence);
                }
                if target_reached {
                    break;
                }
            }
            let divergence = best.ok_or_else(|| {
                case.fail(BlockError::InvalidLayout {
                    reason: "grid case lists no augmentation vertex".to_string(),
                })
            })?;
            let divergence = Divergence {
                scanned,
                target_reached,
                ..divergence
            };
            record(case, divergence, (None, None), layout.topology(case.k))
        }
    };

    tracing::info!(value = record.value, "case finished");
    Ok(record)
}

fn record(
    case: &Case,
    divergence: Divergence,
    (fillings, boundary_constraints): (Option<usize>, Option<usize>),
    topology: Topology,
) -> CaseRecord {
    CaseRecord {
        k: case.k,
        family: case.family,
        label: case.label.clone(),
        value: divergence.value,
        augmentation_vertex: divergence.vertex,
        maximizer: divergence.maximizer,
        fillings,
        boundary_constraints,
        scanned: divergence.scanned,
        target_reached: divergence.target_reached,
        topology,
    }
}

/// All cases of `families` for every k in `k_range`, k outermost.
pub fn sweep(selected: &[Family], k_range: impl IntoIterator<Item = Height>) -> Vec<Case> {
    k_range
        .into_iter()
        .flat_map(|k| selected.iter().flat_map(move |&family| families::cases(family, k)))
        .collect()
}
