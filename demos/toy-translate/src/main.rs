mod model;

use beamline::backend::{DeviceInfo, HostTensor};
use beamline::search::{HostBestHyps, Scorer, Search, SearchConfig};
use beamline::Sentences;

use crate::model::LexiconModel;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let model = LexiconModel::new(200, &[(10, 101), (11, 102), (12, 103)]);
    let scorers: Vec<Box<dyn Scorer<HostTensor>>> = vec![Box::new(model)];

    let mut search = Search::new(
        DeviceInfo::cpu(),
        scorers,
        Box::new(HostBestHyps::new(true)),
        None,
        SearchConfig::default()
            .with_beam_size(2)
            .with_normalize_score(true),
    )
    .expect("valid configuration");

    // Second sentence carries a word the lexicon does not know.
    let batch = Sentences::from_words(vec![vec![10, 11, 12], vec![12, 99]]);
    let histories = search.translate(&batch).await.expect("decodes the batch");

    for history in histories.iter() {
        for (rank, translation) in history.n_best(2).iter().enumerate() {
            println!(
                "sentence {} #{} [{:.3}]: {:?}",
                history.sentence_index(),
                rank,
                translation.score(),
                translation.words()
            );
        }
    }
}
