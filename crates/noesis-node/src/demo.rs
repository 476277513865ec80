//! The kitchen world: a tomato, a cutting board, and the wish to cut something.

use noesis_core::{Expression, Logical, Result, SemanticType};
use noesis_state::Location;
use tracing::info;

use crate::state::AppState;

/// Seed the lexicon and the mind with the kitchen scene.
///
/// The agent wants some tomato cut, sees a tomato and a board, and knows it
/// can cut the tomato.
pub async fn kitchen(state: &AppState) -> Result<()> {
    let (tomato, board, cut) = {
        let mut lexicon = state.lexicon.write().await;
        lexicon.define("AT", SemanticType::relation())?;
        (
            lexicon.define("TOMATO", SemanticType::predicate())?,
            lexicon.define("BOARD", SemanticType::predicate())?,
            lexicon.define("CUT", SemanticType::predicate())?,
        )
    };
    let tomato = Expression::word(tomato);
    let board = Expression::word(board);
    let cut = Expression::word(cut);

    let mut mind = state.mind.write().await;
    let desire = Logical::Exists.apply(&[tomato.clone(), cut.clone()])?;
    mind.initialize(Vec::<Expression>::new(), vec![desire])?;

    let p1 = mind.construct_percept(&tomato, Location::new(1.0, 0.9, 2.0))?;
    mind.construct_percept(&board, Location::new(1.4, 0.9, 2.0))?;
    let can_cut = Logical::Able.apply(&[Logical::Myself.word(), cut.apply(&[p1])?])?;
    mind.assert_belief(can_cut)?;

    info!(
        "Kitchen seeded with {} belief(s) and {} desire(s)",
        mind.beliefs().count(),
        mind.desires().count()
    );
    Ok(())
}
