//! Weapon research.
//!
//! A faction researches one weapon tier at a time, paying credits up front.
//! Each Income phase counts the project down; when it reaches zero the tier
//! becomes available to new platoons and arms the faction's Battle Cruisers.

use crate::resources::ResourceLedger;
use crate::state::{Faction, GameState, ResearchProject};
use crate::step::ActionError;
use crate::units::WeaponLevel;
use tracing::instrument;

pub fn start_research(
    state: &mut GameState,
    faction: Faction,
) -> Result<ResearchProject, ActionError> {
    let research = state.faction(faction).research;
    if research.project.is_some() {
        return Err(ActionError::ResearchInProgress);
    }
    let target = research.level.next().ok_or(ActionError::FullyResearched)?;

    state
        .faction_mut(faction)
        .ledger
        .spend(&ResourceLedger::credits(target.research_cost()))?;
    let project = ResearchProject {
        target,
        turns_remaining: target.research_turns(),
    };
    state.faction_mut(faction).research.project = Some(project);

    log::info!(
        "{} began researching {:?} weapons ({} turns)",
        faction,
        target,
        project.turns_remaining
    );
    Ok(project)
}

/// Advance every research project by one turn. Returns the tiers completed.
#[instrument(skip_all, name = "research")]
pub fn run_research_tick(state: &mut GameState) -> Vec<(Faction, WeaponLevel)> {
    let mut completed = Vec::new();
    for faction in Faction::BOTH {
        let research = &mut state.faction_mut(faction).research;
        let Some(project) = research.project.as_mut() else {
            continue;
        };
        project.turns_remaining = project.turns_remaining.saturating_sub(1);
        if project.turns_remaining > 0 {
            continue;
        }
        let target = project.target;
        research.level = target;
        research.project = None;
        log::info!("{} completed {:?} weapons research", faction, target);
        completed.push((faction, target));
    }
    completed
}
