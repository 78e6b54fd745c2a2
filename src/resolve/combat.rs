//! Battle and siege resolution.
//!
//! Both fights use the same rule: every army is ranked on its own by troop
//! count, the strongest wins, and it keeps the difference between its
//! strength and the runner-up's. An even top two leaves nobody standing.
//! Armies are never pooled, not even two sent by the same player.

use tracing::debug;

use crate::board::{Board, LinkId, PlayerId, TileId};

use super::error::InvariantViolation;
use super::events::{Army, BattleEvent, SiegeEvent, TileState};

/// Ranks individual forces and returns the winner with its survivors.
///
/// Equal forces keep their key order. Returns `None` for an empty fight; a
/// lone force wins unopposed.
fn clash<K: Copy + Ord>(forces: impl IntoIterator<Item = (K, u32)>) -> Option<(K, u32)> {
    let mut ranked: Vec<(K, u32)> = forces.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let (victor, strongest) = *ranked.first()?;
    let runner_up = ranked.get(1).map_or(0, |&(_, troops)| troops);
    Some((victor, strongest - runner_up))
}

/// Resolves armies meeting head-on along `link`.
///
/// None of the armies has reached a tile yet, so the board is not touched.
/// The survivor, if any, keeps its original heading.
pub fn resolve_battle(link: LinkId, mut armies: Vec<Army>) -> BattleEvent {
    armies.sort_by(Army::strongest_first);

    let survivor = clash(armies.iter().enumerate().map(|(i, a)| (i, a.troops)))
        .filter(|&(_, troops)| troops > 0)
        .map(|(i, troops)| Army {
            troops,
            ..armies[i]
        });

    debug!(
        link,
        armies = armies.len(),
        victor = ?survivor.map(|s| s.player),
        survivors = survivor.map_or(0, |s| s.troops),
        "battle"
    );

    BattleEvent {
        link,
        armies,
        survivor,
    }
}

/// Resolves `attackers` against the garrison standing on `location`.
///
/// The garrison defends for the tile's current owner. The tile changes hands
/// only if an attacker comes out strictly ahead; its new garrison is whatever
/// the winner has left, which may be zero.
pub fn resolve_siege(
    board: &mut Board,
    location: TileId,
    mut attackers: Vec<Army>,
) -> Result<SiegeEvent, InvariantViolation> {
    let tile = board
        .tile_mut(location)
        .ok_or(InvariantViolation::UnknownTile(location))?;
    attackers.sort_by(Army::strongest_first);

    let defender = TileState {
        owner: tile.owner,
        troops: tile.garrison,
    };
    tile.garrison = 0;

    // The defender ranks after attackers of equal strength.
    let forces = attackers
        .iter()
        .enumerate()
        .map(|(i, a)| (i, a.troops))
        .chain(std::iter::once((attackers.len(), defender.troops)));
    let (victor, survivors): (Option<PlayerId>, u32) = match clash(forces) {
        Some((i, troops)) => {
            let owner = attackers.get(i).map_or(defender.owner, |a| Some(a.player));
            (owner, troops)
        }
        None => (defender.owner, defender.troops),
    };

    if survivors > 0 {
        tile.owner = victor;
    }
    tile.garrison = survivors;
    let event = SiegeEvent {
        location,
        attackers,
        defender,
        outcome: TileState {
            owner: tile.owner,
            troops: tile.garrison,
        },
    };

    debug!(
        tile = location,
        attackers = event.attackers.len(),
        defender = ?defender.owner,
        owner = ?event.outcome.owner,
        troops = event.outcome.troops,
        captured = event.captured(),
        "siege"
    );

    Ok(event)
}
