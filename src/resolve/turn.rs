//! Turn processing.
//!
//! Runs the full phase pipeline for one turn on a private copy of the board:
//!
//! 1. deploys
//! 2. muster, with friendly relocations applied on the spot
//! 3. travel snapshot
//! 4. battles, whose survivors join the sieges of their destinations
//! 5. sieges
//! 6. elimination and income
//!
//! The input state is never modified; everything that happened is returned
//! as a [`TurnRecord`].

use std::collections::BTreeMap;

use tracing::debug;

use crate::board::{Board, DeployOrder, Gamestate, MoveOrder, Player, Rules, TileId};

use super::combat::{resolve_battle, resolve_siege};
use super::error::InvariantViolation;
use super::events::{Army, BattleEvent, DeployEvent, GarrisonChange, MoveEvent, SiegeEvent};
use super::muster::muster_armies;

/// Everything that happened during one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRecord {
    /// State before any order was applied.
    pub start: Gamestate,
    /// State after deploys and relocations, with every contested army still in transit.
    pub travel: Gamestate,
    /// State after all fighting, with refreshed income and elimination flags.
    pub end: Gamestate,
    pub deploy_events: Vec<DeployEvent>,
    pub move_events: Vec<MoveEvent>,
    pub battle_events: Vec<BattleEvent>,
    pub siege_events: Vec<SiegeEvent>,
}

impl TurnRecord {
    /// Total troops added by deploys.
    pub fn troops_deployed(&self) -> u64 {
        self.deploy_events.iter().map(|d| u64::from(d.troops())).sum()
    }

    /// Total troops destroyed in battles and sieges.
    pub fn troops_lost(&self) -> u64 {
        let battles = self.battle_events.iter().map(|b| {
            let engaged: u64 = b.armies.iter().map(|a| u64::from(a.troops)).sum();
            engaged - b.survivor.map_or(0, |s| u64::from(s.troops))
        });
        let sieges = self.siege_events.iter().map(|s| {
            let engaged: u64 = s.attackers.iter().map(|a| u64::from(a.troops)).sum::<u64>()
                + u64::from(s.defender.troops);
            engaged - u64::from(s.outcome.troops)
        });
        battles.chain(sieges).sum()
    }
}

/// Resolves one turn of orders against `state`.
///
/// Orders are sorted canonically before use, so the record does not depend
/// on the order they were submitted in. Any [`InvariantViolation`] abandons
/// the whole turn.
pub fn process_turn(
    state: &Gamestate,
    deploys: &[DeployOrder],
    moves: &[MoveOrder],
) -> Result<TurnRecord, InvariantViolation> {
    let mut board = state.board.clone();

    let deploy_events = execute_deploys(&mut board, deploys)?;
    let muster = muster_armies(&mut board, moves)?;

    let travel = Gamestate::new(board.clone(), state.players.clone(), state.rules);

    let mut besieged: BTreeMap<TileId, Vec<Army>> = BTreeMap::new();
    for army in muster.sieges {
        besieged.entry(army.destination).or_default().push(army);
    }

    let mut battle_events = Vec::with_capacity(muster.battles.len());
    for group in muster.battles {
        let event = resolve_battle(group.link, group.armies);
        if let Some(survivor) = event.survivor {
            besieged.entry(survivor.destination).or_default().push(survivor);
        }
        battle_events.push(event);
    }

    let mut siege_events = Vec::with_capacity(besieged.len());
    for (location, attackers) in besieged {
        siege_events.push(resolve_siege(&mut board, location, attackers)?);
    }

    debug!(
        deploys = deploy_events.len(),
        moves = muster.moves.len(),
        battles = battle_events.len(),
        sieges = siege_events.len(),
        "turn resolved"
    );

    let players = update_players(&state.players, &board, &state.rules);
    for player in players.iter().filter(|p| !p.active) {
        if state.player(player.id).is_some_and(|p| p.active) {
            debug!(player = player.id, "player eliminated");
        }
    }

    Ok(TurnRecord {
        start: state.clone(),
        travel,
        end: Gamestate::new(board, players, state.rules),
        deploy_events,
        move_events: muster.moves,
        battle_events,
        siege_events,
    })
}

/// Credits each deploy to its tile, in canonical order.
fn execute_deploys(
    board: &mut Board,
    deploys: &[DeployOrder],
) -> Result<Vec<DeployEvent>, InvariantViolation> {
    let mut deploys = deploys.to_vec();
    deploys.sort_unstable();

    let mut events = Vec::with_capacity(deploys.len());
    for order in deploys {
        let tile = board
            .tile_mut(order.tile)
            .ok_or(InvariantViolation::UnknownTile(order.tile))?;
        let before = tile.garrison;
        tile.garrison = before
            .checked_add(order.troops)
            .ok_or(InvariantViolation::GarrisonOverflow(order.tile))?;
        debug!(
            player = order.player,
            troops = order.troops,
            tile = order.tile,
            "deploy"
        );
        events.push(DeployEvent {
            player: order.player,
            tile: order.tile,
            garrison: GarrisonChange {
                before,
                after: tile.garrison,
            },
        });
    }
    Ok(events)
}

/// Recomputes activity and next-turn income for every player.
///
/// A player is active while it controls at least one tile. Inactive players
/// earn nothing.
fn update_players(players: &[Player], board: &Board, rules: &Rules) -> Vec<Player> {
    players
        .iter()
        .map(|p| {
            let owned = board.tiles_owned_by(p.id);
            let active = owned > 0;
            Player {
                id: p.id,
                active,
                armies_to_deploy: if active { rules.income(owned) } else { 0 },
            }
        })
        .collect()
}
