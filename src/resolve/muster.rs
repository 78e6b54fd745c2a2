//! Army muster and classification.
//!
//! Every move order becomes an army that leaves its origin at the same
//! instant. Armies are then sorted into three buckets by comparing the owners
//! of their origin and destination:
//!
//! - same owner: a peaceful relocation, applied immediately;
//! - different owners, with armies crossing the same link in both directions:
//!   a battle on that link;
//! - different owners, nobody coming the other way: a siege of the destination.

use std::collections::BTreeMap;

use tracing::debug;

use crate::board::{Board, LinkId, MoveOrder};

use super::error::InvariantViolation;
use super::events::{Army, GarrisonChange, MoveEvent};

/// Contested armies meeting on one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleGroup {
    pub link: LinkId,
    pub armies: Vec<Army>,
}

/// The result of mustering one turn's move orders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Muster {
    /// Relocations already applied to the board.
    pub moves: Vec<MoveEvent>,
    /// Head-on encounters, ordered by link id.
    pub battles: Vec<BattleGroup>,
    /// Armies marching unopposed on an enemy or unowned tile.
    pub sieges: Vec<Army>,
}

/// Debits every order's troops from its origin, applies friendly relocations,
/// and groups the remaining armies into battles and sieges.
///
/// Orders are processed in canonical order, so the result does not depend on
/// the order they were submitted in.
pub fn muster_armies(board: &mut Board, orders: &[MoveOrder]) -> Result<Muster, InvariantViolation> {
    let mut orders = orders.to_vec();
    orders.sort_unstable();

    let mut departures = Vec::with_capacity(orders.len());
    for order in &orders {
        for tile in [order.source, order.target] {
            if board.tile(tile).is_none() {
                return Err(InvariantViolation::UnknownTile(tile));
            }
        }
        let link = board
            .find_link(order.source, order.target)
            .ok_or(InvariantViolation::MissingLink(order.source, order.target))?;

        let origin = &mut board.tiles[order.source];
        let before = origin.garrison;
        origin.garrison =
            before
                .checked_sub(order.troops)
                .ok_or(InvariantViolation::NegativeGarrison {
                    tile: order.source,
                    garrison: before,
                    troops: order.troops,
                })?;
        departures.push((
            order,
            link,
            GarrisonChange {
                before,
                after: origin.garrison,
            },
        ));
    }

    let mut muster = Muster::default();
    let mut contested: BTreeMap<LinkId, Vec<Army>> = BTreeMap::new();
    for (order, link, source) in departures {
        if board.tiles[order.source].owner != board.tiles[order.target].owner {
            contested.entry(link).or_default().push(Army::from_order(order));
            continue;
        }

        let target = &mut board.tiles[order.target];
        let before = target.garrison;
        target.garrison = before
            .checked_add(order.troops)
            .ok_or(InvariantViolation::GarrisonOverflow(order.target))?;
        debug!(
            player = order.player,
            troops = order.troops,
            from = order.source,
            to = order.target,
            "relocation"
        );
        muster.moves.push(MoveEvent {
            order: *order,
            source,
            target: GarrisonChange {
                before,
                after: target.garrison,
            },
        });
    }

    for (link, armies) in contested {
        let first_origin = armies[0].origin;
        if armies.iter().any(|a| a.origin != first_origin) {
            muster.battles.push(BattleGroup { link, armies });
        } else {
            muster.sieges.extend(armies);
        }
    }

    Ok(muster)
}
