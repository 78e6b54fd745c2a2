//! Random order generation.
//!
//! Produces orders that always resolve cleanly: deploys spend exactly the
//! player's income on tiles it owns, and each owned tile sends at most one
//! move to a neighbor, never more troops than it holds after deploying.

use std::collections::BTreeMap;

use rand::Rng;

use crate::board::{DeployOrder, Gamestate, MoveOrder, PlayerId, PlayerOrders, TileId};

/// Chance that an owned tile sends troops out this turn.
const MOVE_PROBABILITY: f64 = 0.5;

/// Generates a random set of legal orders for `player`.
///
/// Eliminated or unknown players get no orders.
pub fn random_orders(player: PlayerId, state: &Gamestate, rng: &mut impl Rng) -> PlayerOrders {
    let mut orders = PlayerOrders::new();
    let Some(me) = state.player(player).filter(|p| p.active) else {
        return orders;
    };

    let owned: Vec<TileId> = state
        .board
        .tiles
        .iter()
        .filter(|t| t.is_owned_by(player))
        .map(|t| t.id)
        .collect();
    if owned.is_empty() {
        return orders;
    }

    let mut deployed: BTreeMap<TileId, u32> = BTreeMap::new();
    for _ in 0..me.armies_to_deploy {
        let tile = owned[rng.gen_range(0..owned.len())];
        *deployed.entry(tile).or_default() += 1;
    }
    orders.deploys = deployed
        .iter()
        .map(|(&tile, &troops)| DeployOrder {
            player,
            tile,
            troops,
        })
        .collect();

    for &source in &owned {
        let tile = &state.board.tiles[source];
        let available = tile
            .garrison
            .saturating_add(deployed.get(&source).copied().unwrap_or(0));
        if available == 0 || tile.neighbors.is_empty() || !rng.gen_bool(MOVE_PROBABILITY) {
            continue;
        }
        let target = tile.neighbors[rng.gen_range(0..tile.neighbors.len())];
        orders.moves.push(MoveOrder {
            player,
            source,
            target,
            troops: rng.gen_range(1..=available),
        });
    }

    orders
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Scenario;
    use crate::resolve::process_turn;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn state() -> Gamestate {
        let mut state = Scenario::default().setup(&[1, 2]).unwrap();
        state.board.tiles[0].garrison = 4;
        state.players[0].armies_to_deploy = 6;
        state
    }

    #[test]
    fn deploys_spend_exact_income_on_owned_tiles() {
        let state = state();
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..50 {
            let orders = random_orders(1, &state, &mut rng);
            let total: u32 = orders.deploys.iter().map(|d| d.troops).sum();
            assert_eq!(total, 6);
            assert!(orders.deploys.iter().all(|d| d.tile == 0 && d.player == 1));
        }
    }

    #[test]
    fn moves_follow_links_and_fit_garrison() {
        let state = state();
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..50 {
            let orders = random_orders(1, &state, &mut rng);
            for m in &orders.moves {
                assert!(state.board.is_adjacent(m.source, m.target));
                assert!(m.troops >= 1 && m.troops <= 10);
            }
        }
    }

    #[test]
    fn generated_orders_always_resolve() {
        let state = state();
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..100 {
            let mut orders = random_orders(1, &state, &mut rng);
            orders.extend(random_orders(2, &state, &mut rng));
            assert!(process_turn(&state, &orders.deploys, &orders.moves).is_ok());
        }
    }

    #[test]
    fn inactive_player_gets_nothing() {
        let mut state = state();
        state.players[1].active = false;
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(random_orders(2, &state, &mut rng).is_empty());
        assert!(random_orders(99, &state, &mut rng).is_empty());
    }
}
