//! Export view of a resolved turn.
//!
//! Projects a [`TurnRecord`] into the wire-stable shape consumed by
//! visualizers: the static graph, active players with their income, deploy
//! and move summaries, fights split by phase, and a per-tile state table for
//! each of the three snapshots. Unowned tiles are exported with owner `-1`.

use serde::{Deserialize, Serialize};

use crate::board::{Board, PlayerId, TileId};
use crate::resolve::{Army, BattleEvent, SiegeEvent, TurnRecord};

/// Owner value written for tiles nobody controls.
pub const UNOWNED: i64 = -1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeExport {
    pub id: TileId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkExport {
    pub id: usize,
    pub a: TileId,
    pub b: TileId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerExport {
    pub id: PlayerId,
    pub income: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployExport {
    pub node: TileId,
    pub troops: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveExport {
    pub source: TileId,
    pub target: TileId,
    pub troops: u32,
}

/// An army in a fight. `player` is [`UNOWNED`] for the garrison of an unowned
/// tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmyExport {
    pub player: i64,
    pub troops: u32,
}

/// One fight: where it happened and who took part.
///
/// For battles the location is the link id; for sieges it is the tile id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FightExport {
    pub location: usize,
    pub armies: Vec<ArmyExport>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fights {
    /// Battles fought on links while armies were travelling.
    pub travel: Vec<FightExport>,
    /// Sieges fought on tiles.
    pub combat: Vec<FightExport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeState {
    pub id: TileId,
    pub owner: i64,
    pub troops: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stages {
    pub start: Vec<NodeState>,
    pub travel: Vec<NodeState>,
    pub end: Vec<NodeState>,
}

/// The complete export of one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateExport {
    pub nodes: Vec<NodeExport>,
    pub links: Vec<LinkExport>,
    pub players: Vec<PlayerExport>,
    pub deploys: Vec<DeployExport>,
    pub moves: Vec<MoveExport>,
    pub fights: Fights,
    pub stages: Stages,
}

impl From<&TurnRecord> for StateExport {
    fn from(record: &TurnRecord) -> Self {
        export(record)
    }
}

/// Builds the export view of `record`.
pub fn export(record: &TurnRecord) -> StateExport {
    let board = &record.start.board;

    let nodes = board
        .tiles
        .iter()
        .map(|t| NodeExport {
            id: t.id,
            name: t.id.to_string(),
        })
        .collect();

    let links = board
        .links
        .iter()
        .map(|l| LinkExport {
            id: l.id,
            a: l.a,
            b: l.b,
        })
        .collect();

    let players = record
        .end
        .active_players()
        .map(|p| PlayerExport {
            id: p.id,
            income: p.armies_to_deploy,
        })
        .collect();

    let deploys = record
        .deploy_events
        .iter()
        .map(|d| DeployExport {
            node: d.tile,
            troops: d.troops(),
        })
        .collect();

    let moves = record
        .move_events
        .iter()
        .map(|m| MoveExport {
            source: m.order.source,
            target: m.order.target,
            troops: m.order.troops,
        })
        .collect();

    StateExport {
        nodes,
        links,
        players,
        deploys,
        moves,
        fights: Fights {
            travel: record.battle_events.iter().map(battle_fight).collect(),
            combat: record.siege_events.iter().map(siege_fight).collect(),
        },
        stages: Stages {
            start: node_states(&record.start.board),
            travel: node_states(&record.travel.board),
            end: node_states(&record.end.board),
        },
    }
}

fn owner_code(owner: Option<PlayerId>) -> i64 {
    owner.map_or(UNOWNED, i64::from)
}

fn army_summaries(armies: &[Army]) -> Vec<ArmyExport> {
    armies
        .iter()
        .map(|a| ArmyExport {
            player: i64::from(a.player),
            troops: a.troops,
        })
        .collect()
}

fn battle_fight(event: &BattleEvent) -> FightExport {
    FightExport {
        location: event.link,
        armies: army_summaries(&event.armies),
    }
}

/// Siege fights list the attackers followed by the defending garrison.
fn siege_fight(event: &SiegeEvent) -> FightExport {
    let mut armies = army_summaries(&event.attackers);
    armies.push(ArmyExport {
        player: owner_code(event.defender.owner),
        troops: event.defender.troops,
    });
    FightExport {
        location: event.location,
        armies,
    }
}

fn node_states(board: &Board) -> Vec<NodeState> {
    board
        .tiles
        .iter()
        .map(|t| NodeState {
            id: t.id,
            owner: owner_code(t.owner),
            troops: t.garrison,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{DeployOrder, MoveOrder, Scenario};
    use crate::resolve::process_turn;

    fn siege_turn() -> TurnRecord {
        let state = Scenario::default().setup(&[0, 1]).unwrap();
        process_turn(
            &state,
            &[DeployOrder {
                player: 0,
                tile: 0,
                troops: 3,
            }],
            &[MoveOrder {
                player: 0,
                source: 0,
                target: 1,
                troops: 2,
            }],
        )
        .unwrap()
    }

    #[test]
    fn graph_is_exported_in_id_order() {
        let out = export(&siege_turn());
        assert_eq!(out.nodes.len(), 5);
        assert_eq!(out.nodes[3], NodeExport { id: 3, name: "3".into() });
        assert_eq!(out.links.len(), 6);
        assert_eq!(out.links[0], LinkExport { id: 0, a: 0, b: 1 });
        assert_eq!(out.links[5], LinkExport { id: 5, a: 3, b: 4 });
    }

    #[test]
    fn players_carry_end_of_turn_income() {
        let out = export(&siege_turn());
        assert_eq!(
            out.players,
            vec![
                PlayerExport { id: 0, income: 7 },
                PlayerExport { id: 1, income: 6 },
            ]
        );
    }

    #[test]
    fn deploys_and_sieges_are_summarized() {
        let out = export(&siege_turn());
        assert_eq!(out.deploys, vec![DeployExport { node: 0, troops: 3 }]);
        assert!(out.moves.is_empty());
        assert!(out.fights.travel.is_empty());
        assert_eq!(
            out.fights.combat,
            vec![FightExport {
                location: 1,
                armies: vec![
                    ArmyExport { player: 0, troops: 2 },
                    ArmyExport { player: UNOWNED, troops: 0 },
                ],
            }]
        );
    }

    #[test]
    fn stages_use_minus_one_for_unowned() {
        let out = export(&siege_turn());
        assert_eq!(out.stages.start[1], NodeState { id: 1, owner: UNOWNED, troops: 0 });
        assert_eq!(out.stages.travel[0], NodeState { id: 0, owner: 0, troops: 1 });
        assert_eq!(out.stages.travel[1].owner, UNOWNED);
        assert_eq!(out.stages.end[1], NodeState { id: 1, owner: 0, troops: 2 });
    }

    #[test]
    fn defended_siege_lists_the_garrison() {
        let mut state = Scenario::default().setup(&[0, 1]).unwrap();
        state.board.tiles[0].garrison = 5;
        state.board.tiles[2].garrison = 2;
        let record = process_turn(
            &state,
            &[],
            &[MoveOrder {
                player: 0,
                source: 0,
                target: 2,
                troops: 5,
            }],
        )
        .unwrap();
        let out = export(&record);
        assert_eq!(
            out.fights.combat[0].armies,
            vec![
                ArmyExport { player: 0, troops: 5 },
                ArmyExport { player: 1, troops: 2 },
            ]
        );
        // Eliminated players drop out of the roster.
        assert_eq!(out.players.len(), 1);
    }

    #[test]
    fn unowned_garrison_defends_as_minus_one() {
        let mut state = Scenario::default().setup(&[0, 1]).unwrap();
        state.board.tiles[0].garrison = 4;
        state.board.tiles[1].garrison = 1;
        let record = process_turn(
            &state,
            &[],
            &[MoveOrder {
                player: 0,
                source: 0,
                target: 1,
                troops: 4,
            }],
        )
        .unwrap();
        let out = export(&record);
        assert_eq!(
            out.fights.combat[0].armies,
            vec![
                ArmyExport { player: 0, troops: 4 },
                ArmyExport { player: UNOWNED, troops: 1 },
            ]
        );
        assert_eq!(out.stages.end[1], NodeState { id: 1, owner: 0, troops: 3 });
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let value = serde_json::to_value(export(&siege_turn())).unwrap();
        for key in ["nodes", "links", "players", "deploys", "moves", "fights", "stages"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert!(value["fights"]["travel"].is_array());
        assert!(value["fights"]["combat"].is_array());
        assert_eq!(value["stages"]["start"][1]["owner"], -1);
    }
}
