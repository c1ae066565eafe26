use farm_core::actions::{
    base_energy_cost, fertilize_energy_cost, water_cost, SMART_FERTILIZE_NDVI,
};
use farm_core::{Command, CommandEnvelope, CommandId, GameContent, GameState, Tool, UpgradeDef};

pub mod advisor;
pub mod wire;

pub use advisor::{
    analysis_or_fallback, tip_or_fallback, Advisor, AdvisorError, Analysis, FieldAnalyst,
    OfflineAdvisor,
};

pub trait CommandSource {
    fn generate_commands(
        &mut self,
        state: &GameState,
        content: &GameContent,
        next_command_id: &mut u64,
    ) -> Vec<CommandEnvelope>;
}

/// Plays the farm headlessly, one batch of commands per tick:
/// 1. Harvest every ready plot.
/// 2. Water planted dry plots.
/// 3. Plant empty plots.
/// 4. Fertilize when the vegetation index is low.
/// 5. Buy land next to the farm once money clears the reserve.
/// 6. Buy the cheapest affordable upgrade.
///
/// Resource budgets are tracked locally so the batch never asks for more
/// than the ledger holds at the start of the tick.
pub struct AutoFarmer {
    /// Money kept back when deciding whether to expand.
    pub money_reserve: i64,
}

impl Default for AutoFarmer {
    fn default() -> Self {
        Self { money_reserve: 50 }
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Allocates a command ID and builds a `CommandEnvelope`.
fn make_cmd(tick: u64, next_id: &mut u64, command: Command) -> CommandEnvelope {
    let cmd_id = CommandId(format!("cmd_{:06}", *next_id));
    *next_id += 1;
    CommandEnvelope {
        id: cmd_id,
        issued_tick: tick,
        command,
    }
}

/// Accumulates a command batch, inserting tool switches only when needed.
struct Batch<'a> {
    tick: u64,
    next_id: &'a mut u64,
    tool: Option<Tool>,
    commands: Vec<CommandEnvelope>,
}

impl<'a> Batch<'a> {
    fn new(state: &GameState, next_id: &'a mut u64) -> Self {
        Self {
            tick: state.meta.tick,
            next_id,
            tool: state.selected_tool,
            commands: Vec::new(),
        }
    }

    fn push(&mut self, command: Command) {
        self.commands.push(make_cmd(self.tick, self.next_id, command));
    }

    fn use_tool(&mut self, tool: Tool, tile: usize) {
        if self.tool != Some(tool) {
            self.push(Command::SelectTool { tool: Some(tool) });
            self.tool = Some(tool);
        }
        self.push(Command::Interact { tile });
    }
}

/// Number of `unit`-sized spends a `budget` covers.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn affordable(budget: f32, unit: f32) -> usize {
    if unit <= 0.0 {
        return usize::MAX;
    }
    (budget / unit).floor().max(0.0) as usize
}

/// First locked tile with an unlocked orthogonal neighbour, in grid order.
fn frontier_tile(state: &GameState, content: &GameContent) -> Option<usize> {
    let cols = content.constants.grid_cols;
    let open = |index: usize| state.tiles.get(index).is_some_and(|tile| !tile.locked);
    state.tiles.iter().enumerate().find_map(|(index, tile)| {
        if !tile.locked || cols == 0 {
            return None;
        }
        let col = index % cols;
        let neighbour_open = (col > 0 && open(index - 1))
            || (col + 1 < cols && open(index + 1))
            || (index >= cols && open(index - cols))
            || open(index + cols);
        neighbour_open.then_some(index)
    })
}

/// Cheapest upgrade the ledger can buy right now.
fn next_upgrade<'c>(
    state: &GameState,
    content: &'c GameContent,
    money: i64,
) -> Option<&'c UpgradeDef> {
    content
        .upgrades
        .iter()
        .filter(|def| !state.ledger.upgrades.contains_key(&def.id))
        .filter(|def| def.level_required <= state.ledger.level && def.cost <= money)
        .min_by_key(|def| def.cost)
}

impl CommandSource for AutoFarmer {
    fn generate_commands(
        &mut self,
        state: &GameState,
        content: &GameContent,
        next_command_id: &mut u64,
    ) -> Vec<CommandEnvelope> {
        let mut batch = Batch::new(state, next_command_id);
        let mut energy = state.ledger.energy;
        let water = state.ledger.water;
        let mut money = state.ledger.money;
        let energy_unit = base_energy_cost(state, content);
        let fertilize_unit = fertilize_energy_cost(state, content);
        let water_unit = water_cost(state, content);

        let open: Vec<usize> = state
            .tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| !tile.locked)
            .map(|(index, _)| index)
            .collect();

        // Priority 1: harvest.
        let ready: Vec<usize> = open
            .iter()
            .copied()
            .filter(|&i| state.tiles[i].is_harvestable())
            .take(affordable(energy, energy_unit))
            .collect();
        for &tile in &ready {
            batch.use_tool(Tool::Harvest, tile);
            energy -= energy_unit;
        }

        // Priority 2: water. Harvested plots are empty this tick.
        let thirsty = open
            .iter()
            .copied()
            .filter(|&i| {
                let tile = &state.tiles[i];
                tile.planted && !tile.watered && !ready.contains(&i)
            })
            .take(affordable(water, water_unit));
        for tile in thirsty {
            batch.use_tool(Tool::Water, tile);
        }

        // Priority 3: plant.
        let empty = open
            .iter()
            .copied()
            .filter(|&i| !state.tiles[i].planted || ready.contains(&i))
            .take(affordable(energy, energy_unit));
        for tile in empty {
            batch.use_tool(Tool::Plant, tile);
            energy -= energy_unit;
        }

        // Priority 4: fertilize only when it earns the bonus.
        if state.environment.ndvi < SMART_FERTILIZE_NDVI {
            let weak = open
                .iter()
                .copied()
                .filter(|&i| {
                    let tile = &state.tiles[i];
                    tile.planted && !tile.fertilized && !ready.contains(&i)
                })
                .take(affordable(energy, fertilize_unit));
            for tile in weak {
                batch.use_tool(Tool::Fertilize, tile);
            }
        }

        // Priority 5: expand.
        if money - content.constants.expand_cost >= self.money_reserve {
            if let Some(tile) = frontier_tile(state, content) {
                batch.use_tool(Tool::Expand, tile);
                money -= content.constants.expand_cost;
            }
        }

        // Priority 6: upgrades.
        if let Some(def) = next_upgrade(state, content, money) {
            batch.push(Command::PurchaseUpgrade {
                upgrade: def.id.clone(),
            });
        }

        batch.commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_core::test_fixtures::{base_content, base_state, open_tile};
    use farm_core::{UpgradeId, MAX_GROWTH};

    fn generate(state: &GameState, content: &GameContent) -> Vec<CommandEnvelope> {
        let mut next_id = 0;
        AutoFarmer::default().generate_commands(state, content, &mut next_id)
    }

    fn interactions(commands: &[CommandEnvelope], tool: Tool) -> Vec<usize> {
        let mut current = None;
        let mut tiles = Vec::new();
        for cmd in commands {
            match &cmd.command {
                Command::SelectTool { tool } => current = *tool,
                Command::Interact { tile } if current == Some(tool) => tiles.push(*tile),
                _ => {}
            }
        }
        tiles
    }

    #[test]
    fn fresh_farm_plants_within_energy_budget() {
        let content = base_content();
        let state = base_state(&content);

        let commands = generate(&state, &content);

        // 100 energy at 5 per plot, but only 24 plots are open.
        let planted = interactions(&commands, Tool::Plant);
        assert_eq!(planted.len(), 20);
        assert!(planted.iter().all(|&i| !state.tiles[i].locked));
    }

    #[test]
    fn ready_plots_are_harvested_before_anything_else() {
        let content = base_content();
        let mut state = base_state(&content);
        let tile = open_tile(&state, 3);
        state.tiles[tile].planted = true;
        state.tiles[tile].growth = MAX_GROWTH;

        let commands = generate(&state, &content);

        assert!(matches!(
            commands[0].command,
            Command::SelectTool {
                tool: Some(Tool::Harvest)
            }
        ));
        assert_eq!(interactions(&commands, Tool::Harvest), vec![tile]);
        assert!(interactions(&commands, Tool::Water).is_empty());
        assert!(interactions(&commands, Tool::Plant).contains(&tile));
    }

    #[test]
    fn watering_stops_when_the_tank_runs_dry() {
        let content = base_content();
        let mut state = base_state(&content);
        state.ledger.water = 25.0;
        for n in 0..5 {
            let tile = open_tile(&state, n);
            state.tiles[tile].planted = true;
        }

        let commands = generate(&state, &content);

        assert_eq!(interactions(&commands, Tool::Water).len(), 2);
    }

    #[test]
    fn tool_is_selected_once_per_run() {
        let content = base_content();
        let state = base_state(&content);

        let commands = generate(&state, &content);

        let selects = commands
            .iter()
            .filter(|c| matches!(c.command, Command::SelectTool { .. }))
            .count();
        assert_eq!(selects, 1);
    }

    #[test]
    fn expansion_buys_land_next_to_the_farm() {
        let content = base_content();
        let mut state = base_state(&content);
        state.ledger.money = 1_000;

        let commands = generate(&state, &content);

        let expanded = interactions(&commands, Tool::Expand);
        assert_eq!(expanded.len(), 1);
        let tile = expanded[0];
        assert!(state.tiles[tile].locked);
        let cols = content.constants.grid_cols;
        let neighbours = [tile.wrapping_sub(1), tile + 1, tile.wrapping_sub(cols), tile + cols];
        assert!(neighbours
            .iter()
            .any(|&n| state.tiles.get(n).is_some_and(|t| !t.locked)));
    }

    #[test]
    fn reserve_blocks_expansion() {
        let content = base_content();
        let mut state = base_state(&content);
        state.ledger.money = content.constants.expand_cost + 10;

        let commands = generate(&state, &content);

        assert!(interactions(&commands, Tool::Expand).is_empty());
    }

    #[test]
    fn buys_cheapest_affordable_upgrade() {
        let content = base_content();
        let mut state = base_state(&content);
        state.ledger.money = 450;
        state.ledger.level = 2;

        let commands = generate(&state, &content);

        let bought: Vec<&UpgradeId> = commands
            .iter()
            .filter_map(|c| match &c.command {
                Command::PurchaseUpgrade { upgrade } => Some(upgrade),
                _ => None,
            })
            .collect();
        // Expansion leaves 300, which still covers the tank.
        assert_eq!(bought, vec![&UpgradeId("water_tank_1".to_string())]);
    }

    #[test]
    fn command_ids_are_sequential() {
        let content = base_content();
        let state = base_state(&content);
        let mut next_id = 7;

        let commands = AutoFarmer::default().generate_commands(&state, &content, &mut next_id);

        assert_eq!(commands[0].id.0, "cmd_000007");
        assert_eq!(next_id, 7 + commands.len() as u64);
        assert!(commands.iter().all(|c| c.issued_tick == state.meta.tick));
    }
}
