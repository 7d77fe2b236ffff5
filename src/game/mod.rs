use bracket_geometry::prelude::Point;
use log::{debug, info};
use specs::prelude::Entity;

use crate::{
    ai,
    combat::{self, progression},
    config::GameConfig,
    ecs::components::{Ai, Equipment, Progression, Spell},
    effects::{self, UseOutcome},
    gamelog::BAD,
    inventory,
    map::GenerationError,
    world::WorldState,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuKind {
    UseItem,
    DropItem,
    DropGear,
    Equip,
    CastSpell,
}

impl MenuKind {
    pub fn title(&self) -> &'static str {
        match self {
            MenuKind::UseItem => "Use which item? (a-z, any other key cancels)",
            MenuKind::DropItem => "Drop which item? (a-z, any other key cancels)",
            MenuKind::DropGear => "Drop which gear? (a-z, any other key cancels)",
            MenuKind::Equip => "Wear or remove which gear? (a-z, any other key cancels)",
            MenuKind::CastSpell => "Cast which spell? (a-z, any other key cancels)",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Playing,
    Menu(MenuKind),
    LevelUp,
    Dead,
}

/// One decoded player intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Move { dx: i32, dy: i32 },
    Wait,
    PickUp,
    Descend,
    OpenMenu(MenuKind),
    Choose(usize),
    Cancel,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Quit,
}

pub struct Game {
    pub world: WorldState,
    state: RunState,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self, GenerationError> {
        Ok(Self::from_world(WorldState::new(config)?))
    }

    pub fn from_world(mut world: WorldState) -> Self {
        world.refresh_visibility();
        Self {
            world,
            state: RunState::Playing,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Resolves one command. Only floor generation can fail.
    pub fn handle(&mut self, command: Command) -> Result<TickOutcome, GenerationError> {
        if command == Command::Quit {
            info!("quit requested on turn {}", self.world.turn);
            return Ok(TickOutcome::Quit);
        }
        match self.state {
            RunState::Dead => {}
            RunState::Playing => self.play(command)?,
            RunState::Menu(kind) => self.choose_from_menu(kind, command),
            RunState::LevelUp => self.choose_level_up(command),
        }
        Ok(TickOutcome::Continue)
    }

    fn play(&mut self, command: Command) -> Result<(), GenerationError> {
        let took_turn = match command {
            Command::Move { dx, dy } => self.move_or_attack(dx, dy),
            Command::Wait => true,
            Command::PickUp => {
                inventory::pick_up(&mut self.world);
                false
            }
            Command::Descend => {
                self.descend()?;
                false
            }
            Command::OpenMenu(kind) => {
                self.open_menu(kind);
                false
            }
            Command::Choose(_) | Command::Cancel | Command::Quit => false,
        };
        if took_turn {
            self.end_turn();
        }
        Ok(())
    }

    fn open_menu(&mut self, kind: MenuKind) {
        if self.menu_len(kind) == 0 {
            let reason = match kind {
                MenuKind::UseItem | MenuKind::DropItem => "Your pack is empty.",
                MenuKind::DropGear | MenuKind::Equip => "You carry no gear.",
                MenuKind::CastSpell => "You know no spells yet.",
            };
            self.world.log.push(reason, BAD);
            return;
        }
        self.state = RunState::Menu(kind);
    }

    fn move_or_attack(&mut self, dx: i32, dy: i32) -> bool {
        let player = self.world.player();
        let from = self.world.ecs.player_point();
        let dest = Point::new(from.x + dx, from.y + dy);

        if let Some(target) = self.world.ecs.fighter_at(dest).filter(|t| *t != player) {
            if self.world.ecs.get::<Ai>(target) == Some(Ai::Ally) {
                let name = self.world.ecs.name(target);
                self.world.log.push(format!("The {name} is in your way."), BAD);
                return false;
            }
            combat::attack(&mut self.world, player, target);
            return true;
        }

        if ai::move_by(&mut self.world, player, dx, dy) {
            return true;
        }
        debug!("blocked move to {:?}", dest);
        self.world.log.push("Something blocks your way.", BAD);
        false
    }

    fn descend(&mut self) -> Result<(), GenerationError> {
        let stairs = self.world.ecs.position(self.world.ecs.stairs());
        if stairs != Some(self.world.ecs.player_point()) {
            self.world.log.push("There are no stairs here.", BAD);
            return Ok(());
        }
        self.world.next_level()?;
        self.world.refresh_visibility();
        Ok(())
    }

    /// Any command but a letter closes the menu.
    fn choose_from_menu(&mut self, kind: MenuKind, command: Command) {
        self.state = RunState::Playing;
        let Command::Choose(index) = command else {
            return;
        };
        if index >= self.menu_len(kind) {
            self.world.log.push("Invalid selection.", BAD);
            return;
        }

        let took_turn = match kind {
            MenuKind::UseItem => inventory::use_item(&mut self.world, index) == UseOutcome::Consumed,
            MenuKind::DropItem => {
                inventory::drop_item(&mut self.world, index);
                false
            }
            MenuKind::DropGear => {
                inventory::drop_gear(&mut self.world, index);
                false
            }
            MenuKind::Equip => {
                inventory::toggle_equip(&mut self.world, index);
                false
            }
            MenuKind::CastSpell => match self.known_spells().get(index) {
                Some(spell) => effects::cast(&mut self.world, *spell) == UseOutcome::Consumed,
                None => false,
            },
        };
        if took_turn {
            self.end_turn();
        }
    }

    /// Only a valid reward leaves this state.
    fn choose_level_up(&mut self, command: Command) {
        let choices = progression::choices(&self.world);
        let Some(choice) = (match command {
            Command::Choose(index) => choices.get(index).copied(),
            _ => None,
        }) else {
            self.world.log.push("Choose a reward to continue.", BAD);
            return;
        };
        progression::apply(&mut self.world, choice);
        if !progression::try_level_up(&mut self.world) {
            self.state = RunState::Playing;
        }
    }

    /// Monsters act in draw order, then upkeep, then death and level checks.
    fn end_turn(&mut self) {
        self.world.refresh_visibility();
        let actors: Vec<Entity> = self.world.ecs.objects().to_vec();
        for entity in actors {
            if self.world.player_dead {
                break;
            }
            ai::take_turn(&mut self.world, entity);
        }

        self.world.turn += 1;
        let gear = combat::gear_bonus(&self.world);
        let turn = self.world.turn;
        self.world.ecs.run_upkeep(turn, gear);

        if self.world.player_dead {
            self.state = RunState::Dead;
        } else if progression::try_level_up(&mut self.world) {
            self.state = RunState::LevelUp;
        }
    }

    pub fn known_spells(&self) -> Vec<Spell> {
        self.world
            .ecs
            .get::<Progression>(self.world.player())
            .map(|progress| progress.spells.into_iter().collect())
            .unwrap_or_default()
    }

    fn menu_len(&self, kind: MenuKind) -> usize {
        match kind {
            MenuKind::UseItem | MenuKind::DropItem => self.world.inventory.len(),
            MenuKind::DropGear | MenuKind::Equip => self.world.equipment.len(),
            MenuKind::CastSpell => self.known_spells().len(),
        }
    }

    pub fn menu_options(&self, kind: MenuKind) -> Vec<String> {
        let ecs = &self.world.ecs;
        match kind {
            MenuKind::UseItem | MenuKind::DropItem => self
                .world
                .inventory
                .iter()
                .map(|item| ecs.name(*item))
                .collect(),
            MenuKind::DropGear | MenuKind::Equip => self
                .world
                .equipment
                .iter()
                .map(|item| match ecs.get::<Equipment>(*item) {
                    Some(gear) if gear.equipped => {
                        format!("{} (on {})", ecs.name(*item), gear.slot.as_str())
                    }
                    _ => ecs.name(*item),
                })
                .collect(),
            MenuKind::CastSpell => self
                .known_spells()
                .iter()
                .map(|spell| format!("{} ({} MP)", spell.name(), spell.mp_cost()))
                .collect(),
        }
    }

    pub fn level_up_options(&self) -> Vec<String> {
        progression::choices(&self.world)
            .into_iter()
            .map(|choice| progression::describe(&self.world, choice))
            .collect()
    }
}
